use crate::{
    chain::parse_chain_id,
    discovery::{DiscoveredProvider, Registry, WalletTarget},
    eip1193::{
        call, error::Eip1193Error, Eip1193Provider, EventHandler, ProviderInfo, SharedProvider,
    },
    event::{ConnectorHooks, WalletEvent},
    host::{Announcement, WalletHost},
    signing::{EthersLibrary, SigningLibrary, SigningSession},
};
use log::{debug, info};
use serde_json::{json, Value};
use std::{
    cell::RefCell,
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};
use thiserror::Error;

pub const DEFAULT_CONNECT_WAIT_MS: u32 = 300;
pub const DEFAULT_ACCOUNTS_WAIT_MS: u32 = 200;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("MetaMask is not installed")]
    ProviderNotFound,

    #[error("Signing library not available")]
    SigningLibraryMissing,

    #[error("No accounts found")]
    NoAccountsAuthorized,

    #[error(transparent)]
    Provider(#[from] Eip1193Error),
}

impl ConnectorError {
    /// True when the wallet reported that the user declined the request
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ConnectorError::Provider(e) if e.is_user_rejection())
    }
}

pub struct ConnectorBuilder {
    target: WalletTarget,
    connect_wait_ms: u32,
    accounts_wait_ms: u32,
    signing_library: Option<Rc<dyn SigningLibrary>>,
}

impl Default for ConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorBuilder {
    pub fn new() -> Self {
        Self {
            target: WalletTarget::metamask(),
            connect_wait_ms: DEFAULT_CONNECT_WAIT_MS,
            accounts_wait_ms: DEFAULT_ACCOUNTS_WAIT_MS,
            signing_library: Some(Rc::new(EthersLibrary)),
        }
    }

    pub fn target(&mut self, target: WalletTarget) -> &mut Self {
        self.target = target;
        self
    }

    /// How long `connect` waits for a late provider before giving up
    pub fn connect_wait_ms(&mut self, ms: u32) -> &mut Self {
        self.connect_wait_ms = ms;
        self
    }

    /// How long `get_accounts` waits for a late provider before answering empty
    pub fn accounts_wait_ms(&mut self, ms: u32) -> &mut Self {
        self.accounts_wait_ms = ms;
        self
    }

    pub fn signing_library(&mut self, library: Rc<dyn SigningLibrary>) -> &mut Self {
        self.signing_library = Some(library);
        self
    }

    pub fn without_signing_library(&mut self) -> &mut Self {
        self.signing_library = None;
        self
    }

    pub fn build(&self, host: Rc<dyn WalletHost>) -> WalletConnector {
        WalletConnector {
            inner: Rc::new(Inner {
                host,
                target: self.target.clone(),
                connect_wait_ms: self.connect_wait_ms,
                accounts_wait_ms: self.accounts_wait_ms,
                signing_library: self.signing_library.clone(),
                registry: RefCell::new(Registry::default()),
                state: RefCell::new(ConnectionState::default()),
                hooks: ConnectorHooks::default(),
            }),
        }
    }
}

/// Result of a successful `connect` or `restore`
#[derive(Clone, Debug)]
pub struct Connection {
    pub account: String,
    pub chain_id: Option<u64>,
    pub session: SigningSession,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DisconnectOptions {
    /// Ask the wallet to drop the `eth_accounts` permission as well
    pub revoke_permissions: bool,
}

/// Listeners bound to one provider. Dropping it detaches them.
struct EventSubscription {
    provider: SharedProvider,
    handlers: Vec<(WalletEvent, EventHandler)>,
}

impl EventSubscription {
    fn attach(provider: SharedProvider, handlers: Vec<(WalletEvent, EventHandler)>) -> Self {
        for (event, handler) in &handlers {
            provider.on(*event, handler);
        }
        Self { provider, handlers }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        for (event, handler) in &self.handlers {
            self.provider.remove_listener(*event, handler);
        }
    }
}

#[derive(Default)]
struct ConnectionState {
    account: Option<String>,
    chain_id: Option<u64>,
    connected: bool,
    session: Option<SigningSession>,
    subscription: Option<EventSubscription>,
}

impl ConnectionState {
    fn lose_account(&mut self) {
        self.connected = false;
        self.account = None;
    }
}

struct Inner {
    host: Rc<dyn WalletHost>,
    target: WalletTarget,
    connect_wait_ms: u32,
    accounts_wait_ms: u32,
    signing_library: Option<Rc<dyn SigningLibrary>>,
    registry: RefCell<Registry>,
    state: RefCell<ConnectionState>,
    hooks: ConnectorHooks,
}

impl Inner {
    fn handle_event(&self, event: WalletEvent, payload: Value) {
        match event {
            WalletEvent::AccountsChanged => {
                let accounts: Vec<String> = serde_json::from_value(payload).unwrap_or_default();
                match accounts.first() {
                    None => {
                        debug!("Wallet reported no accounts, treating as disconnect");
                        self.state.borrow_mut().lose_account();
                        self.hooks.disconnected.emit(());
                    }
                    Some(account) => {
                        {
                            let mut state = self.state.borrow_mut();
                            state.account = Some(account.clone());
                            state.connected = true;
                        }
                        self.hooks.accounts_changed.emit(accounts);
                    }
                }
            }
            WalletEvent::ChainChanged => {
                let chain_id = parse_chain_id(&payload);
                self.state.borrow_mut().chain_id = chain_id;
                self.hooks.chain_changed.emit(chain_id);
            }
            WalletEvent::Disconnect => {
                self.state.borrow_mut().lose_account();
                self.hooks.disconnected.emit(());
            }
        }
    }
}

/// Connection to an injected MetaMask (or other target) wallet.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct WalletConnector {
    inner: Rc<Inner>,
}

impl Debug for WalletConnector {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let state = self.inner.state.borrow();
        write!(
            f,
            "WalletConnector with account: {:?}, chain_id: {:?}, connected: {}",
            state.account, state.chain_id, state.connected
        )
    }
}

impl WalletConnector {
    pub fn new(host: Rc<dyn WalletHost>) -> Self {
        ConnectorBuilder::new().build(host)
    }

    /// Connector over the page's `window`
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::new(Rc::new(crate::host::browser::BrowserHost::new()))
    }

    pub fn hooks(&self) -> &ConnectorHooks {
        &self.inner.hooks
    }

    /// Starts EIP-6963 discovery and runs the legacy scan. Only the first call does anything.
    pub fn load(&self) {
        {
            let mut registry = self.inner.registry.borrow_mut();
            if registry.loaded {
                return;
            }
            registry.loaded = true;
        }

        let weak = Rc::downgrade(&self.inner);
        self.inner.host.subscribe_announcements(Rc::new(move |announcement: Announcement| {
            if let Some(inner) = weak.upgrade() {
                inner.registry.borrow_mut().announce(&inner.target, announcement);
            }
        }));
        self.inner.host.request_providers();

        self.refresh_legacy();
    }

    fn refresh_legacy(&self) {
        if self.inner.registry.borrow().candidate.is_some() {
            return;
        }
        let legacy = self.inner.host.legacy_providers();
        self.inner.registry.borrow_mut().refresh_legacy(&self.inner.target, legacy);
    }

    fn candidate(&self) -> Option<SharedProvider> {
        self.inner.registry.borrow().candidate.clone()
    }

    /// Currently selected provider, after making sure discovery ran
    pub fn peek_provider(&self) -> Option<SharedProvider> {
        self.load();
        self.refresh_legacy();
        self.candidate()
    }

    pub fn is_available(&self) -> bool {
        self.peek_provider().is_some()
    }

    /// Like [`Self::peek_provider`], but on a miss waits `wait_ms` once and rescans.
    pub async fn get_provider(&self, wait_ms: u32) -> Option<SharedProvider> {
        if let Some(provider) = self.peek_provider() {
            return Some(provider);
        }
        if wait_ms == 0 {
            return None;
        }

        self.inner.host.sleep(wait_ms).await;
        self.refresh_legacy();
        self.candidate()
    }

    /// Asks the wallet for account access and starts following its events
    pub async fn connect(&self) -> Result<Connection, ConnectorError> {
        let provider = self
            .get_provider(self.inner.connect_wait_ms)
            .await
            .ok_or(ConnectorError::ProviderNotFound)?;
        let library =
            self.inner.signing_library.clone().ok_or(ConnectorError::SigningLibraryMissing)?;

        let accounts: Option<Vec<String>> = call(&*provider, "eth_requestAccounts", ()).await?;
        let Some(account) = accounts.unwrap_or_default().into_iter().next() else {
            return Err(ConnectorError::NoAccountsAuthorized);
        };

        self.establish(provider, library.as_ref(), account).await
    }

    /// Picks up a session the wallet already authorized, without prompting.
    /// `Ok(None)` when the wallet exposes no accounts.
    pub async fn restore(&self) -> Result<Option<Connection>, ConnectorError> {
        let Some(account) = self.get_accounts().await?.into_iter().next() else {
            return Ok(None);
        };
        let provider = self.candidate().ok_or(ConnectorError::ProviderNotFound)?;
        let library =
            self.inner.signing_library.clone().ok_or(ConnectorError::SigningLibraryMissing)?;

        self.establish(provider, library.as_ref(), account).await.map(Some)
    }

    async fn establish(
        &self,
        provider: SharedProvider,
        library: &dyn SigningLibrary,
        account: String,
    ) -> Result<Connection, ConnectorError> {
        let chain_id = read_chain_id(&*provider).await?;
        let session = library.wrap(&provider, &account);

        {
            let mut state = self.inner.state.borrow_mut();
            state.account = Some(account.clone());
            state.chain_id = chain_id;
            state.session = Some(session.clone());
            state.connected = true;
        }
        self.subscribe(provider);

        info!("Connected {account} on chain {chain_id:?}");
        Ok(Connection { account, chain_id, session })
    }

    /// Follows the selected provider's events without prompting the user.
    /// Useful after restoring a session from `eth_accounts`.
    pub fn attach_event_listeners(&self) {
        if let Some(provider) = self.peek_provider() {
            self.subscribe(provider);
        }
    }

    fn subscribe(&self, provider: SharedProvider) {
        let previous = self.inner.state.borrow_mut().subscription.take();
        drop(previous);

        let handlers = WalletEvent::ALL
            .iter()
            .map(|&event| {
                let weak = Rc::downgrade(&self.inner);
                let handler: EventHandler = Rc::new(move |payload: Value| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle_event(event, payload);
                    }
                });
                (event, handler)
            })
            .collect();

        let subscription = EventSubscription::attach(provider, handlers);
        self.inner.state.borrow_mut().subscription = Some(subscription);
    }

    /// Forgets the session locally. The wallet itself cannot be disconnected;
    /// revoking permissions is best effort.
    pub async fn disconnect(&self, options: DisconnectOptions) {
        if options.revoke_permissions {
            if let Some(provider) = self.peek_provider() {
                let params = json!([{ "eth_accounts": {} }]);
                if let Err(err) = provider.request("wallet_revokePermissions", params).await {
                    debug!("wallet_revokePermissions failed, clearing local state anyway: {err}");
                }
            }
        }

        let subscription = {
            let mut state = self.inner.state.borrow_mut();
            state.lose_account();
            state.chain_id = None;
            state.session = None;
            state.subscription.take()
        };
        drop(subscription);
    }

    /// Accounts the wallet currently exposes. Empty when no wallet is found.
    pub async fn get_accounts(&self) -> Result<Vec<String>, ConnectorError> {
        let Some(provider) = self.get_provider(self.inner.accounts_wait_ms).await else {
            return Ok(Vec::new());
        };
        let accounts: Option<Vec<String>> = call(&*provider, "eth_accounts", ()).await?;
        Ok(accounts.unwrap_or_default())
    }

    pub fn account(&self) -> Option<String> {
        self.inner.state.borrow().account.clone()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.inner.state.borrow().chain_id
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().connected
    }

    pub fn session(&self) -> Option<SigningSession> {
        self.inner.state.borrow().session.clone()
    }

    /// EIP-6963 metadata of the selected provider, if it was announced
    pub fn provider_info(&self) -> Option<ProviderInfo> {
        self.inner.registry.borrow().candidate_info.clone()
    }

    pub fn discovered_providers(&self) -> Vec<DiscoveredProvider> {
        self.inner.registry.borrow().discovered.values().cloned().collect()
    }
}

async fn read_chain_id(provider: &dyn Eip1193Provider) -> Result<Option<u64>, Eip1193Error> {
    let raw: Value = call(provider, "eth_chainId", ()).await?;
    Ok(parse_chain_id(&raw))
}
