use std::{
    cell::RefCell,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    rc::Rc,
};

/// Provider events the connector listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletEvent {
    AccountsChanged,
    ChainChanged,
    Disconnect,
}

impl WalletEvent {
    pub const ALL: [WalletEvent; 3] =
        [WalletEvent::AccountsChanged, WalletEvent::ChainChanged, WalletEvent::Disconnect];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletEvent::AccountsChanged => "accountsChanged",
            WalletEvent::ChainChanged => "chainChanged",
            WalletEvent::Disconnect => "disconnect",
        }
    }
}

impl Display for WalletEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Single-slot callback registry. Registering a handler replaces the previous one.
pub struct Hook<A> {
    slot: RefCell<Option<Rc<dyn Fn(A)>>>,
}

impl<A> Default for Hook<A> {
    fn default() -> Self {
        Self { slot: RefCell::new(None) }
    }
}

impl<A> Debug for Hook<A> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "Hook(registered: {})", self.is_registered())
    }
}

impl<A> Hook<A> {
    pub fn register(&self, handler: impl Fn(A) + 'static) {
        *self.slot.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    pub fn is_registered(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Calls the registered handler, if any. The slot is not borrowed while the
    /// handler runs, so it may register or clear hooks itself.
    pub(crate) fn emit(&self, arg: A) -> bool {
        let handler = self.slot.borrow().clone();
        match handler {
            Some(handler) => {
                handler(arg);
                true
            }
            None => false,
        }
    }
}

/// Caller hooks for events relayed from the wallet
#[derive(Debug, Default)]
pub struct ConnectorHooks {
    /// Fired with the full account list when the wallet switches accounts
    pub accounts_changed: Hook<Vec<String>>,
    /// Fired with the decoded chain id, `None` when the wallet sent something unreadable
    pub chain_changed: Hook<Option<u64>>,
    /// Fired when the wallet drops the session or revokes every account
    pub disconnected: Hook<()>,
}
