#[cfg(target_arch = "wasm32")]
pub mod browser;

use crate::eip1193::{ProviderInfo, SharedProvider};
use async_trait::async_trait;
use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};

pub const ANNOUNCE_PROVIDER_EVENT: &str = "eip6963:announceProvider";
pub const REQUEST_PROVIDER_EVENT: &str = "eip6963:requestProvider";

/// Payload of an `eip6963:announceProvider` event. Either part may be missing
/// when a wallet announces something malformed.
#[derive(Clone)]
pub struct Announcement {
    pub info: Option<ProviderInfo>,
    pub provider: Option<SharedProvider>,
}

impl Debug for Announcement {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "Announcement {:?} (provider: {})", self.info, self.provider.is_some())
    }
}

pub type AnnounceHandler = Rc<dyn Fn(Announcement)>;

/// The page the connector runs in: its event bus, the legacy `window.ethereum`
/// injection and its timers.
#[async_trait(?Send)]
pub trait WalletHost {
    /// Starts delivering `eip6963:announceProvider` events to `handler`
    fn subscribe_announcements(&self, handler: AnnounceHandler);

    /// Broadcasts `eip6963:requestProvider`. Wallets may answer synchronously.
    fn request_providers(&self);

    /// Providers injected the pre-EIP-6963 way, in lookup order: entries of
    /// `ethereum.providers` first, then `ethereum` itself
    fn legacy_providers(&self) -> Vec<SharedProvider>;

    /// One-shot timer
    async fn sleep(&self, ms: u32);
}
