pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod ethereum;
pub mod request;

use crate::{eip1193::error::Eip1193Error, event::WalletEvent};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// Listener attached to a provider event. Identity (`Rc::ptr_eq`) is what
/// `remove_listener` matches on.
pub type EventHandler = Rc<dyn Fn(Value)>;

/// Provider handle borrowed from the host page. The connector never owns the
/// wallet object behind it.
pub type SharedProvider = Rc<dyn Eip1193Provider>;

/// Capability surface of an injected EIP-1193 provider.
///
/// Everything here is single threaded: wasm has one thread and the wallet
/// object lives in the page, so neither the provider nor its futures are `Send`.
#[async_trait(?Send)]
pub trait Eip1193Provider {
    /// `provider.request({ method, params })`
    async fn request(&self, method: &str, params: Value) -> Result<Value, Eip1193Error>;

    /// `provider.on(event, handler)`
    fn on(&self, event: WalletEvent, handler: &EventHandler);

    /// `provider.removeListener(event, handler)`
    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler);

    /// Reads a self-declared boolean marker such as `isMetaMask`
    fn has_flag(&self, flag: &str) -> bool;
}

/// Sends a request and decodes the answer into `R`
pub async fn call<R: DeserializeOwned, T: Serialize>(
    provider: &dyn Eip1193Provider,
    method: &str,
    params: T,
) -> Result<R, Eip1193Error> {
    let params = serde_json::to_value(params)?;
    let response = provider.request(method, params).await?;
    Ok(serde_json::from_value(response)?)
}

/// Wallet metadata announced over EIP-6963
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderInfo {
    pub uuid: String,
    pub name: String,
    pub icon: String,
    pub rdns: String,
}
