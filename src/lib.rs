pub mod chain;
pub mod connector;
pub mod discovery;
pub mod eip1193;
pub mod event;
pub mod host;
pub mod panel;
pub mod signing;

#[cfg(test)]
mod mock;

pub use chain::parse_chain_id;
pub use connector::{
    Connection, ConnectorBuilder, ConnectorError, DisconnectOptions, WalletConnector,
};
pub use discovery::{DiscoveredProvider, WalletTarget};
pub use eip1193::{error::Eip1193Error, Eip1193Provider, EventHandler, ProviderInfo, SharedProvider};
pub use event::{ConnectorHooks, Hook, WalletEvent};
pub use host::{Announcement, WalletHost};
pub use panel::{DesignGuidePanel, Notifier, PanelHost, ToastKind, ToastOptions};
pub use signing::{EthersLibrary, InjectedClient, InjectedSigner, SigningLibrary, SigningSession};

#[cfg(target_arch = "wasm32")]
pub use host::browser::BrowserHost;
#[cfg(target_arch = "wasm32")]
pub use panel::dom::DomPanelHost;

/// Routes `log` output to the browser console and panics to `console.error`
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: log::Level) {
    _ = console_log::init_with_level(level);
    console_error_panic_hook::set_once();
}
