use crate::{
    eip1193::{ethereum::InjectedProvider, ProviderInfo, SharedProvider},
    host::{
        AnnounceHandler, Announcement, WalletHost, ANNOUNCE_PROVIDER_EVENT,
        REQUEST_PROVIDER_EVENT,
    },
};
use async_trait::async_trait;
use gloo::{events::EventListener, timers::future::TimeoutFuture};
use gloo_utils::format::JsValueSerdeExt;
use log::{debug, error};
use std::cell::RefCell;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::CustomEvent;

/// `WalletHost` backed by the browser `window`
#[derive(Default)]
pub struct BrowserHost {
    announce_listener: RefCell<Option<EventListener>>,
}

impl BrowserHost {
    pub fn new() -> Self {
        Self::default()
    }
}

fn get(target: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn parse_announcement(event: &web_sys::Event) -> Announcement {
    let detail = event.dyn_ref::<CustomEvent>().map(|e| e.detail()).unwrap_or(JsValue::UNDEFINED);
    if detail.is_null() || detail.is_undefined() {
        return Announcement { info: None, provider: None };
    }

    let info = get(&detail, "info");
    let info = if info.is_object() { info.into_serde::<ProviderInfo>().ok() } else { None };
    let provider =
        InjectedProvider::from_js(get(&detail, "provider")).map(|p| p as SharedProvider);
    Announcement { info, provider }
}

#[async_trait(?Send)]
impl WalletHost for BrowserHost {
    fn subscribe_announcements(&self, handler: AnnounceHandler) {
        let Some(window) = web_sys::window() else {
            error!("No window object, provider announcements unavailable");
            return;
        };
        let listener = EventListener::new(&window, ANNOUNCE_PROVIDER_EVENT, move |event| {
            handler(parse_announcement(event));
        });
        *self.announce_listener.borrow_mut() = Some(listener);
    }

    fn request_providers(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        match web_sys::Event::new(REQUEST_PROVIDER_EVENT) {
            Ok(event) => {
                if let Err(err) = window.dispatch_event(&event) {
                    error!("Failed to dispatch {REQUEST_PROVIDER_EVENT}: {err:?}");
                }
            }
            Err(err) => error!("Failed to create {REQUEST_PROVIDER_EVENT}: {err:?}"),
        }
    }

    fn legacy_providers(&self) -> Vec<SharedProvider> {
        let Some(window) = web_sys::window() else {
            return Vec::new();
        };
        let ethereum = get(&window, "ethereum");
        if ethereum.is_null() || ethereum.is_undefined() {
            return Vec::new();
        }

        let mut providers: Vec<SharedProvider> = Vec::new();
        let nested = get(&ethereum, "providers");
        if js_sys::Array::is_array(&nested) {
            for entry in js_sys::Array::from(&nested).iter() {
                if let Some(provider) = InjectedProvider::from_js(entry) {
                    providers.push(provider);
                }
            }
        }
        if let Some(provider) = InjectedProvider::from_js(ethereum) {
            providers.push(provider);
        }
        debug!("Legacy injection exposes {} provider(s)", providers.len());
        providers
    }

    async fn sleep(&self, ms: u32) {
        TimeoutFuture::new(ms).await;
    }
}
