use crate::panel::{Notifier, PanelHost, ToastId, ToastOptions, DESIGN_GUIDE_SELECTOR};
use gloo::{events::EventListener, timers::callback::Timeout};
use gloo_utils::format::JsValueSerdeExt;
use log::error;
use serde::Serialize;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::Element;

const ACTION_SELECTOR: &str = "[data-toast-type]";
const ACTION_ATTRIBUTE: &str = "data-toast-type";

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, Debug)]
    /// Toast service the page exposes at `window.toastManager`
    type ToastManager;

    #[wasm_bindgen(method)]
    fn success(_: &ToastManager, message: &str);

    #[wasm_bindgen(method)]
    fn error(_: &ToastManager, message: &str, options: JsValue);

    #[wasm_bindgen(method)]
    fn show(_: &ToastManager, options: JsValue);

    #[wasm_bindgen(method)]
    fn loading(_: &ToastManager, message: &str, options: JsValue) -> JsValue;

    #[wasm_bindgen(method)]
    fn update(_: &ToastManager, id: JsValue, options: JsValue);
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|err| {
        error!("Cannot pass toast options to the page: {err}");
        JsValue::UNDEFINED
    })
}

struct BrowserNotifier {
    manager: ToastManager,
}

impl Notifier for BrowserNotifier {
    fn success(&self, message: &str) {
        self.manager.success(message);
    }

    fn error(&self, message: &str, options: &ToastOptions) {
        self.manager.error(message, to_js(options));
    }

    fn show(&self, options: &ToastOptions) {
        self.manager.show(to_js(options));
    }

    fn loading(&self, message: &str, options: &ToastOptions) -> ToastId {
        ToastId::Js(self.manager.loading(message, to_js(options)))
    }

    fn update(&self, id: &ToastId, options: &ToastOptions) {
        self.manager.update(toast_id_to_js(id), to_js(options));
    }
}

fn toast_id_to_js(id: &ToastId) -> JsValue {
    match id {
        ToastId::Js(id) => id.clone(),
        ToastId::Json(id) => JsValue::from_serde(id).unwrap_or(JsValue::NULL),
    }
}

/// Panel container located with a CSS selector in the current document
pub struct DomPanelHost {
    selector: String,
    listeners: RefCell<Vec<EventListener>>,
}

impl Default for DomPanelHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DomPanelHost {
    pub fn new() -> Self {
        Self::with_selector(DESIGN_GUIDE_SELECTOR)
    }

    pub fn with_selector(selector: &str) -> Self {
        Self { selector: selector.to_string(), listeners: RefCell::new(Vec::new()) }
    }

    fn container(&self) -> Option<Element> {
        let document = web_sys::window()?.document()?;
        document.query_selector(&self.selector).ok().flatten()
    }
}

impl PanelHost for DomPanelHost {
    fn render(&self, markup: &str, on_action: Rc<dyn Fn(&str)>) -> bool {
        let Some(container) = self.container() else {
            return false;
        };
        container.set_inner_html(markup);

        let mut listeners = Vec::new();
        if let Ok(nodes) = container.query_selector_all(ACTION_SELECTOR) {
            for idx in 0..nodes.length() {
                let Some(element) = nodes.item(idx).and_then(|n| n.dyn_into::<Element>().ok())
                else {
                    continue;
                };
                let on_action = on_action.clone();
                let target = element.clone();
                listeners.push(EventListener::new(&element, "click", move |_| {
                    let kind = target.get_attribute(ACTION_ATTRIBUTE).unwrap_or_default();
                    on_action(&kind);
                }));
            }
        }
        // Dropping the previous listeners detaches them from the replaced nodes
        *self.listeners.borrow_mut() = listeners;
        true
    }

    fn notifier(&self) -> Option<Rc<dyn Notifier>> {
        let window = web_sys::window()?;
        let manager = js_sys::Reflect::get(&window, &JsValue::from_str("toastManager")).ok()?;
        if manager.is_null() || manager.is_undefined() {
            return None;
        }
        Some(Rc::new(BrowserNotifier { manager: manager.unchecked_into() }))
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, task).forget();
    }
}
