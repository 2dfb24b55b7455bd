use crate::{
    eip1193::{
        error::Eip1193Error,
        request::{normalize_params, Eip1193Request},
        Eip1193Provider, EventHandler,
    },
    event::WalletEvent,
};
use async_trait::async_trait;
use gloo_utils::format::JsValueSerdeExt;
use serde_json::Value;
use std::{
    cell::RefCell,
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, Debug)]
    /// An EIP-1193 provider object, either announced over EIP-6963 or injected at `window.ethereum`
    pub(crate) type Ethereum;

    #[wasm_bindgen(catch, method)]
    pub(crate) async fn request(_: &Ethereum, args: Eip1193Request) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method)]
    pub(crate) fn on(_: &Ethereum, eventName: &str, listener: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(method, js_name = "removeListener")]
    pub(crate) fn removeListener(
        _: &Ethereum,
        eventName: &str,
        listener: &Closure<dyn FnMut(JsValue)>,
    );
}

struct Binding {
    event: WalletEvent,
    handler: EventHandler,
    closure: Closure<dyn FnMut(JsValue)>,
}

/// Rust side of a wallet object living in the page. Keeps the JS closures it
/// handed out so they can be removed again.
pub struct InjectedProvider {
    ethereum: Ethereum,
    bindings: RefCell<Vec<Binding>>,
}

impl Debug for InjectedProvider {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "InjectedProvider with {} listeners", self.bindings.borrow().len())
    }
}

impl InjectedProvider {
    /// Wraps a JS value if it looks like an EIP-1193 provider (has a callable `request`)
    pub fn from_js(value: JsValue) -> Option<Rc<Self>> {
        if value.is_null() || value.is_undefined() {
            return None;
        }
        let request = js_sys::Reflect::get(&value, &JsValue::from_str("request")).ok()?;
        if !request.is_function() {
            return None;
        }
        Some(Rc::new(Self { ethereum: value.unchecked_into(), bindings: RefCell::new(Vec::new()) }))
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, Eip1193Error> {
        let params = JsValue::from_serde(&normalize_params(params, method))?;
        let payload = Eip1193Request::new(method.to_string(), params);

        let response = self.ethereum.request(payload).await?;
        if response.is_undefined() {
            return Ok(Value::Null);
        }
        Ok(response.into_serde::<Value>()?)
    }

    fn on(&self, event: WalletEvent, handler: &EventHandler) {
        let callback = handler.clone();
        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            callback(payload.into_serde::<Value>().unwrap_or(Value::Null))
        }) as Box<dyn FnMut(JsValue)>);
        self.ethereum.on(event.as_str(), &closure);
        self.bindings.borrow_mut().push(Binding { event, handler: handler.clone(), closure });
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(idx) =
            bindings.iter().position(|b| b.event == event && Rc::ptr_eq(&b.handler, handler))
        {
            let binding = bindings.remove(idx);
            self.ethereum.removeListener(event.as_str(), &binding.closure);
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        js_sys::Reflect::get(&self.ethereum, &JsValue::from_str(flag))
            .map(|v| v.is_truthy())
            .unwrap_or(false)
    }
}
