use serde_json::Value;
use wasm_bindgen::{prelude::wasm_bindgen, JsValue};

#[wasm_bindgen]
#[derive(Debug)]
pub struct Eip1193Request {
    method: String,
    params: JsValue,
}

#[wasm_bindgen]
impl Eip1193Request {
    pub(crate) fn new(method: String, params: JsValue) -> Eip1193Request {
        Eip1193Request { method, params }
    }

    #[wasm_bindgen(getter)]
    pub fn method(&self) -> String {
        self.method.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn params(&self) -> JsValue {
        self.params.clone()
    }
}

const METAMASK_METHOD_WITH_WRONG_IMPLEMENTATION_SIGNATURE: &str = "wallet_watchAsset";

/// Shapes request params the way MetaMask accepts them: always a positional
/// array, with typed-transaction `type` fields written without the leading zero.
pub(crate) fn normalize_params(params: Value, method: &str) -> Value {
    // NOTE: Metamask experimental method with different options signature then rest of code
    // source: https://docs.metamask.io/wallet/reference/wallet_watchasset/
    if method == METAMASK_METHOD_WITH_WRONG_IMPLEMENTATION_SIGNATURE && !params.is_null() {
        return params;
    }

    match params {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_tx_type).collect()),
        _ => Value::Array(Vec::new()),
    }
}

fn normalize_tx_type(mut item: Value) -> Value {
    if let Some(Value::String(tx_type)) = item.get_mut("type") {
        let fixed = match tx_type.as_str() {
            "0x01" => Some("0x1"),
            "0x02" => Some("0x2"),
            "0x03" => Some("0x3"),
            _ => None,
        };
        if let Some(fixed) = fixed {
            *tx_type = fixed.to_string();
        }
    }
    item
}
