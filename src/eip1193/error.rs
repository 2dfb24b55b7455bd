use ethers::{
    prelude::{JsonRpcError, ProviderError, RpcError, SignatureError},
    utils::hex::FromHexError,
};
use gloo_utils::format::JsValueSerdeExt;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// EIP-1193 code a wallet returns when the user declines a request.
pub const USER_REJECTED_REQUEST: i64 = 4001;

#[derive(Error, Debug)]
/// Error raised by an injected provider or while talking to it
pub enum Eip1193Error {
    /// Thrown if the wallet rejected the request with something that is not a JSON-RPC error
    #[error("JsValue error: {0}")]
    JsValueError(String),

    #[error(transparent)]
    /// Error object returned by the wallet (`{ code, message, data }`)
    JsonRpcError(#[from] JsonRpcError),

    #[error(transparent)]
    /// Serde JSON Error
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    SignatureError(#[from] SignatureError),

    #[error(transparent)]
    HexError(#[from] FromHexError),

    #[error("Communication error")]
    CommunicationError,
}

impl Eip1193Error {
    /// Returns true when the wallet reports that the user declined the request
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Eip1193Error::JsonRpcError(e) if e.code == USER_REJECTED_REQUEST)
    }
}

impl RpcError for Eip1193Error {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            Eip1193Error::JsonRpcError(e) => Some(e),
            _ => None,
        }
    }

    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            Eip1193Error::SerdeJson(e) => Some(e),
            _ => None,
        }
    }

    fn is_serde_error(&self) -> bool {
        self.as_serde_error().is_some()
    }
}

impl From<JsValue> for Eip1193Error {
    fn from(src: JsValue) -> Self {
        if let Ok(message) = src.into_serde::<JsonRpcError>() {
            Eip1193Error::JsonRpcError(message)
        } else {
            Eip1193Error::JsValueError(format!("{:?}", src))
        }
    }
}

impl From<Eip1193Error> for ProviderError {
    fn from(src: Eip1193Error) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}
