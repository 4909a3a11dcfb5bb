//! Error types for the wallet, contract and configuration boundaries.
//!
//! None of these cross the view that triggered them: views log and reset
//! their pending state, the controller turns lookup failures into an alert.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures talking to the injected wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no wallet provider installed")]
    NoProvider,
    #[error("wallet request rejected: {0}")]
    Rejected(String),
    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

/// Failures talking to the game contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("contract unavailable: {0}")]
    Unavailable(String),
    #[error("call to {method} failed: {message}")]
    Call { method: &'static str, message: String },
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("could not decode contract data: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{0}` must not be empty")]
    Empty(&'static str),
}

/// Errors surfaced by the wasm entry point.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no {0} available")]
    Missing(&'static str),
    #[error("dom operation failed: {0}")]
    Dom(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text of a thrown JS value (Error objects, strings, anything else).
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
