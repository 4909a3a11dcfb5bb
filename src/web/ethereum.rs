//! Injected `window.ethereum` provider (MetaMask and compatibles).

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::{WalletError, js_message};
use crate::wallet::WalletProvider;

pub struct BrowserWallet {
    ethereum: JsValue,
}

impl BrowserWallet {
    /// `None` when no wallet extension injected a provider.
    pub fn detect() -> Option<Self> {
        let win = web_sys::window()?;
        let ethereum = Reflect::get(&win, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        tracing::debug!("found injected ethereum provider");
        Some(Self { ethereum })
    }

    /// Raw provider object, needed to build an ethers provider on top.
    pub fn provider(&self) -> &JsValue {
        &self.ethereum
    }

    async fn request(&self, method: &str) -> Result<JsValue, WalletError> {
        let request: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))
            .ok()
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| WalletError::Malformed("provider has no request()".into()))?;
        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(|e| WalletError::Malformed(js_message(&e)))?;
        let promise: Promise = request
            .call1(&self.ethereum, &args)
            .map_err(|e| WalletError::Rejected(js_message(&e)))?
            .dyn_into()
            .map_err(|_| WalletError::Malformed(format!("{method} did not return a promise")))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| WalletError::Rejected(js_message(&e)))
    }

    async fn request_accounts_via(&self, method: &str) -> Result<Vec<String>, WalletError> {
        let value = self.request(method).await?;
        if !Array::is_array(&value) {
            return Err(WalletError::Malformed(format!("{method} returned a non-array")));
        }
        Array::from(&value)
            .iter()
            .map(|v| {
                v.as_string()
                    .ok_or_else(|| WalletError::Malformed("account is not a string".into()))
            })
            .collect()
    }
}

impl WalletProvider for BrowserWallet {
    async fn accounts(&self) -> Result<Vec<String>, WalletError> {
        self.request_accounts_via("eth_accounts").await
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.request_accounts_via("eth_requestAccounts").await
    }
}
