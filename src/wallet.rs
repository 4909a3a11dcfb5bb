//! Wallet connection: reads or requests the active account and records it
//! in the store.

#![allow(async_fn_in_trait)]

use std::rc::Rc;

use crate::error::WalletError;
use crate::store::Store;

pub trait WalletProvider {
    /// Accounts already authorised for this page (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<String>, WalletError>;
    /// Prompt the user to authorise accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

/// Blocking user notices.
pub trait Notifier {
    fn alert(&self, message: &str);
}

pub const NO_WALLET_NOTICE: &str = "Get MetaMask!";

pub struct Connector<W, N> {
    wallet: Option<Rc<W>>,
    notifier: Rc<N>,
    store: Store,
}

impl<W: WalletProvider, N: Notifier> Connector<W, N> {
    pub fn new(wallet: Option<Rc<W>>, notifier: Rc<N>, store: Store) -> Self {
        Self { wallet, notifier, store }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    /// Pick up an account the user authorised earlier, without prompting.
    pub async fn check_existing_connection(&self) -> Option<String> {
        let Some(wallet) = &self.wallet else {
            tracing::info!("no wallet provider found, make sure you have MetaMask");
            return None;
        };
        self.store.set_connecting(true);
        let result = wallet.accounts().await;
        self.store.set_connecting(false);
        match result {
            Ok(accounts) => self.adopt(accounts),
            Err(e) => {
                tracing::warn!(error = %e, "reading authorised accounts failed");
                None
            }
        }
    }

    /// Ask the wallet to authorise an account. Without a wallet the user gets
    /// a blocking notice and `WalletError::NoProvider`.
    pub async fn request_connection(&self) -> Result<Option<String>, WalletError> {
        let Some(wallet) = &self.wallet else {
            self.notifier.alert(NO_WALLET_NOTICE);
            return Err(WalletError::NoProvider);
        };
        self.store.set_connecting(true);
        let result = wallet.request_accounts().await;
        self.store.set_connecting(false);
        let accounts = result.inspect_err(|e| tracing::warn!(error = %e, "account request failed"))?;
        Ok(self.adopt(accounts))
    }

    fn adopt(&self, accounts: Vec<String>) -> Option<String> {
        match accounts.into_iter().next() {
            Some(account) => {
                tracing::info!(%account, "wallet connected");
                self.store.set_account(Some(account.clone()));
                Some(account)
            }
            None => {
                tracing::info!("no authorized account found");
                None
            }
        }
    }
}
