//! Browser bindings: injected wallet, ethers contract, DOM.

pub mod contract;
pub mod dom;
pub mod ethereum;

pub use contract::{BrowserContract, BrowserTx};
pub use dom::{BrowserNotifier, BrowserSpawner, DomRenderer};
pub use ethereum::BrowserWallet;
