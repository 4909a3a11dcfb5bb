//! Boundary to the game contract: read calls, write calls that hand back a
//! pending transaction, and the event hub the contract publishes into.
//!
//! Futures here are `!Send`; everything runs on the browser event loop.

#![allow(async_fn_in_trait)]

use crate::character::RawCharacter;
use crate::error::ContractError;
use crate::events::EventHub;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: String,
}

/// A submitted write call. `wait` resolves once the network confirms it.
pub trait PendingTransaction {
    fn hash(&self) -> &str;
    async fn wait(self) -> Result<TxReceipt, ContractError>;
}

pub trait GameContract {
    type Tx: PendingTransaction;

    /// Templates that can be minted, indexed by their position.
    async fn all_default_characters(&self) -> Result<Vec<RawCharacter>, ContractError>;
    /// Character owned by the connected account; empty record if none.
    async fn user_character(&self) -> Result<RawCharacter, ContractError>;
    async fn big_boss(&self) -> Result<RawCharacter, ContractError>;

    async fn mint_character_nft(&self, character_index: u32) -> Result<Self::Tx, ContractError>;
    async fn attack_boss(&self) -> Result<Self::Tx, ContractError>;

    fn events(&self) -> &EventHub;
}
