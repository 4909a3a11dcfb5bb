//! Runtime configuration. Compiled-in defaults point at the deployed game
//! contract; the host page may override fields with a JSON document.

use serde::Deserialize;

use crate::error::ConfigError;

/// Address of the deployed game contract.
pub const CONTRACT_ADDRESS: &str = "0x050808338090Ff4afD5b2D1fEdc7bf97540DF111";
/// Network the contract lives on, shown to the user in notices.
pub const NETWORK_NAME: &str = "Rinkeby";
pub const TITLE: &str = "Epic Pokemon NFT Battle";
pub const COLLECTION_URL: &str = "https://testnets.opensea.io/collection/pokemon-battle";
pub const FOOTER: &str = "Made by Indra";
/// Element id of the optional JSON config block in the host page.
pub const CONFIG_ELEMENT_ID: &str = "epic-battle-config";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GameConfig {
    pub contract_address: String,
    pub network_name: String,
    pub title: String,
    pub collection_url: String,
    pub footer: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            contract_address: CONTRACT_ADDRESS.to_string(),
            network_name: NETWORK_NAME.to_string(),
            title: TITLE.to_string(),
            collection_url: COLLECTION_URL.to_string(),
            footer: FOOTER.to_string(),
        }
    }
}

impl GameConfig {
    /// Parse an override document. Missing keys keep their defaults.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.contract_address.trim().is_empty() {
            return Err(ConfigError::Empty("contractAddress"));
        }
        if self.network_name.trim().is_empty() {
            return Err(ConfigError::Empty("networkName"));
        }
        Ok(())
    }

    /// Notice shown when the owned-character lookup fails.
    pub fn wrong_network_notice(&self) -> String {
        format!("Please check that you are in {} test network", self.network_name)
    }
}
