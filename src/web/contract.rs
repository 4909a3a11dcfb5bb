//! Game contract over the page's global `ethers` (v5) library.

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::character::{Quantity, RawCharacter};
use crate::contract::{GameContract, PendingTransaction, TxReceipt};
use crate::error::{ContractError, js_message};
use crate::events::{EventHub, EventKind, GameEvent};

/// Human-readable ABI of the game contract.
pub const GAME_ABI: &[&str] = &[
    "function getAllDefaultCharacters() view returns (tuple(uint256 characterIndex, string name, string imageURI, uint256 hp, uint256 maxHp, uint256 attackDamage, string characterType)[])",
    "function checkIfUserHasNFT() view returns (tuple(uint256 characterIndex, string name, string imageURI, uint256 hp, uint256 maxHp, uint256 attackDamage, string characterType))",
    "function getBigBoss() view returns (tuple(string name, string imageURI, uint256 hp, uint256 maxHp, uint256 attackDamage, string characterType))",
    "function mintCharacterNFT(uint256 _characterIndex)",
    "function attackBoss()",
    "event CharacterNFTMinted(address sender, uint256 tokenId, uint256 characterIndex)",
    "event AttackComplete(uint256 newBossHp, uint256 newPlayerHp)",
];

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["ethers", "providers"])]
    type Web3Provider;

    #[wasm_bindgen(constructor, catch, js_namespace = ["ethers", "providers"])]
    fn new(ethereum: &JsValue) -> Result<Web3Provider, JsValue>;

    #[wasm_bindgen(method, js_name = getSigner)]
    fn get_signer(this: &Web3Provider) -> JsValue;

    #[wasm_bindgen(js_namespace = ethers, js_name = Contract)]
    type EthersContract;

    #[wasm_bindgen(constructor, catch, js_namespace = ethers, js_class = "Contract")]
    fn new(address: &str, abi: &Array, signer: &JsValue) -> Result<EthersContract, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &EthersContract, event: &str, listener: &Function);

    #[wasm_bindgen(method)]
    fn off(this: &EthersContract, event: &str, listener: &Function);
}

type MintedListener = Closure<dyn FnMut(JsValue, JsValue, JsValue)>;
type AttackListener = Closure<dyn FnMut(JsValue, JsValue)>;

/// Contract handle bound to the wallet's signer. JS listeners for both game
/// events are attached on creation and detached on drop; they forward into
/// the `EventHub`.
pub struct BrowserContract {
    inner: EthersContract,
    events: EventHub,
    minted: MintedListener,
    attack_complete: AttackListener,
}

impl BrowserContract {
    pub fn connect(ethereum: &JsValue, address: &str) -> Result<Self, ContractError> {
        let unavailable = |e: JsValue| ContractError::Unavailable(js_message(&e));
        let provider = Web3Provider::new(ethereum).map_err(unavailable)?;
        let signer = provider.get_signer();
        let abi: Array = GAME_ABI.iter().map(|s| JsValue::from_str(s)).collect();
        let inner = EthersContract::new(address, &abi, &signer).map_err(unavailable)?;

        let events = EventHub::new();
        let hub = events.clone();
        let minted: MintedListener = Closure::new(move |sender: JsValue, token_id: JsValue, index: JsValue| {
            match decode_minted(&sender, &token_id, &index) {
                Ok(ev) => {
                    hub.emit(&ev);
                }
                Err(e) => tracing::error!(error = %e, "undecodable CharacterNFTMinted"),
            }
        });
        let hub = events.clone();
        let attack_complete: AttackListener = Closure::new(move |boss_hp: JsValue, player_hp: JsValue| {
            match (quantity(&boss_hp), quantity(&player_hp)) {
                (Ok(new_boss_hp), Ok(new_player_hp)) => {
                    hub.emit(&GameEvent::AttackComplete { new_boss_hp, new_player_hp });
                }
                (Err(e), _) | (_, Err(e)) => tracing::error!(error = %e, "undecodable AttackComplete"),
            }
        });
        inner.on(EventKind::CharacterNftMinted.abi_name(), minted.as_ref().unchecked_ref());
        inner.on(EventKind::AttackComplete.abi_name(), attack_complete.as_ref().unchecked_ref());
        tracing::info!(%address, "game contract connected");

        Ok(Self {
            inner,
            events,
            minted,
            attack_complete,
        })
    }

    async fn call(&self, method: &'static str, args: &Array) -> Result<JsValue, ContractError> {
        tracing::debug!(method, "contract call");
        let fail = |e: JsValue| ContractError::Call {
            method,
            message: js_message(&e),
        };
        let function: Function = Reflect::get(&self.inner, &JsValue::from_str(method))
            .map_err(fail)?
            .dyn_into()
            .map_err(|_| ContractError::Call {
                method,
                message: "not a function".into(),
            })?;
        let promise: Promise = function
            .apply(&self.inner, args)
            .map_err(fail)?
            .dyn_into()
            .map_err(|_| ContractError::Call {
                method,
                message: "did not return a promise".into(),
            })?;
        JsFuture::from(promise).await.map_err(fail)
    }

    async fn send(&self, method: &'static str, args: &Array) -> Result<BrowserTx, ContractError> {
        let tx = self.call(method, args).await?;
        let hash = Reflect::get(&tx, &JsValue::from_str("hash"))
            .ok()
            .and_then(|h| h.as_string())
            .unwrap_or_default();
        Ok(BrowserTx { tx, hash })
    }
}

impl Drop for BrowserContract {
    fn drop(&mut self) {
        self.inner
            .off(EventKind::CharacterNftMinted.abi_name(), self.minted.as_ref().unchecked_ref());
        self.inner
            .off(EventKind::AttackComplete.abi_name(), self.attack_complete.as_ref().unchecked_ref());
    }
}

impl GameContract for BrowserContract {
    type Tx = BrowserTx;

    async fn all_default_characters(&self) -> Result<Vec<RawCharacter>, ContractError> {
        let list = self.call("getAllDefaultCharacters", &Array::new()).await?;
        if !Array::is_array(&list) {
            return Err(ContractError::Decode("character list is not an array".into()));
        }
        Array::from(&list).iter().map(|c| raw_character(&c)).collect()
    }

    async fn user_character(&self) -> Result<RawCharacter, ContractError> {
        raw_character(&self.call("checkIfUserHasNFT", &Array::new()).await?)
    }

    async fn big_boss(&self) -> Result<RawCharacter, ContractError> {
        raw_character(&self.call("getBigBoss", &Array::new()).await?)
    }

    async fn mint_character_nft(&self, character_index: u32) -> Result<BrowserTx, ContractError> {
        let args = Array::of1(&JsValue::from(character_index));
        self.send("mintCharacterNFT", &args).await
    }

    async fn attack_boss(&self) -> Result<BrowserTx, ContractError> {
        self.send("attackBoss", &Array::new()).await
    }

    fn events(&self) -> &EventHub {
        &self.events
    }
}

/// Transaction response; `wait()` resolves with the mined receipt.
pub struct BrowserTx {
    tx: JsValue,
    hash: String,
}

impl PendingTransaction for BrowserTx {
    fn hash(&self) -> &str {
        &self.hash
    }

    async fn wait(self) -> Result<TxReceipt, ContractError> {
        let failed = |e: JsValue| ContractError::Transaction(js_message(&e));
        let wait: Function = Reflect::get(&self.tx, &JsValue::from_str("wait"))
            .map_err(failed)?
            .dyn_into()
            .map_err(|_| ContractError::Transaction("response has no wait()".into()))?;
        let promise: Promise = wait
            .call0(&self.tx)
            .map_err(failed)?
            .dyn_into()
            .map_err(|_| ContractError::Transaction("wait() did not return a promise".into()))?;
        let receipt = JsFuture::from(promise).await.map_err(failed)?;
        let hash = Reflect::get(&receipt, &JsValue::from_str("transactionHash"))
            .ok()
            .and_then(|h| h.as_string())
            .unwrap_or(self.hash);
        Ok(TxReceipt { hash })
    }
}

/// Decimal text of a BigNumber or plain JS number.
fn quantity(value: &JsValue) -> Result<Quantity, ContractError> {
    if let Some(n) = value.as_f64() {
        if n >= 0.0 && n.fract() == 0.0 {
            return Ok(Quantity(format!("{n:.0}")));
        }
        return Err(ContractError::Decode(format!("not a quantity: {n}")));
    }
    let to_string: Function = Reflect::get(value, &JsValue::from_str("toString"))
        .ok()
        .and_then(|f| f.dyn_into().ok())
        .ok_or_else(|| ContractError::Decode("quantity has no toString()".into()))?;
    to_string
        .call0(value)
        .ok()
        .and_then(|s| s.as_string())
        .map(Quantity)
        .ok_or_else(|| ContractError::Decode("quantity toString() failed".into()))
}

fn field(record: &JsValue, name: &str) -> Result<JsValue, ContractError> {
    Reflect::get(record, &JsValue::from_str(name))
        .map_err(|e| ContractError::Decode(format!("{name}: {}", js_message(&e))))
}

fn text_field(record: &JsValue, name: &str) -> Result<String, ContractError> {
    let value = field(record, name)?;
    if value.is_undefined() {
        return Ok(String::new());
    }
    value
        .as_string()
        .ok_or_else(|| ContractError::Decode(format!("{name} is not a string")))
}

fn raw_character(record: &JsValue) -> Result<RawCharacter, ContractError> {
    Ok(RawCharacter {
        name: text_field(record, "name")?,
        image_uri: text_field(record, "imageURI")?,
        hp: quantity(&field(record, "hp")?)?,
        max_hp: quantity(&field(record, "maxHp")?)?,
        attack_damage: quantity(&field(record, "attackDamage")?)?,
        character_type: text_field(record, "characterType")?,
    })
}

fn decode_minted(sender: &JsValue, token_id: &JsValue, index: &JsValue) -> Result<GameEvent, ContractError> {
    Ok(GameEvent::CharacterNftMinted {
        sender: sender
            .as_string()
            .ok_or_else(|| ContractError::Decode("sender is not an address".into()))?,
        token_id: quantity(token_id)?,
        character_index: quantity(index)?,
    })
}
