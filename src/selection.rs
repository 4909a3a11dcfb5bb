//! Character selection: lists mintable templates and mints one.
//!
//! Active while an account is connected and owns no character. The view
//! watches `CharacterNFTMinted`; when the connected account's mint lands it
//! re-fetches the owned character and hands it to the parent.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::character::{Character, EntityKind};
use crate::contract::{GameContract, PendingTransaction, TxReceipt};
use crate::error::ContractError;
use crate::events::{EventKind, GameEvent, Subscription};
use crate::store::Store;

pub type Redraw = Rc<dyn Fn()>;
pub type HandOff = Rc<dyn Fn(Character)>;

struct Inner<C> {
    contract: Rc<C>,
    store: Store,
    templates: RefCell<Vec<Character>>,
    minting: Cell<bool>,
    active: Cell<bool>,
    redraw: Redraw,
    hand_off: HandOff,
}

pub struct CharacterSelector<C: GameContract + 'static> {
    inner: Rc<Inner<C>>,
    _minted: Subscription,
}

impl<C: GameContract + 'static> CharacterSelector<C> {
    pub fn mount(
        contract: Rc<C>,
        store: Store,
        spawner: Rc<dyn LocalSpawn>,
        redraw: Redraw,
        hand_off: HandOff,
    ) -> Self {
        let inner = Rc::new(Inner {
            contract: contract.clone(),
            store,
            templates: RefCell::new(Vec::new()),
            minting: Cell::new(false),
            active: Cell::new(true),
            redraw,
            hand_off,
        });
        let weak = Rc::downgrade(&inner);
        let minted = contract
            .events()
            .subscribe(EventKind::CharacterNftMinted, move |ev| {
                on_character_minted(&weak, &spawner, ev)
            });
        Self {
            inner,
            _minted: minted,
        }
    }

    /// Fetch the mintable templates. The future owns what it needs, so it can
    /// be spawned.
    pub fn activate(&self) -> impl Future<Output = ()> + use<C> {
        let inner = self.inner.clone();
        async move { inner.load_templates().await }
    }

    /// Mint template `character_index`. Resolves to the confirmed receipt, or
    /// `None` when rejected (already minting) or failed.
    pub fn mint(&self, character_index: u32) -> impl Future<Output = Option<TxReceipt>> + use<C> {
        let inner = self.inner.clone();
        async move { inner.mint(character_index).await }
    }

    pub fn templates(&self) -> Vec<Character> {
        self.inner.templates.borrow().clone()
    }

    pub fn is_minting(&self) -> bool {
        self.inner.minting.get()
    }
}

impl<C: GameContract + 'static> Drop for CharacterSelector<C> {
    fn drop(&mut self) {
        self.inner.active.set(false);
        tracing::debug!("character selection torn down");
    }
}

fn on_character_minted<C: GameContract + 'static>(
    weak: &Weak<Inner<C>>,
    spawner: &Rc<dyn LocalSpawn>,
    ev: &GameEvent,
) {
    let GameEvent::CharacterNftMinted {
        sender,
        token_id,
        character_index,
    } = ev
    else {
        return;
    };
    let Some(inner) = weak.upgrade() else { return };
    if !inner.active.get() {
        return;
    }
    tracing::info!(%sender, %token_id, %character_index, "CharacterNFTMinted");
    let ours = inner
        .store
        .account()
        .is_some_and(|account| account.eq_ignore_ascii_case(sender));
    if !ours {
        tracing::debug!(%sender, "mint event for another account, ignoring");
        return;
    }
    if let Err(e) = spawner.spawn_local(async move { inner.fetch_owned().await }) {
        tracing::error!(error = %e, "could not spawn owned-character fetch");
    }
}

impl<C: GameContract> Inner<C> {
    async fn load_templates(&self) {
        tracing::debug!("getting contract characters to mint");
        let loaded = self.contract.all_default_characters().await.and_then(|raw| {
            raw.iter()
                .map(|r| Character::from_raw(r, EntityKind::Player))
                .collect::<Result<Vec<_>, _>>()
        });
        if !self.active.get() {
            return;
        }
        match loaded {
            Ok(templates) => {
                tracing::info!(count = templates.len(), "mintable characters loaded");
                *self.templates.borrow_mut() = templates;
                (self.redraw)();
            }
            Err(e) => tracing::error!(error = %e, "something went wrong fetching characters"),
        }
    }

    async fn fetch_owned(&self) {
        let owned = self.contract.user_character().await;
        if !self.active.get() {
            tracing::debug!("selection torn down before owned character arrived");
            return;
        }
        match owned {
            Ok(raw) if raw.is_empty() => tracing::warn!("mint confirmed but no character owned yet"),
            Ok(raw) => match Character::from_raw(&raw, EntityKind::Player) {
                Ok(character) => {
                    tracing::info!(name = %character.name, "character minted");
                    (self.hand_off)(character);
                }
                Err(e) => tracing::error!(error = %e, "owned character unreadable"),
            },
            Err(e) => tracing::error!(error = %e, "fetching owned character failed"),
        }
    }

    async fn mint(&self, character_index: u32) -> Option<TxReceipt> {
        if self.minting.get() {
            tracing::warn!(character_index, "mint already in progress");
            return None;
        }
        self.set_minting(true);
        tracing::info!(character_index, "minting character in progress");
        let result = self.submit_mint(character_index).await;
        self.set_minting(false);
        match result {
            Ok(receipt) => {
                tracing::info!(hash = %receipt.hash, "mint confirmed");
                Some(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, character_index, "mint failed");
                None
            }
        }
    }

    async fn submit_mint(&self, character_index: u32) -> Result<TxReceipt, ContractError> {
        let tx = self.contract.mint_character_nft(character_index).await?;
        tracing::debug!(hash = tx.hash(), "mint submitted");
        tx.wait().await
    }

    fn set_minting(&self, minting: bool) {
        self.minting.set(minting);
        if self.active.get() {
            (self.redraw)();
        }
    }
}
