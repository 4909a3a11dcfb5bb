//! Arena: the owned character against the boss.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};

use crate::character::{Character, EntityKind};
use crate::contract::{GameContract, PendingTransaction, TxReceipt};
use crate::error::ContractError;
use crate::events::{EventKind, GameEvent, Subscription};
use crate::selection::Redraw;
use crate::store::Store;

/// Attack indicator. Runs `Idle -> Attacking -> Hit -> Idle` on success and
/// `Idle -> Attacking -> Idle` on failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttackState {
    #[default]
    Idle,
    Attacking,
    Hit,
}

struct Inner<C> {
    contract: Rc<C>,
    store: Store,
    boss: RefCell<Option<Character>>,
    // Boss hp from an AttackComplete that arrived before the boss loaded.
    pending_boss_hp: Cell<Option<u32>>,
    attack_state: Cell<AttackState>,
    active: Cell<bool>,
    redraw: Redraw,
}

pub struct Arena<C: GameContract + 'static> {
    inner: Rc<Inner<C>>,
    _attack_complete: Subscription,
}

impl<C: GameContract + 'static> Arena<C> {
    pub fn mount(contract: Rc<C>, store: Store, redraw: Redraw) -> Self {
        let inner = Rc::new(Inner {
            contract: contract.clone(),
            store,
            boss: RefCell::new(None),
            pending_boss_hp: Cell::new(None),
            attack_state: Cell::new(AttackState::Idle),
            active: Cell::new(true),
            redraw,
        });
        let weak = Rc::downgrade(&inner);
        let sub = contract
            .events()
            .subscribe(EventKind::AttackComplete, move |ev| on_attack_complete(&weak, ev));
        Self {
            inner,
            _attack_complete: sub,
        }
    }

    /// Fetch the boss.
    pub fn activate(&self) -> impl Future<Output = ()> + use<C> {
        let inner = self.inner.clone();
        async move { inner.load_boss().await }
    }

    /// Attack the boss. Resolves to the confirmed receipt, or `None` when
    /// rejected (attack pending) or failed. Health values only change when the
    /// contract reports `AttackComplete`.
    pub fn attack(&self) -> impl Future<Output = Option<TxReceipt>> + use<C> {
        let inner = self.inner.clone();
        async move { inner.attack().await }
    }

    pub fn boss(&self) -> Option<Character> {
        self.inner.boss.borrow().clone()
    }

    pub fn attack_state(&self) -> AttackState {
        self.inner.attack_state.get()
    }
}

impl<C: GameContract + 'static> Drop for Arena<C> {
    fn drop(&mut self) {
        self.inner.active.set(false);
        tracing::debug!("arena torn down");
    }
}

fn on_attack_complete<C>(weak: &Weak<Inner<C>>, ev: &GameEvent) {
    let GameEvent::AttackComplete {
        new_boss_hp,
        new_player_hp,
    } = ev
    else {
        return;
    };
    let Some(inner) = weak.upgrade() else { return };
    if !inner.active.get() {
        return;
    }
    let (boss_hp, player_hp) = match (
        new_boss_hp.to_u32_saturating("newBossHp"),
        new_player_hp.to_u32_saturating("newPlayerHp"),
    ) {
        (Ok(boss), Ok(player)) => (boss, player),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "malformed AttackComplete event");
            return;
        }
    };
    tracing::info!(boss_hp, player_hp, "AttackComplete");
    match inner.boss.borrow_mut().as_mut() {
        Some(boss) => boss.set_hp(boss_hp),
        None => inner.pending_boss_hp.set(Some(boss_hp)),
    }
    inner.store.set_character_hp(player_hp);
    (inner.redraw)();
}

impl<C: GameContract> Inner<C> {
    async fn load_boss(&self) {
        let boss = self.contract.big_boss().await.and_then(|raw| {
            if raw.is_empty() {
                return Ok(None);
            }
            Character::from_raw(&raw, EntityKind::Boss).map(Some)
        });
        if !self.active.get() {
            return;
        }
        match boss {
            Ok(Some(mut boss)) => {
                if let Some(hp) = self.pending_boss_hp.take() {
                    tracing::debug!(hp, fetched = boss.hp(), "applying AttackComplete seen during boss fetch");
                    boss.set_hp(hp);
                }
                tracing::info!(name = %boss.name, hp = boss.hp(), max_hp = boss.max_hp, "boss loaded");
                *self.boss.borrow_mut() = Some(boss);
                (self.redraw)();
            }
            Ok(None) => tracing::warn!("contract reports no boss"),
            Err(e) => tracing::error!(error = %e, "fetching boss failed"),
        }
    }

    async fn attack(&self) -> Option<TxReceipt> {
        if self.attack_state.get() != AttackState::Idle {
            tracing::warn!("attack already in progress");
            return None;
        }
        self.set_state(AttackState::Attacking);
        tracing::info!("attacking boss");
        let outcome = match self.submit_attack().await {
            Ok(receipt) => {
                tracing::info!(hash = %receipt.hash, "attack confirmed");
                self.set_state(AttackState::Hit);
                Some(receipt)
            }
            Err(e) => {
                tracing::error!(error = %e, "error attacking boss");
                None
            }
        };
        self.set_state(AttackState::Idle);
        outcome
    }

    async fn submit_attack(&self) -> Result<TxReceipt, ContractError> {
        let tx = self.contract.attack_boss().await?;
        tracing::debug!(hash = tx.hash(), "attack submitted");
        tx.wait().await
    }

    fn set_state(&self, state: AttackState) {
        self.attack_state.set(state);
        if self.active.get() {
            (self.redraw)();
        }
    }
}
