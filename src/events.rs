//! Contract events and scoped subscriptions.
//!
//! `EventHub::subscribe` hands back a `Subscription` guard. Dropping the guard
//! removes the handler; a removed handler is never called again, even when the
//! removal happens in the middle of a dispatch.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::character::Quantity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    CharacterNftMinted,
    AttackComplete,
}

impl EventKind {
    /// Event name in the contract ABI.
    pub fn abi_name(self) -> &'static str {
        match self {
            EventKind::CharacterNftMinted => "CharacterNFTMinted",
            EventKind::AttackComplete => "AttackComplete",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CharacterNftMinted {
        sender: String,
        token_id: Quantity,
        character_index: Quantity,
    },
    AttackComplete {
        new_boss_hp: Quantity,
        new_player_hp: Quantity,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::CharacterNftMinted { .. } => EventKind::CharacterNftMinted,
            GameEvent::AttackComplete { .. } => EventKind::AttackComplete,
        }
    }
}

type Handler = Rc<dyn Fn(&GameEvent)>;

struct Slot {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct HubInner {
    next_id: Cell<u64>,
    slots: RefCell<Vec<Slot>>,
}

impl HubInner {
    fn contains(&self, id: u64) -> bool {
        self.slots.borrow().iter().any(|s| s.id == id)
    }
}

#[derive(Clone, Default)]
pub struct EventHub {
    inner: Rc<HubInner>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: EventKind, handler: impl Fn(&GameEvent) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.slots.borrow_mut().push(Slot {
            id,
            kind,
            handler: Rc::new(handler),
        });
        tracing::debug!(event = kind.abi_name(), id, "subscribed");
        Subscription {
            hub: Rc::downgrade(&self.inner),
            id,
            kind,
        }
    }

    /// Deliver `event` to every current subscriber of its kind. Returns the
    /// number of handlers invoked.
    pub fn emit(&self, event: &GameEvent) -> usize {
        let kind = event.kind();
        // Snapshot so handlers may (un)subscribe while we dispatch.
        let targets: Vec<(u64, Handler)> = self
            .inner
            .slots
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| (s.id, s.handler.clone()))
            .collect();
        let mut delivered = 0;
        for (id, handler) in targets {
            if !self.inner.contains(id) {
                continue;
            }
            handler(event);
            delivered += 1;
        }
        delivered
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.slots.borrow().iter().filter(|s| s.kind == kind).count()
    }
}

/// Live registration on an `EventHub`. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    hub: Weak<HubInner>,
    id: u64,
    kind: EventKind,
}

impl Subscription {
    /// Explicit form of dropping the guard.
    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.slots.borrow_mut().retain(|s| s.id != self.id);
            tracing::debug!(event = self.kind.abi_name(), id = self.id, "unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attack(boss: u64, player: u64) -> GameEvent {
        GameEvent::AttackComplete {
            new_boss_hp: boss.into(),
            new_player_hp: player.into(),
        }
    }

    #[test]
    fn delivers_only_matching_kind() {
        let hub = EventHub::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = hub.subscribe(EventKind::AttackComplete, move |_| h.set(h.get() + 1));
        let minted = GameEvent::CharacterNftMinted {
            sender: "0xabc".into(),
            token_id: 1.into(),
            character_index: 0.into(),
        };
        assert_eq!(hub.emit(&minted), 0);
        assert_eq!(hub.emit(&attack(1, 2)), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let hub = EventHub::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let sub = hub.subscribe(EventKind::AttackComplete, move |_| h.set(h.get() + 1));
        assert_eq!(hub.listener_count(EventKind::AttackComplete), 1);
        sub.release();
        assert_eq!(hub.listener_count(EventKind::AttackComplete), 0);
        hub.emit(&attack(1, 2));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn unsubscribe_during_dispatch_skips_removed_handler() {
        let hub = EventHub::new();
        let second_hits = Rc::new(Cell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let v = victim.clone();
        let _first = hub.subscribe(EventKind::AttackComplete, move |_| {
            v.borrow_mut().take();
        });
        let s = second_hits.clone();
        *victim.borrow_mut() = Some(hub.subscribe(EventKind::AttackComplete, move |_| {
            s.set(s.get() + 1)
        }));

        assert_eq!(hub.emit(&attack(1, 2)), 1);
        assert_eq!(second_hits.get(), 0);
    }

    #[test]
    fn guard_outliving_hub_is_harmless() {
        let hub = EventHub::new();
        let sub = hub.subscribe(EventKind::CharacterNftMinted, |_| {});
        drop(hub);
        drop(sub);
    }
}
