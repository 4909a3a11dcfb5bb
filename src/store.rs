//! Application store: the account, the connecting flag and the owned
//! character. Writers per field:
//! - `account`, `connecting`: wallet `Connector`
//! - `character`: the controller (initial lookup, mint hand-off)
//! - `character` hp: `Arena`
//!
//! Every write notifies watchers after the borrow is released, so a watcher
//! may read the store freely.

use std::cell::RefCell;
use std::rc::Rc;

use crate::character::Character;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    pub account: Option<String>,
    pub connecting: bool,
    pub character: Option<Character>,
}

/// Which view the state selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Connect,
    SelectCharacter,
    Arena,
}

impl AppState {
    pub fn view(&self) -> View {
        match (&self.account, &self.character) {
            (None, _) => View::Connect,
            (Some(_), None) => View::SelectCharacter,
            (Some(_), Some(_)) => View::Arena,
        }
    }
}

type Watcher = Rc<dyn Fn()>;

#[derive(Default)]
struct Inner {
    state: RefCell<AppState>,
    watchers: RefCell<Vec<Watcher>>,
}

#[derive(Clone, Default)]
pub struct Store {
    inner: Rc<Inner>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn view(&self) -> View {
        self.inner.state.borrow().view()
    }

    pub fn account(&self) -> Option<String> {
        self.inner.state.borrow().account.clone()
    }

    pub fn character(&self) -> Option<Character> {
        self.inner.state.borrow().character.clone()
    }

    pub fn is_connecting(&self) -> bool {
        self.inner.state.borrow().connecting
    }

    pub fn watch(&self, f: impl Fn() + 'static) {
        self.inner.watchers.borrow_mut().push(Rc::new(f));
    }

    pub fn set_account(&self, account: Option<String>) {
        self.update(|s| s.account = account);
    }

    pub fn set_connecting(&self, connecting: bool) {
        self.update(|s| s.connecting = connecting);
    }

    pub fn set_character(&self, character: Option<Character>) {
        self.update(|s| s.character = character);
    }

    /// Patch the owned character's hp. No-op when nothing is owned.
    pub fn set_character_hp(&self, hp: u32) {
        self.update(|s| {
            if let Some(c) = s.character.as_mut() {
                c.set_hp(hp);
            }
        });
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        f(&mut self.inner.state.borrow_mut());
        let watchers: Vec<Watcher> = self.inner.watchers.borrow().clone();
        for w in watchers {
            w();
        }
    }
}
