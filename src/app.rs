//! Application controller.
//!
//! Drives the linear flow connect -> select character -> arena from the
//! store, mounts exactly one view at a time and tears the previous one down
//! (releasing its event subscriptions) when the flow moves on.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::arena::{Arena, AttackState};
use crate::character::{Character, EntityKind};
use crate::config::GameConfig;
use crate::contract::{GameContract, TxReceipt};
use crate::error::ContractError;
use crate::selection::{CharacterSelector, Redraw};
use crate::store::{Store, View};
use crate::wallet::{Connector, Notifier, WalletProvider};

/// Builds the contract handle once an account is connected.
pub type ContractFactory<C> = Box<dyn Fn() -> Result<C, ContractError>>;
pub type Render = Rc<dyn Fn(&Screen)>;

/// Everything the renderer needs for the mounted view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Connect {
        account: Option<String>,
        connecting: bool,
        has_wallet: bool,
    },
    SelectCharacter {
        templates: Vec<Character>,
        minting: bool,
    },
    Arena {
        boss: Option<Character>,
        player: Option<Character>,
        attack_state: AttackState,
    },
}

/// User actions routed from the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Connect,
    Mint(u32),
    Attack,
}

enum Mounted<C: GameContract + 'static> {
    Nothing,
    Select(CharacterSelector<C>),
    Arena(Arena<C>),
}

impl<C: GameContract + 'static> Mounted<C> {
    fn view(&self) -> View {
        match self {
            Mounted::Nothing => View::Connect,
            Mounted::Select(_) => View::SelectCharacter,
            Mounted::Arena(_) => View::Arena,
        }
    }
}

pub struct App<W, C: GameContract + 'static, N> {
    config: GameConfig,
    store: Store,
    connector: Connector<W, N>,
    notifier: Rc<N>,
    factory: ContractFactory<C>,
    contract: RefCell<Option<Rc<C>>>,
    mounted: RefCell<Mounted<C>>,
    spawner: Rc<dyn LocalSpawn>,
    render: Render,
    this: Weak<Self>,
}

impl<W, C, N> App<W, C, N>
where
    W: WalletProvider + 'static,
    C: GameContract + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        config: GameConfig,
        wallet: Option<Rc<W>>,
        notifier: Rc<N>,
        factory: ContractFactory<C>,
        spawner: Rc<dyn LocalSpawn>,
        render: Render,
    ) -> Rc<Self> {
        let store = Store::new();
        Rc::new_cyclic(|this: &Weak<Self>| {
            let weak = this.clone();
            store.watch(move || {
                if let Some(app) = weak.upgrade() {
                    app.redraw();
                }
            });
            Self {
                config,
                connector: Connector::new(wallet, notifier.clone(), store.clone()),
                store,
                notifier,
                factory,
                contract: RefCell::new(None),
                mounted: RefCell::new(Mounted::Nothing),
                spawner,
                render,
                this: this.clone(),
            }
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn mounted_view(&self) -> View {
        self.mounted.borrow().view()
    }

    /// Pick up an existing authorisation and show the matching view.
    pub async fn boot(&self) {
        if self.connector.check_existing_connection().await.is_some() {
            self.load_owned_character().await;
        }
        self.sync_view();
    }

    pub async fn connect(&self) {
        match self.connector.request_connection().await {
            Ok(Some(_)) => self.load_owned_character().await,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "connect wallet failed"),
        }
        self.sync_view();
    }

    pub async fn mint(&self, character_index: u32) -> Option<TxReceipt> {
        let pending = match &*self.mounted.borrow() {
            Mounted::Select(selector) => selector.mint(character_index),
            _ => {
                tracing::warn!("mint requested outside character selection");
                return None;
            }
        };
        pending.await
    }

    pub async fn attack(&self) -> Option<TxReceipt> {
        let pending = match &*self.mounted.borrow() {
            Mounted::Arena(arena) => arena.attack(),
            _ => {
                tracing::warn!("attack requested outside the arena");
                return None;
            }
        };
        pending.await
    }

    /// Run `action` in the background.
    pub fn dispatch(&self, action: Action) {
        let Some(app) = self.this.upgrade() else { return };
        tracing::debug!(?action, "dispatch");
        let spawned = match action {
            Action::Connect => self.spawner.spawn_local(async move { app.connect().await }),
            Action::Mint(index) => self.spawner.spawn_local(async move {
                app.mint(index).await;
            }),
            Action::Attack => self.spawner.spawn_local(async move {
                app.attack().await;
            }),
        };
        if let Err(e) = spawned {
            tracing::error!(error = %e, ?action, "could not spawn action");
        }
    }

    pub fn screen(&self) -> Screen {
        let state = self.store.snapshot();
        match &*self.mounted.borrow() {
            Mounted::Nothing => Screen::Connect {
                account: state.account,
                connecting: state.connecting,
                has_wallet: self.connector.has_wallet(),
            },
            Mounted::Select(selector) => Screen::SelectCharacter {
                templates: selector.templates(),
                minting: selector.is_minting(),
            },
            Mounted::Arena(arena) => Screen::Arena {
                boss: arena.boss(),
                player: state.character,
                attack_state: arena.attack_state(),
            },
        }
    }

    pub fn redraw(&self) {
        let screen = self.screen();
        (self.render)(&screen);
    }

    fn contract(&self) -> Result<Rc<C>, ContractError> {
        if let Some(contract) = self.contract.borrow().as_ref() {
            return Ok(contract.clone());
        }
        let contract = Rc::new((self.factory)()?);
        *self.contract.borrow_mut() = Some(contract.clone());
        Ok(contract)
    }

    async fn load_owned_character(&self) {
        tracing::debug!(account = ?self.store.account(), "checking for character NFT");
        match self.lookup_owned().await {
            Ok(Some(character)) => {
                tracing::info!(name = %character.name, "user has character NFT");
                self.store.set_character(Some(character));
            }
            Ok(None) => tracing::info!("user has no character NFT"),
            Err(e) => {
                tracing::error!(error = %e, "owned character lookup failed");
                self.notifier.alert(&self.config.wrong_network_notice());
            }
        }
    }

    async fn lookup_owned(&self) -> Result<Option<Character>, ContractError> {
        let raw = self.contract()?.user_character().await?;
        if raw.is_empty() {
            return Ok(None);
        }
        Character::from_raw(&raw, EntityKind::Player).map(Some)
    }

    fn on_minted(&self, character: Character) {
        self.store.set_character(Some(character));
        self.sync_view();
    }

    /// Mount the view the store selects, if it is not mounted already.
    fn sync_view(&self) {
        let wanted = self.store.view();
        if self.mounted.borrow().view() == wanted {
            self.redraw();
            return;
        }
        let previous = std::mem::replace(&mut *self.mounted.borrow_mut(), Mounted::Nothing);
        drop(previous);
        tracing::info!(?wanted, "switching view");

        let next = match wanted {
            View::Connect => Mounted::Nothing,
            View::SelectCharacter | View::Arena => match self.contract() {
                Ok(contract) => self.mount(wanted, contract),
                Err(e) => {
                    tracing::error!(error = %e, "contract unavailable");
                    self.notifier.alert(&self.config.wrong_network_notice());
                    Mounted::Nothing
                }
            },
        };
        let activation = match &next {
            Mounted::Nothing => None,
            Mounted::Select(selector) => Some(self.spawner.spawn_local(selector.activate())),
            Mounted::Arena(arena) => Some(self.spawner.spawn_local(arena.activate())),
        };
        if let Some(Err(e)) = activation {
            tracing::error!(error = %e, "could not spawn view activation");
        }
        *self.mounted.borrow_mut() = next;
        self.redraw();
    }

    fn mount(&self, view: View, contract: Rc<C>) -> Mounted<C> {
        let weak = self.this.clone();
        let redraw: Redraw = Rc::new(move || {
            if let Some(app) = weak.upgrade() {
                app.redraw();
            }
        });
        match view {
            View::Arena => Mounted::Arena(Arena::mount(contract, self.store.clone(), redraw)),
            _ => {
                let weak = self.this.clone();
                Mounted::Select(CharacterSelector::mount(
                    contract,
                    self.store.clone(),
                    self.spawner.clone(),
                    redraw,
                    Rc::new(move |character| {
                        if let Some(app) = weak.upgrade() {
                            app.on_minted(character);
                        }
                    }),
                ))
            }
        }
    }
}
