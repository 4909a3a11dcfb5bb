// In-memory stand-ins for the wallet, the game contract and the alert box,
// plus a harness that drives the app on a LocalPool.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use epic_battle::app::ContractFactory;
use epic_battle::contract::{GameContract, PendingTransaction, TxReceipt};
use epic_battle::wallet::{Notifier, WalletProvider};
use epic_battle::{App, ContractError, EventHub, EventKind, GameConfig, GameEvent, Quantity, RawCharacter, Screen, WalletError};
use futures::channel::oneshot;
use futures::executor::LocalPool;

pub const ACCOUNT: &str = "0xAbC0000000000000000000000000000000000001";

pub fn raw(name: &str, hp: u64, max_hp: u64) -> RawCharacter {
    RawCharacter {
        name: name.to_string(),
        image_uri: format!("ipfs://{}", name.to_lowercase()),
        hp: hp.into(),
        max_hp: max_hp.into(),
        attack_damage: Quantity("25".into()),
        character_type: "Electric".into(),
    }
}

pub fn templates() -> Vec<RawCharacter> {
    vec![raw("Pikachu", 100, 100), raw("Charmander", 90, 90), raw("Squirtle", 110, 110)]
}

pub fn boss() -> RawCharacter {
    raw("Mewtwo", 250, 250)
}

pub fn attack_complete(boss_hp: u64, player_hp: u64) -> GameEvent {
    GameEvent::AttackComplete {
        new_boss_hp: boss_hp.into(),
        new_player_hp: player_hp.into(),
    }
}

pub fn minted(sender: &str, index: u64) -> GameEvent {
    GameEvent::CharacterNftMinted {
        sender: sender.to_string(),
        token_id: 7.into(),
        character_index: index.into(),
    }
}

// --- Wallet -----------------------------------------------------------------

pub struct FakeWallet {
    pub authorised: RefCell<Vec<String>>,
    pub grant: RefCell<Result<Vec<String>, WalletError>>,
    pub prompts: Cell<u32>,
}

impl FakeWallet {
    pub fn new(authorised: &[&str]) -> Self {
        Self {
            authorised: RefCell::new(authorised.iter().map(|s| s.to_string()).collect()),
            grant: RefCell::new(Ok(vec![ACCOUNT.to_string()])),
            prompts: Cell::new(0),
        }
    }
}

impl WalletProvider for FakeWallet {
    async fn accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.authorised.borrow().clone())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.prompts.set(self.prompts.get() + 1);
        let granted = self.grant.borrow().clone()?;
        *self.authorised.borrow_mut() = granted.clone();
        Ok(granted)
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub alerts: RefCell<Vec<String>>,
}

impl Notifier for FakeNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

// --- Contract ---------------------------------------------------------------

type Confirm = oneshot::Sender<Result<TxReceipt, ContractError>>;

pub struct FakeState {
    pub templates: RefCell<Result<Vec<RawCharacter>, ContractError>>,
    pub owned: RefCell<Result<RawCharacter, ContractError>>,
    pub boss: RefCell<Result<RawCharacter, ContractError>>,
    pub submit_error: RefCell<Option<ContractError>>,
    pub calls: RefCell<Vec<String>>,
    pending: RefCell<Vec<(String, Confirm)>>,
    next_tx: Cell<u32>,
    events: EventHub,
}

/// Shared handle; clones talk to the same fake chain.
#[derive(Clone)]
pub struct FakeContract(pub Rc<FakeState>);

impl FakeContract {
    pub fn new() -> Self {
        FakeContract(Rc::new(FakeState {
            templates: RefCell::new(Ok(templates())),
            owned: RefCell::new(Ok(RawCharacter::default())),
            boss: RefCell::new(Ok(boss())),
            submit_error: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            next_tx: Cell::new(1),
            events: EventHub::new(),
        }))
    }

    pub fn set_owned(&self, character: RawCharacter) {
        *self.0.owned.borrow_mut() = Ok(character);
    }

    pub fn emit(&self, event: GameEvent) -> usize {
        self.0.events.emit(&event)
    }

    pub fn listeners(&self, kind: EventKind) -> usize {
        self.0.events.listener_count(kind)
    }

    pub fn pending_count(&self) -> usize {
        self.0.pending.borrow().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.calls.borrow().clone()
    }

    /// Confirm the oldest pending transaction.
    pub fn confirm_next(&self) {
        let (hash, tx) = self.0.pending.borrow_mut().remove(0);
        let _ = tx.send(Ok(TxReceipt { hash }));
    }

    /// Revert the oldest pending transaction.
    pub fn revert_next(&self, reason: &str) {
        let (_, tx) = self.0.pending.borrow_mut().remove(0);
        let _ = tx.send(Err(ContractError::Transaction(reason.to_string())));
    }

    fn record(&self, call: &str) {
        self.0.calls.borrow_mut().push(call.to_string());
    }

    fn submit(&self, call: String) -> Result<FakeTx, ContractError> {
        self.record(&call);
        if let Some(e) = self.0.submit_error.borrow_mut().take() {
            return Err(e);
        }
        let n = self.0.next_tx.get();
        self.0.next_tx.set(n + 1);
        let hash = format!("0xtx{n}");
        let (tx, rx) = oneshot::channel();
        self.0.pending.borrow_mut().push((hash.clone(), tx));
        Ok(FakeTx { hash, rx })
    }
}

pub struct FakeTx {
    hash: String,
    rx: oneshot::Receiver<Result<TxReceipt, ContractError>>,
}

impl PendingTransaction for FakeTx {
    fn hash(&self) -> &str {
        &self.hash
    }

    async fn wait(self) -> Result<TxReceipt, ContractError> {
        self.rx
            .await
            .map_err(|_| ContractError::Transaction("dropped".into()))?
    }
}

impl GameContract for FakeContract {
    type Tx = FakeTx;

    async fn all_default_characters(&self) -> Result<Vec<RawCharacter>, ContractError> {
        self.record("getAllDefaultCharacters");
        self.0.templates.borrow().clone()
    }

    async fn user_character(&self) -> Result<RawCharacter, ContractError> {
        self.record("checkIfUserHasNFT");
        self.0.owned.borrow().clone()
    }

    async fn big_boss(&self) -> Result<RawCharacter, ContractError> {
        self.record("getBigBoss");
        self.0.boss.borrow().clone()
    }

    async fn mint_character_nft(&self, character_index: u32) -> Result<FakeTx, ContractError> {
        self.submit(format!("mintCharacterNFT({character_index})"))
    }

    async fn attack_boss(&self) -> Result<FakeTx, ContractError> {
        self.submit("attackBoss".to_string())
    }

    fn events(&self) -> &EventHub {
        &self.0.events
    }
}

// --- Harness ----------------------------------------------------------------

pub type TestApp = App<FakeWallet, FakeContract, FakeNotifier>;

pub struct Harness {
    pub pool: LocalPool,
    pub app: Rc<TestApp>,
    pub wallet: Option<Rc<FakeWallet>>,
    pub contract: FakeContract,
    pub notifier: Rc<FakeNotifier>,
    pub screens: Rc<RefCell<Vec<Screen>>>,
    pub builds: Rc<Cell<u32>>,
}

impl Harness {
    pub fn new(wallet: Option<FakeWallet>, contract: FakeContract) -> Self {
        let pool = LocalPool::new();
        let wallet = wallet.map(Rc::new);
        let notifier = Rc::new(FakeNotifier::default());
        let screens: Rc<RefCell<Vec<Screen>>> = Rc::new(RefCell::new(Vec::new()));
        let builds = Rc::new(Cell::new(0));

        let (c, b) = (contract.clone(), builds.clone());
        let factory: ContractFactory<FakeContract> = Box::new(move || {
            b.set(b.get() + 1);
            Ok(c.clone())
        });
        let s = screens.clone();
        let app = App::new(
            GameConfig::default(),
            wallet.clone(),
            notifier.clone(),
            factory,
            Rc::new(pool.spawner()),
            Rc::new(move |screen: &Screen| s.borrow_mut().push(screen.clone())),
        );
        Self {
            pool,
            app,
            wallet,
            contract,
            notifier,
            screens,
            builds,
        }
    }

    /// Run spawned work until nothing can make progress.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn boot(&mut self) {
        let app = self.app.clone();
        self.pool.run_until(async move { app.boot().await });
        self.settle();
    }

    pub fn screen(&self) -> Screen {
        self.app.screen()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.notifier.alerts.borrow().clone()
    }

    /// Fresh harness already in the arena with `player` owned.
    pub fn in_arena(player: RawCharacter) -> Self {
        let contract = FakeContract::new();
        contract.set_owned(player);
        let mut h = Harness::new(Some(FakeWallet::new(&[ACCOUNT])), contract);
        h.boot();
        h
    }
}
