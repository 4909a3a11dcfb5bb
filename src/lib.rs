//! Epic Battle front end crate.
//!
//! The page calls `start_app(root_id)`. From there the app reads any wallet
//! authorisation that already exists, then walks the user through
//! connect -> mint a character -> fight the boss. Game rules live in the
//! contract. This crate only orchestrates calls, confirmations and events.
//!
//! Everything outside `web` is plain Rust and tests on the host.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

pub mod app;
pub mod arena;
pub mod character;
pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod selection;
pub mod store;
pub mod view;
pub mod wallet;
pub mod web;

pub use app::{Action, App, Screen};
pub use arena::AttackState;
pub use character::{Character, EntityKind, Quantity, RawCharacter};
pub use config::GameConfig;
pub use error::{AppError, ContractError, WalletError};
pub use events::{EventHub, EventKind, GameEvent, Subscription};
pub use store::{Store, View};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    tracing_wasm::set_as_global_default();
}

type BrowserApp = App<web::BrowserWallet, web::BrowserContract, web::BrowserNotifier>;

thread_local! {
    // Keeps the app alive for the lifetime of the page.
    static APP: std::cell::RefCell<Option<Rc<BrowserApp>>> = const { std::cell::RefCell::new(None) };
}

/// Mount the game into the element with id `root_id`.
#[wasm_bindgen]
pub fn start_app(root_id: &str) -> Result<(), JsValue> {
    let doc = web::dom::document()?;
    let root = doc
        .get_element_by_id(root_id)
        .ok_or(AppError::Missing("root element"))?;
    let config = web::dom::load_config(&doc)?;

    let wallet = web::BrowserWallet::detect().map(Rc::new);
    let provider = wallet.as_ref().map(|w| w.provider().clone());
    let address = config.contract_address.clone();
    let factory: app::ContractFactory<web::BrowserContract> = Box::new(move || {
        let ethereum = provider
            .as_ref()
            .ok_or_else(|| ContractError::Unavailable("ethereum object not found".into()))?;
        web::BrowserContract::connect(ethereum, &address)
    });

    let renderer = Rc::new(web::DomRenderer::new(root, config.clone()));
    let render = {
        let renderer = renderer.clone();
        Rc::new(move |screen: &Screen| renderer.render(screen))
    };
    let app = App::new(
        config,
        wallet,
        Rc::new(web::BrowserNotifier),
        factory,
        Rc::new(web::BrowserSpawner),
        render,
    );

    let weak = Rc::downgrade(&app);
    renderer.on_action(move |action| {
        if let Some(app) = weak.upgrade() {
            app.dispatch(action);
        }
    })?;

    app.redraw();
    let booting = app.clone();
    wasm_bindgen_futures::spawn_local(async move { booting.boot().await });
    APP.with(|slot| slot.replace(Some(app)));
    Ok(())
}
