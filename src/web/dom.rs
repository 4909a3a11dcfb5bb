//! DOM glue: writes screens into the root element, routes clicks back to the
//! app, shows alerts, spawns futures on the browser event loop.

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MouseEvent};

use crate::app::{Action, Screen};
use crate::config::{CONFIG_ELEMENT_ID, GameConfig};
use crate::error::AppError;
use crate::view::{ACTION_ATTR, INDEX_ATTR, parse_action, render_page};
use crate::wallet::Notifier;

pub struct BrowserNotifier;

impl Notifier for BrowserNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!(%message, "alert");
        if let Some(win) = web_sys::window() {
            if let Err(e) = win.alert_with_message(message) {
                tracing::error!(error = %crate::error::js_message(&e), "could not show alert");
            }
        }
    }
}

/// Runs spawned futures with `wasm_bindgen_futures::spawn_local`.
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

pub fn document() -> Result<Document, AppError> {
    web_sys::window()
        .ok_or(AppError::Missing("window"))?
        .document()
        .ok_or(AppError::Missing("document"))
}

/// Defaults, overridden by the page's JSON config block when present.
pub fn load_config(doc: &Document) -> Result<GameConfig, AppError> {
    let Some(el) = doc.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return Ok(GameConfig::default());
    };
    let text = el.text_content().unwrap_or_default();
    let cfg = GameConfig::from_json(&text)?;
    tracing::info!(contract = %cfg.contract_address, network = %cfg.network_name, "config loaded");
    Ok(cfg)
}

pub struct DomRenderer {
    root: Element,
    config: GameConfig,
}

impl DomRenderer {
    pub fn new(root: Element, config: GameConfig) -> Self {
        Self { root, config }
    }

    pub fn render(&self, screen: &Screen) {
        self.root.set_inner_html(&render_page(screen, &self.config));
        if let Ok(doc) = document() {
            doc.set_title(&self.config.title);
        }
    }

    /// One delegated click listener for every button the screens render.
    pub fn on_action(&self, handler: impl Fn(Action) + 'static) -> Result<(), AppError> {
        let listener = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
            let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(button)) = target.closest(&format!("[{ACTION_ATTR}]")) else {
                return;
            };
            if button.has_attribute("disabled") {
                return;
            }
            let action = button.get_attribute(ACTION_ATTR).unwrap_or_default();
            let index = button.get_attribute(INDEX_ATTR);
            match parse_action(&action, index.as_deref()) {
                Some(action) => handler(action),
                None => tracing::warn!(%action, "unknown action"),
            }
        });
        self.root
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(|e| AppError::Dom(crate::error::js_message(&e)))?;
        // The root lives as long as the page.
        listener.forget();
        Ok(())
    }
}
