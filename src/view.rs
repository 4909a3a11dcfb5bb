//! HTML markup for each screen. Pure string building so it can be tested on
//! the host; `web::dom` writes the result into the page.

use std::fmt::Write;

use crate::app::{Action, Screen};
use crate::arena::AttackState;
use crate::character::Character;
use crate::config::GameConfig;

pub const ACTION_ATTR: &str = "data-action";
pub const INDEX_ATTR: &str = "data-index";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Map a clicked element's `data-action` / `data-index` back to an action.
pub fn parse_action(action: &str, index: Option<&str>) -> Option<Action> {
    match action {
        "connect" => Some(Action::Connect),
        "attack" => Some(Action::Attack),
        "mint" => index?.parse().ok().map(Action::Mint),
        _ => None,
    }
}

pub fn render_page(screen: &Screen, config: &GameConfig) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<div class='flex flex-col items-center justify-center min-h-screen py-2'>\
         <main class='flex flex-col items-center justify-center w-full flex-1 px-20 text-center'>\
         <h1 class='text-6xl font-bold'>{}</h1>\
         <div class='container flex justify-center mt-5 p-3'>",
        escape(&config.title)
    );
    match screen {
        Screen::Connect {
            account,
            connecting,
            has_wallet,
        } => render_connect(&mut html, config, account.is_some(), *connecting, *has_wallet),
        Screen::SelectCharacter { templates, minting } => {
            render_selection(&mut html, config, templates, *minting)
        }
        Screen::Arena {
            boss,
            player,
            attack_state,
        } => render_arena(&mut html, boss.as_ref(), player.as_ref(), *attack_state),
    }
    let _ = write!(
        html,
        "</div></main>\
         <footer class='flex items-center justify-center w-full h-24 border-t'>\
         <p>{}</p></footer></div>",
        escape(&config.footer)
    );
    html
}

fn button(html: &mut String, action: &str, index: Option<usize>, loading: bool, label: &str) {
    let class = if loading { "btn btn-primary loading" } else { "btn btn-primary" };
    let _ = write!(html, "<button class='{class}' {ACTION_ATTR}='{action}'");
    if let Some(i) = index {
        let _ = write!(html, " {INDEX_ATTR}='{i}'");
    }
    if loading {
        html.push_str(" disabled");
    }
    let _ = write!(html, ">{}</button>", escape(label));
}

fn render_connect(html: &mut String, config: &GameConfig, connected: bool, connecting: bool, has_wallet: bool) {
    let network = escape(&config.network_name);
    let _ = write!(
        html,
        "<div class='space-y-5'>\
         <p>⚠️Currently this dApp only works on the {network} test network⚠️</p>"
    );
    if !has_wallet {
        html.push_str("<p>Please use the MetaMask extension for playing</p>");
    }
    let label = if connecting {
        "Connecting"
    } else if connected {
        "Connected"
    } else {
        "Connect Wallet"
    };
    button(html, "connect", None, connecting, label);
    html.push_str("</div>");
}

fn render_selection(html: &mut String, config: &GameConfig, templates: &[Character], minting: bool) {
    let _ = write!(
        html,
        "<div class='space-y-4'>\
         <h2 class='text-4xl font-bold'>Mint your character</h2>\
         <ul class='list-disc text-left'>\
         <li>minting will take some time</li>\
         <li>only one character allowed per account</li>\
         <li>after minting you can find your character in the \
         <a href='{}'>NFT collection</a></li></ul>\
         <div class='space-x-2 flex'>",
        escape(&config.collection_url)
    );
    for (index, c) in templates.iter().enumerate() {
        let _ = write!(
            html,
            "<div class='card border border-white hover:bg-gray-700'>\
             <figure class='max-w-md'><img src='{}' alt='{}'/></figure>\
             <div class='card-body'><h2 class='card-title'>{}</h2>\
             <p>HP: {}</p><p>Attack: {}</p><p>Type: {}</p>\
             <div class='card-actions flex justify-center'>",
            escape(&c.image_uri),
            escape(&c.name),
            escape(&c.name),
            c.hp(),
            c.attack_damage,
            escape(&c.character_type),
        );
        let label = if minting { "Minting".to_string() } else { format!("Mint {}", c.name) };
        button(html, "mint", Some(index), minting, &label);
        html.push_str("</div></div></div>");
    }
    html.push_str("</div></div>");
}

fn health(html: &mut String, c: &Character) {
    let percent = c.health_percent();
    let _ = write!(
        html,
        "<div class='flex space-x-2 items-center max-w-md'>\
         <span>HP: {}/{}</span>\
         <progress class='flex-1 progress progress-accent' value='{percent}' max='100'></progress>\
         </div>",
        c.hp(),
        c.max_hp,
    );
}

fn card_open(html: &mut String, c: &Character) {
    let _ = write!(
        html,
        "<div class='card border border-white hover:bg-gray-700'>\
         <figure class='max-w-xs'><img src='{}' alt='{}'/></figure>\
         <div class='card-body space-y-2'>",
        escape(&c.image_uri),
        escape(&c.name)
    );
}

fn render_arena(html: &mut String, boss: Option<&Character>, player: Option<&Character>, state: AttackState) {
    html.push_str("<div class='flex-1 flex flex-col justify-center items-center space-y-4'>");
    if let Some(boss) = boss {
        card_open(html, boss);
        health(html, boss);
        html.push_str("</div></div>");
    }
    if let Some(player) = player {
        card_open(html, player);
        health(html, player);
        let label = match state {
            AttackState::Hit => "Hit!",
            _ => "Attack",
        };
        button(html, "attack", None, state == AttackState::Attacking, label);
        html.push_str("</div></div>");
    }
    html.push_str("</div>");
}
