// Wallet connection and the owned-character lookup that follows it.

mod common;

use common::{ACCOUNT, FakeContract, FakeWallet, Harness, raw};
use epic_battle::{Action, ContractError, Screen, View, WalletError};

#[test]
fn boot_without_authorised_accounts_stays_disconnected() {
    let mut h = Harness::new(Some(FakeWallet::new(&[])), FakeContract::new());
    h.boot();
    assert_eq!(h.app.store().account(), None);
    assert_eq!(h.app.mounted_view(), View::Connect);
    assert!(matches!(h.screen(), Screen::Connect { account: None, connecting: false, has_wallet: true }));
    assert!(h.alerts().is_empty());
    assert_eq!(h.builds.get(), 0, "no contract handle before an account exists");
}

#[test]
fn boot_without_wallet_is_silent() {
    let mut h = Harness::new(None, FakeContract::new());
    h.boot();
    assert_eq!(h.app.store().account(), None);
    assert!(h.alerts().is_empty());
    assert!(matches!(h.screen(), Screen::Connect { has_wallet: false, .. }));
}

#[test]
fn boot_with_authorised_account_and_no_character_shows_templates() {
    let mut h = Harness::new(Some(FakeWallet::new(&[ACCOUNT, "0xother"])), FakeContract::new());
    h.boot();
    assert_eq!(h.app.store().account().as_deref(), Some(ACCOUNT));
    assert_eq!(h.app.mounted_view(), View::SelectCharacter);
    let Screen::SelectCharacter { templates, minting } = h.screen() else {
        panic!("expected character selection, got {:?}", h.screen());
    };
    assert!(!minting);
    let names: Vec<_> = templates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Pikachu", "Charmander", "Squirtle"]);
    assert_eq!(h.contract.calls(), ["checkIfUserHasNFT", "getAllDefaultCharacters"]);
}

#[test]
fn boot_with_owned_character_goes_straight_to_arena() {
    let h = Harness::in_arena(raw("Pikachu", 80, 100));
    assert_eq!(h.app.mounted_view(), View::Arena);
    let Screen::Arena { boss, player, .. } = h.screen() else {
        panic!("expected arena");
    };
    assert_eq!(boss.unwrap().name, "Mewtwo");
    assert_eq!(player.unwrap().hp(), 80);
    assert_eq!(h.builds.get(), 1, "one contract handle per session");
}

#[test]
fn connect_without_wallet_alerts() {
    let mut h = Harness::new(None, FakeContract::new());
    h.boot();
    h.app.dispatch(Action::Connect);
    h.settle();
    assert_eq!(h.alerts(), ["Get MetaMask!"]);
    assert_eq!(h.app.store().account(), None);
    assert!(!h.app.store().is_connecting());
}

#[test]
fn connect_prompts_and_adopts_first_account() {
    let mut h = Harness::new(Some(FakeWallet::new(&[])), FakeContract::new());
    h.boot();
    h.screens.borrow_mut().clear();
    h.app.dispatch(Action::Connect);
    h.settle();

    assert_eq!(h.wallet.as_ref().unwrap().prompts.get(), 1);
    assert_eq!(h.app.store().account().as_deref(), Some(ACCOUNT));
    assert!(!h.app.store().is_connecting());
    assert!(
        h.screens
            .borrow()
            .iter()
            .any(|s| matches!(s, Screen::Connect { connecting: true, .. })),
        "connect button shows the pending state while the wallet prompt is open"
    );
    assert_eq!(h.app.mounted_view(), View::SelectCharacter);
}

#[test]
fn connect_granting_nothing_leaves_account_unset() {
    let wallet = FakeWallet::new(&[]);
    *wallet.grant.borrow_mut() = Ok(vec![]);
    let mut h = Harness::new(Some(wallet), FakeContract::new());
    h.boot();
    h.app.dispatch(Action::Connect);
    h.settle();
    assert_eq!(h.app.store().account(), None);
    assert_eq!(h.app.mounted_view(), View::Connect);
}

#[test]
fn rejected_prompt_resets_connecting() {
    let wallet = FakeWallet::new(&[]);
    *wallet.grant.borrow_mut() = Err(WalletError::Rejected("User rejected the request.".into()));
    let mut h = Harness::new(Some(wallet), FakeContract::new());
    h.boot();
    h.app.dispatch(Action::Connect);
    h.settle();
    assert_eq!(h.app.store().account(), None);
    assert!(!h.app.store().is_connecting());
    assert!(h.alerts().is_empty());
}

#[test]
fn failed_lookup_asks_user_to_switch_network() {
    let contract = FakeContract::new();
    *contract.0.owned.borrow_mut() = Err(ContractError::Call {
        method: "checkIfUserHasNFT",
        message: "call revert exception".into(),
    });
    let mut h = Harness::new(Some(FakeWallet::new(&[ACCOUNT])), contract);
    h.boot();
    assert_eq!(h.alerts(), ["Please check that you are in Rinkeby test network"]);
    assert!(h.app.store().character().is_none());
}

#[test]
fn undecodable_owned_character_counts_as_failed_lookup() {
    let mut h = Harness::new(Some(FakeWallet::new(&[ACCOUNT])), FakeContract::new());
    // A garbage owned record fails decoding and counts as a failed lookup too.
    h.contract.set_owned(epic_battle::RawCharacter {
        name: "Broken".into(),
        hp: epic_battle::Quantity("lots".into()),
        ..raw("Broken", 1, 1)
    });
    h.boot();
    assert_eq!(h.alerts().len(), 1);
    assert_eq!(h.app.mounted_view(), View::SelectCharacter);
}
