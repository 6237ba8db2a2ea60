//! JSON file store integration tests.
//!
//! These tests use a temporary directory per test and exercise the full
//! save/load contract through the `LedgerStore` trait.

use beer_pot::{
    Money, Participants, Pot, Side,
    store::{JsonFileStore, LedgerStore},
};

fn sample_pot() -> Pot {
    let mut pot = Pot::new(Participants::default());
    pot.record_bet(false, true, "Pizza", Money::from_cents(500))
        .unwrap();
    pot.record_purchase(Money::from_cents(250), Side::Second, "")
        .unwrap();
    pot.record_transfer(Money::from_cents(100), Side::First, Side::Second, "")
        .unwrap();
    pot
}

#[tokio::test]
async fn test_save_load_is_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    let pot = sample_pot();

    store.save(&pot.to_document()).await.unwrap();
    let first = store.load().await.unwrap().unwrap();
    store.save(&first).await.unwrap();
    let second = store.load().await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first, pot.to_document());

    let restored = Pot::from_document(second, Participants::default()).unwrap();
    assert_eq!(restored, pot);
}

#[tokio::test]
async fn test_stored_balance_is_ignored_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());

    let mut document = sample_pot().to_document();
    document.balance = "1000.00".to_string();
    store.save(&document).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    let pot = Pot::from_document(loaded, Participants::default()).unwrap();
    assert_eq!(pot.balance(), Money::from_cents(250));
}

#[tokio::test]
async fn test_file_layout_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    let mut pot = sample_pot();
    pot.reset();
    pot.record_bet(false, false, "", Money::from_cents(100))
        .unwrap();
    store.save(&pot.to_document()).await.unwrap();

    let text = std::fs::read_to_string(dir.path().join("wette_pot.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["balance"], "2.00");
    assert_eq!(value["history"][0]["kind"], "BET");
    assert_eq!(value["history"][0]["losers"], "Sven verliert, Sevi verliert");
    assert_eq!(value["history"][0]["delta"], "2.00");
    assert!(value["last_reset"].is_string());
    // Pretty-printed
    assert!(text.contains("\n  \"history\""));
}

#[tokio::test]
async fn test_save_overwrites_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::in_dir(dir.path());

    store.save(&sample_pot().to_document()).await.unwrap();
    let empty = Pot::new(Participants::default());
    store.save(&empty.to_document()).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert!(loaded.history.is_empty());
    assert_eq!(loaded.last_reset, None);
}
