//! Integration tests for the sled-backed sheet store

mod common;

use charsheet::engine::{Action, Credits, ItemId, SheetStore, StoreError};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_state_round_trip() {
    let tmp = tempdir().unwrap();
    let store = SheetStore::open(tmp.path()).unwrap();
    let state = common::seed_character();

    store.put_state(state.clone()).unwrap();
    assert_eq!(store.load_state().unwrap(), state);
}

#[test]
fn test_apply_persists_and_journals() {
    let tmp = tempdir().unwrap();
    let engine = common::seeded_engine();
    {
        let store = SheetStore::open(tmp.path()).unwrap();
        store.seed_if_empty(common::sample_state()).unwrap();

        let sell = Action::from_value(json!({"action": "sell", "id": "x", "qty": 3})).unwrap();
        let outcome = store.apply(&engine, &sell).unwrap();
        assert!(outcome.is_applied());

        let equip = Action::from_value(json!({"action": "toggle_equip", "id": "x", "equipped": true})).unwrap();
        let outcome = store.apply(&engine, &equip).unwrap();
        assert_eq!(outcome.code(), "not_equippable");
    }

    // Reopen to make sure everything reached disk
    let store = SheetStore::open(tmp.path()).unwrap();
    let state = store.load_state().unwrap();
    assert_eq!(state.credits, Credits::whole(16));
    assert_eq!(state.bag.quantity_of(&ItemId::new("x")), 2);

    let journal = store.journal(10).unwrap();
    assert_eq!(journal.len(), 2);
    assert_eq!(store.journal_len(), 2);
    assert_eq!(journal[0].outcome, "not_equippable");
    assert_eq!(journal[1].outcome, "ok");
    assert!(journal[0].seq > journal[1].seq);
    let logged: serde_json::Value = serde_json::from_str(&journal[1].action).unwrap();
    assert_eq!(logged["action"], "sell");

    assert_eq!(store.journal(1).unwrap().len(), 1);
}

#[test]
fn test_apply_without_sheet_fails() {
    let tmp = tempdir().unwrap();
    let store = SheetStore::open(tmp.path()).unwrap();
    let action = Action::from_value(json!({"action": "update_credits", "credits": 5})).unwrap();
    let err = store.apply(&common::seeded_engine(), &action).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_concurrent_sales_are_serialized() {
    let tmp = tempdir().unwrap();
    let store = Arc::new(SheetStore::open(tmp.path()).unwrap());
    let engine = Arc::new(common::seeded_engine());
    store.seed_if_empty(common::sample_state()).unwrap();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let store = Arc::clone(&store);
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let sell = Action::from_value(json!({"action": "sell", "id": "x", "qty": 1})).unwrap();
                store.apply(&engine, &sell).unwrap().is_applied()
            })
        })
        .collect();
    let applied = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(applied, 5);
    let state = store.load_state().unwrap();
    assert!(!state.bag.contains(&ItemId::new("x")));
    assert_eq!(state.credits, Credits::whole(20));
    assert_eq!(store.journal_len(), 5);
}
