//! localStorage を使った下書きの保存・復元（ブラウザで実行）

use spare_parts_common::{
    DraftSession, DraftSlot, DraftStore, KeyValueStore, Repairability, RestoreOutcome, SelectedPart,
};
use spare_parts_wasm::LocalStore;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_store() -> DraftStore<LocalStore> {
    let mut store = DraftStore::new(LocalStore::open().expect("localStorage"));
    store.clear_all().expect("clear");
    store
}

fn part(id: &str, name: &str) -> SelectedPart {
    SelectedPart {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} description", name),
        quantity: 1,
        max_qty: Some(2),
        old_serial_number: None,
        new_serial_number: None,
        is_out_of_warranty: false,
        appeal_reason: None,
        is_appeal_invalid: false,
    }
}

#[wasm_bindgen_test]
fn test_set_and_remove_item() {
    let mut store = LocalStore::open().expect("localStorage");
    store.set_item("partsDraftProbe", "1").unwrap();
    assert_eq!(store.get_item("partsDraftProbe").unwrap().as_deref(), Some("1"));

    store.remove_item("partsDraftProbe").unwrap();
    assert_eq!(store.get_item("partsDraftProbe").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_draft_survives_new_session() {
    let store = fresh_store();
    let mut session = DraftSession::new("SC-1", store);
    session.enter();
    session.apply_existing_lines(Vec::new());
    session.ledger_mut().add_part(part("01tA", "Filter A"));
    session.ledger_mut().set_repairability(Some(Repairability::StartingRepair));
    session.suspend();

    let mut next = DraftSession::new("SC-1", session.into_store());
    assert_eq!(next.enter(), RestoreOutcome::Restored);
    assert_eq!(next.ledger().selected().len(), 1);
    assert_eq!(next.ledger().repairability(), Some(Repairability::StartingRepair));
}

#[wasm_bindgen_test]
fn test_validate_clears_local_storage() {
    let store = fresh_store();
    let mut session = DraftSession::new("SC-2", store);
    session.enter();
    session.apply_existing_lines(Vec::new());
    session.ledger_mut().add_part(part("01tB", "Brush B"));
    session.ledger_mut().set_repairability(Some(Repairability::WaitingForParts));

    assert!(session.validate().is_valid);

    let store = session.into_store();
    for slot in DraftSlot::ALL {
        assert!(!store.contains(slot).unwrap(), "{} が残っている", slot);
    }
}
