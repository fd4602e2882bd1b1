//! 下書きの状態機械
//!
//! Empty → Restoring → Active → (検証 → 失敗なら Active / 成功なら Committed)
//!
//! 入場時に下書きストアから台帳を復元する。選択行のスロットが無ければ
//! 保存済み明細を外部から取得して初期化する。検証に失敗したらエラーと
//! 修理可否を保存して次回の復元で再表示し、成功したら下書きを全て消す。

use crate::constants::{REPAIRABILITY_ERROR_FIELD, REPAIRABILITY_ERROR_MESSAGE};
use crate::error::{Error, Result};
use crate::ledger::{log_write, SelectionLedger};
use crate::payload::CommitPayload;
use crate::service::PartsService;
use crate::store::{DraftSlot, DraftStore, KeyValueStore};
use crate::types::{SelectedPart, ValidationError};
use serde::Serialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Empty,
    Restoring,
    Active,
    Committed,
}

/// 入場時の復元結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// 下書きから復元した
    Restored,
    /// 下書きが無いので保存済み明細の取得が必要
    NeedsExistingLines,
}

/// 画面に表示するエラー
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFields {
    pub repairability_error: Option<String>,
}

impl ErrorFields {
    fn apply(&mut self, errors: &[ValidationError]) {
        for error in errors {
            match error.field.as_str() {
                REPAIRABILITY_ERROR_FIELD => {
                    self.repairability_error = Some(error.message.clone());
                }
                other => debug!(field = other, "ignoring unknown error field"),
            }
        }
    }
}

/// `validate()` の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ValidationOutcome {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: None,
        }
    }

    /// エラー表示は各フィールド側で行うのでメッセージは空
    fn invalid() -> Self {
        Self {
            is_valid: false,
            error_message: Some(String::new()),
        }
    }
}

pub struct DraftSession<S> {
    service_call_id: String,
    ledger: SelectionLedger<S>,
    state: DraftState,
    awaiting_lines: bool,
    error_fields: ErrorFields,
}

impl<S: KeyValueStore> DraftSession<S> {
    pub fn new(service_call_id: impl Into<String>, store: DraftStore<S>) -> Self {
        Self {
            service_call_id: service_call_id.into(),
            ledger: SelectionLedger::new(store),
            state: DraftState::Empty,
            awaiting_lines: false,
            error_fields: ErrorFields::default(),
        }
    }

    pub fn service_call_id(&self) -> &str {
        &self.service_call_id
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn ledger(&self) -> &SelectionLedger<S> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SelectionLedger<S> {
        &mut self.ledger
    }

    pub fn into_store(self) -> DraftStore<S> {
        self.ledger.into_store()
    }

    pub fn error_fields(&self) -> &ErrorFields {
        &self.error_fields
    }

    pub fn is_awaiting_existing_lines(&self) -> bool {
        self.awaiting_lines
    }

    /// 修理可否エラーを表示するか（未選択の間だけ）
    pub fn is_repairability_error(&self) -> bool {
        self.error_fields.repairability_error.is_some() && self.ledger.repairability().is_none()
    }

    /// 下書きストアから復元する
    pub fn enter(&mut self) -> RestoreOutcome {
        self.state = DraftState::Restoring;

        let store = self.ledger.store();
        let selected = store.selected_parts();
        let repairability = store.repairability();
        let marked = store.marked_for_delete();
        let sku_to_id = store.sku_to_id();
        let errors = store.errors();

        let selected = self.recover(DraftSlot::SelectedParts, selected);
        let repairability = self.recover(DraftSlot::Repairability, repairability);
        let marked = self.recover(DraftSlot::MarkedForDelete, marked);
        let sku_to_id = self.recover(DraftSlot::SkuToId, sku_to_id);
        let errors = self.recover(DraftSlot::Errors, errors);

        // 空配列でも下書きありとして扱い、取得はしない
        let outcome = match selected {
            Some(parts) => {
                debug!(count = parts.len(), "restoring draft selection");
                self.ledger.restore_selected(parts);
                RestoreOutcome::Restored
            }
            None => {
                self.awaiting_lines = true;
                RestoreOutcome::NeedsExistingLines
            }
        };

        if let Some(status) = repairability {
            self.ledger.restore_repairability(status);
        }
        if let Some(ids) = marked {
            self.ledger.restore_marked_for_delete(ids);
        }
        if let Some(map) = sku_to_id {
            self.ledger.restore_sku_to_id(map);
        }
        if let Some(errors) = errors {
            self.error_fields.apply(&errors);
        }

        // エラーと修理可否は一度だけ読む
        let store = self.ledger.store_mut();
        log_write(DraftSlot::Repairability, store.clear(DraftSlot::Repairability));
        log_write(DraftSlot::Errors, store.clear(DraftSlot::Errors));

        if outcome == RestoreOutcome::Restored {
            self.state = DraftState::Active;
        }
        outcome
    }

    /// 保存済み明細の取得結果を反映する。待っていなければ捨てる
    pub fn apply_existing_lines(&mut self, lines: Vec<SelectedPart>) -> bool {
        if !self.awaiting_lines {
            debug!("discarding unexpected service call lines");
            return false;
        }

        debug!(count = lines.len(), "seeding ledger from saved lines");
        self.awaiting_lines = false;
        self.ledger.seed_saved_lines(lines);
        self.state = DraftState::Active;
        true
    }

    /// 保存済み明細の取得失敗。台帳は空のまま続行
    pub fn existing_lines_failed(&mut self, err: &Error) {
        error!(service_call_id = %self.service_call_id, error = %err, "failed to fetch service call lines");
        self.awaiting_lines = false;
        self.state = DraftState::Active;
    }

    /// 復元し、必要なら保存済み明細を取得する
    pub async fn restore<P: PartsService>(&mut self, service: &P) -> RestoreOutcome {
        let outcome = self.enter();
        if outcome == RestoreOutcome::NeedsExistingLines {
            match service.fetch_existing_selection(&self.service_call_id).await {
                Ok(lines) => {
                    self.apply_existing_lines(lines);
                }
                Err(e) => self.existing_lines_failed(&e),
            }
        }
        outcome
    }

    /// 保存前の検証
    pub fn validate(&mut self) -> ValidationOutcome {
        let visible = self.ledger.is_repairability_visible();
        let status = self.ledger.repairability();

        let mut errors = Vec::new();
        if visible && status.is_none() {
            errors.push(ValidationError::new(
                REPAIRABILITY_ERROR_FIELD,
                REPAIRABILITY_ERROR_MESSAGE,
            ));
        }

        if !errors.is_empty() {
            let store = self.ledger.store_mut();
            let result = if visible {
                store.set_repairability(status)
            } else {
                store.clear(DraftSlot::Repairability)
            };
            log_write(DraftSlot::Repairability, result);
            log_write(DraftSlot::Errors, store.set_errors(&errors));

            self.error_fields.apply(&errors);
            self.state = DraftState::Active;
            info!(count = errors.len(), "draft validation failed");
            return ValidationOutcome::invalid();
        }

        if let Err(e) = self.ledger.store_mut().clear_all() {
            warn!(error = %e, "failed to clear draft");
        }
        self.error_fields = ErrorFields::default();
        // 確定後に届いた明細は反映しない
        self.awaiting_lines = false;
        self.state = DraftState::Committed;
        info!(
            parts = self.ledger.selected().len(),
            deletes = self.ledger.marked_for_delete().len(),
            "draft validated"
        );
        ValidationOutcome::valid()
    }

    pub fn commit_payload(&self) -> CommitPayload {
        CommitPayload::from_ledger(&self.service_call_id, &self.ledger)
    }

    /// 外部の保存処理に渡すJSON
    pub fn spare_parts_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.commit_payload())?)
    }

    /// 画面を離れるとき。表示中の修理可否を次回の入場まで残す
    pub fn suspend(&mut self) {
        if self.state == DraftState::Committed || !self.ledger.is_repairability_visible() {
            return;
        }
        if let Some(status) = self.ledger.repairability() {
            let result = self.ledger.store_mut().set_repairability(Some(status));
            log_write(DraftSlot::Repairability, result);
        }
    }

    /// 読めないスロットは未保存として扱い、削除する
    fn recover<T>(&mut self, slot: DraftSlot, result: Result<Option<T>>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(%slot, error = %e, "discarding unreadable draft slot");
                log_write(slot, self.ledger.store_mut().clear(slot));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Repairability, SkuToIdMap};

    fn part(id: &str, name: &str) -> SelectedPart {
        SelectedPart {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            quantity: 1,
            max_qty: Some(5),
            old_serial_number: None,
            new_serial_number: None,
            is_out_of_warranty: false,
            appeal_reason: None,
            is_appeal_invalid: false,
        }
    }

    fn session_with(backend: MemoryStore) -> DraftSession<MemoryStore> {
        DraftSession::new("a1S1", DraftStore::new(backend))
    }

    fn session() -> DraftSession<MemoryStore> {
        session_with(MemoryStore::new())
    }

    #[test]
    fn test_enter_without_draft_needs_lines() {
        let mut session = session();
        assert_eq!(session.enter(), RestoreOutcome::NeedsExistingLines);
        assert_eq!(session.state(), DraftState::Restoring);
        assert!(session.is_awaiting_existing_lines());

        assert!(session.apply_existing_lines(vec![part("a0X7", "X")]));
        assert_eq!(session.state(), DraftState::Active);
        assert_eq!(session.ledger().resolve_id("X"), Some("a0X7"));
    }

    #[test]
    fn test_empty_draft_does_not_fetch() {
        let mut store = DraftStore::new(MemoryStore::new());
        store.set_selected_parts(&[]).unwrap();

        let mut session = DraftSession::new("a1S1", store);
        assert_eq!(session.enter(), RestoreOutcome::Restored);
        assert_eq!(session.state(), DraftState::Active);
        assert!(!session.apply_existing_lines(vec![part("a0X7", "X")]));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_failed_fetch_leaves_empty_ledger() {
        let mut session = session();
        session.enter();
        session.existing_lines_failed(&Error::Remote("timeout".to_string()));
        assert_eq!(session.state(), DraftState::Active);
        assert!(session.ledger().is_empty());
        assert!(!session.apply_existing_lines(vec![part("a0X7", "X")]));
    }

    #[test]
    fn test_validate_requires_repairability() {
        let mut session = session();
        session.enter();
        session.apply_existing_lines(vec![]);
        session.ledger_mut().add_part(part("01t1", "A"));

        let outcome = session.validate();
        assert!(!outcome.is_valid);
        assert_eq!(session.state(), DraftState::Active);
        assert!(session.is_repairability_error());

        let errors = session.ledger().store().errors().unwrap().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "repairabilityError");
        // 下書きは残る
        assert!(session.ledger().store().selected_parts().unwrap().is_some());
    }

    #[test]
    fn test_validate_success_clears_all_slots() {
        let mut session = session();
        session.enter();
        session.apply_existing_lines(vec![part("a0X7", "X"), part("a0X8", "Y")]);
        session.ledger_mut().remove_part("Y");
        session.ledger_mut().add_part(part("01t1", "A"));
        session
            .ledger_mut()
            .set_repairability(Some(Repairability::WaitingForParts));

        let outcome = session.validate();
        assert!(outcome.is_valid);
        assert_eq!(outcome.error_message, None);
        assert_eq!(session.state(), DraftState::Committed);

        let store = session.ledger().store();
        for slot in DraftSlot::ALL {
            assert!(!store.contains(slot).unwrap(), "{} が残っている", slot);
        }

        let payload = session.commit_payload();
        assert_eq!(payload.service_call.waiting_for_parts, Some(true));
        assert_eq!(payload.marked_for_delete, vec!["a0X8".to_string()]);
        assert_eq!(payload.parts.len(), 2);
    }

    #[test]
    fn test_lines_arriving_after_commit_are_discarded() {
        let mut session = session();
        assert_eq!(session.enter(), RestoreOutcome::NeedsExistingLines);
        assert!(session.validate().is_valid);
        assert!(!session.is_awaiting_existing_lines());

        assert!(!session.apply_existing_lines(vec![part("a0X7", "X")]));
        assert_eq!(session.state(), DraftState::Committed);
        assert!(session.ledger().is_empty());
        assert!(!session.ledger().store().contains(DraftSlot::SkuToId).unwrap());
    }

    #[test]
    fn test_validate_hidden_repairability_passes() {
        let mut session = session();
        session.enter();
        session.apply_existing_lines(vec![]);
        session.ledger_mut().add_part(part("01t1", "A"));
        session.ledger_mut().set_appeal_enabled("01t1", true);

        assert!(session.validate().is_valid);
    }

    #[test]
    fn test_validate_empty_ledger_passes() {
        let mut session = session();
        session.enter();
        assert!(session.validate().is_valid);
    }

    #[test]
    fn test_errors_and_repairability_consumed_once() {
        let mut session = session();
        session.enter();
        session.ledger_mut().add_part(part("01t1", "A"));
        session.validate();
        let backend = session.into_store().into_backend();

        let mut restored = session_with(backend);
        assert_eq!(restored.enter(), RestoreOutcome::Restored);
        assert_eq!(
            restored.error_fields().repairability_error.as_deref(),
            Some(REPAIRABILITY_ERROR_MESSAGE)
        );
        let store = restored.ledger().store();
        assert!(!store.contains(DraftSlot::Errors).unwrap());
        assert!(!store.contains(DraftSlot::Repairability).unwrap());
    }

    #[test]
    fn test_restore_reproduces_ledger() {
        let mut session = session();
        session.enter();
        session.apply_existing_lines(vec![part("a0X7", "X"), part("a0X8", "Y")]);
        session.ledger_mut().remove_part("X");
        session.ledger_mut().add_part(part("01t1", "A"));
        session.ledger_mut().set_quantity("A", 4);

        let selected = session.ledger().selected().to_vec();
        let sku_to_id = session.ledger().sku_to_id().clone();
        let marked = session.ledger().marked_for_delete().to_vec();

        let mut restored = session_with(session.into_store().into_backend());
        assert_eq!(restored.enter(), RestoreOutcome::Restored);
        assert_eq!(restored.ledger().selected(), selected.as_slice());
        assert_eq!(restored.ledger().sku_to_id(), &sku_to_id);
        assert_eq!(restored.ledger().marked_for_delete(), marked.as_slice());
    }

    #[test]
    fn test_corrupt_slots_fall_back() {
        let mut backend = MemoryStore::new();
        backend.set_item("selectedParts", "not json").unwrap();
        backend.set_item("skuToIdMap", "[1, 2]").unwrap();
        backend.set_item("repairabilityStatus", "\"yes\"").unwrap();
        backend.set_item("markedForDelete", r#"["a0X1"]"#).unwrap();

        let mut session = session_with(backend);
        assert_eq!(session.enter(), RestoreOutcome::NeedsExistingLines);
        assert_eq!(session.ledger().sku_to_id(), &SkuToIdMap::new());
        assert_eq!(session.ledger().repairability(), None);
        assert_eq!(session.ledger().marked_for_delete(), ["a0X1".to_string()]);

        let store = session.ledger().store();
        assert!(!store.contains(DraftSlot::SelectedParts).unwrap());
        assert!(!store.contains(DraftSlot::SkuToId).unwrap());
    }

    #[test]
    fn test_suspend_keeps_repairability() {
        let mut session = session();
        session.enter();
        session.ledger_mut().add_part(part("01t1", "A"));
        session
            .ledger_mut()
            .set_repairability(Some(Repairability::StartingRepair));
        let backend = session.into_store().into_backend();

        let mut second = session_with(backend);
        second.enter();
        assert_eq!(second.ledger().repairability(), Some(Repairability::StartingRepair));
        second.suspend();

        let mut third = session_with(second.into_store().into_backend());
        third.enter();
        assert_eq!(third.ledger().repairability(), Some(Repairability::StartingRepair));
    }

    #[test]
    fn test_spare_parts_json() {
        let mut session = session();
        session.enter();
        session.ledger_mut().add_part(part("01t1", "A"));
        let json = session.spare_parts_json().unwrap();
        assert!(json.starts_with("{\"serviceCall\":{\"id\":\"a1S1\""));
    }
}
