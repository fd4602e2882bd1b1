//! 保存用ペイロード
//!
//! 外部の保存処理へ渡すJSON。行ごとに保存済みID（新規は null）を解決し、
//! 削除予定IDをそのまま添える。

use crate::constants::warranty_label;
use crate::store::KeyValueStore;
use crate::ledger::SelectionLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    pub service_call: ServiceCallUpdate,
    pub parts: Vec<PartLine>,
    pub marked_for_delete: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCallUpdate {
    pub id: String,
    /// 修理可否欄が表示されていたときだけ値を持つ
    pub waiting_for_parts: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartLine {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub old_serial_number: Option<String>,
    pub new_serial_number: Option<String>,
    pub quantity: u32,
    pub warranty: String,
    pub is_out_of_warranty: bool,
    pub appeal: bool,
    pub appeal_reason: Option<String>,
}

impl CommitPayload {
    pub fn from_ledger<S: KeyValueStore>(service_call_id: &str, ledger: &SelectionLedger<S>) -> Self {
        let waiting_for_parts = if ledger.is_repairability_visible() {
            ledger.repairability().map(bool::from)
        } else {
            None
        };

        let parts = ledger
            .selected()
            .iter()
            .map(|part| PartLine {
                id: ledger.resolve_id(&part.name).map(str::to_string),
                name: part.name.clone(),
                description: part.description.clone(),
                old_serial_number: part.old_serial_number.clone(),
                new_serial_number: part.new_serial_number.clone(),
                quantity: part.quantity,
                warranty: warranty_label(part.is_out_of_warranty).to_string(),
                is_out_of_warranty: part.is_out_of_warranty,
                appeal: part.is_out_of_warranty,
                appeal_reason: part.appeal_reason.clone().filter(|r| !r.is_empty()),
            })
            .collect();

        Self {
            service_call: ServiceCallUpdate {
                id: service_call_id.to_string(),
                waiting_for_parts,
            },
            parts,
            marked_for_delete: ledger.marked_for_delete().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DraftStore, MemoryStore};
    use crate::types::{Repairability, SelectedPart};

    fn part(id: &str, name: &str, out_of_warranty: bool) -> SelectedPart {
        SelectedPart {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{} desc", name),
            quantity: 2,
            max_qty: None,
            old_serial_number: Some("OLD".to_string()),
            new_serial_number: None,
            is_out_of_warranty: out_of_warranty,
            appeal_reason: None,
            is_appeal_invalid: false,
        }
    }

    #[test]
    fn test_payload_resolves_saved_ids() {
        let mut ledger = SelectionLedger::new(DraftStore::new(MemoryStore::new()));
        ledger.seed_saved_lines(vec![part("a0X1", "S", false), part("a0X2", "T", false)]);
        ledger.remove_part("T");
        ledger.add_part(part("01t9", "N", true));
        ledger.set_repairability(Some(Repairability::WaitingForParts));

        let payload = CommitPayload::from_ledger("a1S1", &ledger);
        assert_eq!(payload.service_call.id, "a1S1");
        assert_eq!(payload.service_call.waiting_for_parts, Some(true));
        assert_eq!(payload.parts[0].id.as_deref(), Some("a0X1"));
        assert_eq!(payload.parts[1].id, None);
        assert_eq!(payload.parts[1].warranty, "Out of Warranty");
        assert!(payload.parts[1].appeal);
        assert_eq!(payload.marked_for_delete, vec!["a0X2".to_string()]);
    }

    #[test]
    fn test_hidden_repairability_is_null() {
        let mut ledger = SelectionLedger::new(DraftStore::new(MemoryStore::new()));
        ledger.add_part(part("01t9", "N", true));
        ledger.set_repairability(Some(Repairability::StartingRepair));
        ledger.set_appeal_enabled("01t9", true);

        let payload = CommitPayload::from_ledger("a1S1", &ledger);
        assert_eq!(payload.service_call.waiting_for_parts, None);
    }

    #[test]
    fn test_payload_json_shape() {
        let mut ledger = SelectionLedger::new(DraftStore::new(MemoryStore::new()));
        ledger.add_part(part("01t9", "N", false));

        let json = serde_json::to_value(CommitPayload::from_ledger("a1S1", &ledger)).unwrap();
        assert_eq!(json["serviceCall"]["waitingForParts"], serde_json::Value::Null);
        assert_eq!(json["parts"][0]["id"], serde_json::Value::Null);
        assert_eq!(json["parts"][0]["warranty"], "In Warranty");
        assert_eq!(json["parts"][0]["oldSerialNumber"], "OLD");
        assert_eq!(json["parts"][0]["appealReason"], serde_json::Value::Null);
        assert_eq!(json["markedForDelete"], serde_json::json!([]));
    }
}
