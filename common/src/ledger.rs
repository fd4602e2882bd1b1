//! 選択台帳モジュール
//!
//! バスケットの行・保存済みSKU→IDマップ・削除予定IDを保持し、
//! 追加/削除のたびに下書きストアへ反映する。

use crate::error::Result;
use crate::store::{DraftSlot, DraftStore, KeyValueStore};
use crate::types::{Repairability, SelectedPart, SkuToIdMap};
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub struct SelectionLedger<S> {
    store: DraftStore<S>,
    selected: Vec<SelectedPart>,
    sku_to_id: SkuToIdMap,
    marked_for_delete: Vec<String>,
    /// アピール入力を有効にした行ID（保存しない）
    enabled_appeal_rows: BTreeSet<String>,
    repairability: Option<Repairability>,
}

impl<S: KeyValueStore> SelectionLedger<S> {
    pub fn new(store: DraftStore<S>) -> Self {
        Self {
            store,
            selected: Vec::new(),
            sku_to_id: SkuToIdMap::new(),
            marked_for_delete: Vec::new(),
            enabled_appeal_rows: BTreeSet::new(),
            repairability: None,
        }
    }

    pub fn selected(&self) -> &[SelectedPart] {
        &self.selected
    }

    pub fn sku_to_id(&self) -> &SkuToIdMap {
        &self.sku_to_id
    }

    pub fn marked_for_delete(&self) -> &[String] {
        &self.marked_for_delete
    }

    pub fn repairability(&self) -> Option<Repairability> {
        self.repairability
    }

    pub fn enabled_appeal_rows(&self) -> &BTreeSet<String> {
        &self.enabled_appeal_rows
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn store(&self) -> &DraftStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DraftStore<S> {
        &mut self.store
    }

    pub fn into_store(self) -> DraftStore<S> {
        self.store
    }

    /// 追加済みか（カタログの追加ボタン無効化にも使う）
    pub fn contains(&self, name: &str) -> bool {
        self.selected.iter().any(|part| part.name == name)
    }

    /// 保存済みレコードID
    pub fn resolve_id(&self, name: &str) -> Option<&str> {
        self.sku_to_id.get(name).map(String::as_str)
    }

    /// 修理可否の選択欄を表示するか
    ///
    /// 行があり、かつアピール入力を有効にした行がないときだけ表示する。
    pub fn is_repairability_visible(&self) -> bool {
        !self.selected.is_empty()
            && !self
                .selected
                .iter()
                .any(|part| self.enabled_appeal_rows.contains(&part.id))
    }

    /// 部品を追加。同名の行があれば何もしない
    pub fn add_part(&mut self, part: SelectedPart) -> bool {
        if self.contains(&part.name) {
            debug!(name = %part.name, "part already selected");
            return false;
        }

        // 削除予定の保存済み行を再追加したら削除を取り消す
        if let Some(id) = self.sku_to_id.get(&part.name).cloned() {
            self.marked_for_delete.retain(|marked| *marked != id);
            self.persist_marked_for_delete();
        }

        self.selected.push(part);
        self.persist_selected();
        true
    }

    /// 部品を削除。保存済みの行なら削除予定に入れる
    pub fn remove_part(&mut self, name: &str) -> Option<SelectedPart> {
        let index = self.selected.iter().position(|part| part.name == name)?;

        if let Some(id) = self.sku_to_id.get(name).cloned() {
            if !self.marked_for_delete.contains(&id) {
                self.marked_for_delete.push(id);
            }
            self.persist_marked_for_delete();
        }

        let removed = self.selected.remove(index);
        self.enabled_appeal_rows.remove(&removed.id);
        self.persist_selected();

        if self.selected.is_empty() || self.is_repairability_visible() {
            self.reset_repairability();
        }

        Some(removed)
    }

    /// 数量を変更（[1, maxQty] に丸める）
    pub fn set_quantity(&mut self, name: &str, value: i64) -> Option<u32> {
        let part = self.selected.iter_mut().find(|part| part.name == name)?;
        part.quantity = part.clamp_quantity(value);
        let quantity = part.quantity;
        self.persist_selected();
        Some(quantity)
    }

    pub fn set_appeal_enabled(&mut self, row_id: &str, enabled: bool) {
        if enabled {
            self.enabled_appeal_rows.insert(row_id.to_string());
        } else {
            self.enabled_appeal_rows.remove(row_id);
        }
    }

    /// アピール理由を設定。行IDと理由の両方が空でないときだけ反映
    pub fn set_appeal_reason(&mut self, row_id: &str, reason: &str) -> bool {
        if row_id.is_empty() || reason.is_empty() {
            return false;
        }

        let Some(part) = self.selected.iter_mut().find(|part| part.id == row_id) else {
            return false;
        };
        part.appeal_reason = Some(reason.to_string());
        part.is_appeal_invalid = false;
        self.persist_selected();
        true
    }

    /// 修理可否を設定。表示中なら保存、非表示ならスロットを消す
    pub fn set_repairability(&mut self, status: Option<Repairability>) {
        self.repairability = status;

        let result = match status {
            Some(_) if self.is_repairability_visible() => self.store.set_repairability(status),
            _ => self.store.clear(DraftSlot::Repairability),
        };
        log_write(DraftSlot::Repairability, result);
    }

    fn reset_repairability(&mut self) {
        self.repairability = None;
        let result = self.store.clear(DraftSlot::Repairability);
        log_write(DraftSlot::Repairability, result);
    }

    /// 保存済み明細で台帳を初期化し、SKU→IDマップを保存
    pub(crate) fn seed_saved_lines(&mut self, lines: Vec<SelectedPart>) {
        if lines.is_empty() {
            return;
        }

        for line in &lines {
            self.sku_to_id.insert(line.name.clone(), line.id.clone());
        }
        self.selected = lines;

        let result = self.store.set_sku_to_id(&self.sku_to_id);
        log_write(DraftSlot::SkuToId, result);
    }

    pub(crate) fn restore_selected(&mut self, parts: Vec<SelectedPart>) {
        self.selected = parts;
    }

    pub(crate) fn restore_marked_for_delete(&mut self, ids: Vec<String>) {
        self.marked_for_delete = ids;
    }

    pub(crate) fn restore_sku_to_id(&mut self, map: SkuToIdMap) {
        self.sku_to_id = map;
    }

    pub(crate) fn restore_repairability(&mut self, status: Repairability) {
        self.repairability = Some(status);
    }

    fn persist_selected(&mut self) {
        let result = self.store.set_selected_parts(&self.selected);
        log_write(DraftSlot::SelectedParts, result);
    }

    fn persist_marked_for_delete(&mut self) {
        let result = self.store.set_marked_for_delete(&self.marked_for_delete);
        log_write(DraftSlot::MarkedForDelete, result);
    }
}

/// 書き込み失敗はログのみ（メモリ上の状態を正とする）
pub(crate) fn log_write(slot: DraftSlot, result: Result<()>) {
    if let Err(e) = result {
        warn!(%slot, error = %e, "failed to persist draft slot");
    }
}
