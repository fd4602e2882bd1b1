//! 下書き保存モジュール
//!
//! ブラウザのlocalStorageのような同期キー・バリュー媒体の上に、
//! 5つのスロットを型付きで読み書きするファサードを提供する。
//!
//! 媒体は `KeyValueStore` として注入する。テストでは `MemoryStore`、
//! CLIではファイル、ブラウザではlocalStorageを使う。

use crate::error::{Error, Result};
use crate::types::{Repairability, SelectedPart, SkuToIdMap, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// 同期キー・バリュー媒体
pub trait KeyValueStore {
    /// 未保存なら `None`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// メモリ上の媒体（テスト・一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 生の保存文字列（破損データの注入にも使う）
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 下書きのスロット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftSlot {
    SelectedParts,
    MarkedForDelete,
    Repairability,
    Errors,
    SkuToId,
}

impl DraftSlot {
    pub const ALL: [DraftSlot; 5] = [
        DraftSlot::SelectedParts,
        DraftSlot::MarkedForDelete,
        DraftSlot::Repairability,
        DraftSlot::Errors,
        DraftSlot::SkuToId,
    ];

    /// 媒体上のキー
    pub fn key(self) -> &'static str {
        match self {
            DraftSlot::SelectedParts => "selectedParts",
            DraftSlot::MarkedForDelete => "markedForDelete",
            DraftSlot::Repairability => "repairabilityStatus",
            DraftSlot::Errors => "sparePartsErrors",
            DraftSlot::SkuToId => "skuToIdMap",
        }
    }
}

impl fmt::Display for DraftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 型付き下書きストア
#[derive(Debug, Clone, Default)]
pub struct DraftStore<S> {
    backend: S,
}

impl<S: KeyValueStore> DraftStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// スロットを読む。未保存なら `None`、形が合わなければ `Error::Decode`
    pub fn get<T: DeserializeOwned>(&self, slot: DraftSlot) -> Result<Option<T>> {
        match self.backend.get_item(slot.key())? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| Error::Decode { slot, source }),
        }
    }

    /// スロットに書く。`None` は何もしない
    ///
    /// markedForDelete の空配列は削除として扱う。
    pub fn set<T: Serialize + ?Sized>(&mut self, slot: DraftSlot, value: Option<&T>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };

        let json = serde_json::to_value(value)?;
        if slot == DraftSlot::MarkedForDelete
            && json.as_array().is_some_and(|ids| ids.is_empty())
        {
            return self.clear(slot);
        }

        self.backend.set_item(slot.key(), &json.to_string())
    }

    pub fn clear(&mut self, slot: DraftSlot) -> Result<()> {
        self.backend.remove_item(slot.key())
    }

    /// 全スロットを削除（ログアウト・リセット）
    pub fn clear_all(&mut self) -> Result<()> {
        for slot in DraftSlot::ALL {
            self.clear(slot)?;
        }
        Ok(())
    }

    pub fn contains(&self, slot: DraftSlot) -> Result<bool> {
        Ok(self.backend.get_item(slot.key())?.is_some())
    }

    pub fn selected_parts(&self) -> Result<Option<Vec<SelectedPart>>> {
        self.get(DraftSlot::SelectedParts)
    }

    pub fn set_selected_parts(&mut self, parts: &[SelectedPart]) -> Result<()> {
        self.set(DraftSlot::SelectedParts, Some(parts))
    }

    pub fn marked_for_delete(&self) -> Result<Option<Vec<String>>> {
        self.get(DraftSlot::MarkedForDelete)
    }

    pub fn set_marked_for_delete(&mut self, ids: &[String]) -> Result<()> {
        self.set(DraftSlot::MarkedForDelete, Some(ids))
    }

    pub fn repairability(&self) -> Result<Option<Repairability>> {
        self.get(DraftSlot::Repairability)
    }

    pub fn set_repairability(&mut self, status: Option<Repairability>) -> Result<()> {
        self.set(DraftSlot::Repairability, status.as_ref())
    }

    pub fn errors(&self) -> Result<Option<Vec<ValidationError>>> {
        self.get(DraftSlot::Errors)
    }

    pub fn set_errors(&mut self, errors: &[ValidationError]) -> Result<()> {
        self.set(DraftSlot::Errors, Some(errors))
    }

    pub fn sku_to_id(&self) -> Result<Option<SkuToIdMap>> {
        self.get(DraftSlot::SkuToId)
    }

    pub fn set_sku_to_id(&mut self, map: &SkuToIdMap) -> Result<()> {
        self.set(DraftSlot::SkuToId, Some(map))
    }
}
