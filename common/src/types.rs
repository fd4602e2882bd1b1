//! 部品選択の型定義
//!
//! - CatalogItem: 外部から取得したカタログ部品（不変）
//! - SelectedPart: バスケットの1行（数量・シリアル・保証/アピール情報）
//! - Repairability: 部品待ち/修理開始の選択
//! - ValidationError: 画面遷移をまたいで保持する検証エラー

use crate::constants::MIN_QUANTITY;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// 部品名（SKU）→ 保存済みレコードID
pub type SkuToIdMap = BTreeMap<String, String>;

fn default_max_qty() -> u32 {
    MIN_QUANTITY
}

fn default_quantity() -> u32 {
    MIN_QUANTITY
}

/// null は既定値として読む
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// カタログ部品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,

    /// シリアル番号名（SKU、一意）
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// 画像URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    /// カテゴリ（自由入力、未設定あり）
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default = "default_max_qty")]
    pub max_qty: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_out_of_warranty: bool,
}

impl CatalogItem {
    /// 注文可能な最大数量（0は1として扱う）
    pub fn max_quantity(&self) -> u32 {
        self.max_qty.max(MIN_QUANTITY)
    }
}

/// バスケットの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPart {
    /// 行ID（新規行はカタログID、取得済み行は保存済み明細ID）
    pub id: String,

    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// 数量の上限（取得済み明細では不明なことがある）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<u32>,

    #[serde(default)]
    pub old_serial_number: Option<String>,

    #[serde(default)]
    pub new_serial_number: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_out_of_warranty: bool,

    #[serde(default)]
    pub appeal_reason: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_appeal_invalid: bool,
}

impl SelectedPart {
    /// カタログ部品から行を作る
    pub fn from_catalog(item: &CatalogItem, quantity: u32) -> Self {
        let mut part = Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            quantity,
            max_qty: Some(item.max_quantity()),
            old_serial_number: None,
            new_serial_number: None,
            is_out_of_warranty: item.is_out_of_warranty,
            appeal_reason: None,
            is_appeal_invalid: false,
        };
        part.quantity = part.clamp_quantity(i64::from(quantity));
        part
    }

    /// 数量を [1, maxQty] に丸める。上限不明なら下限のみ
    pub fn clamp_quantity(&self, value: i64) -> u32 {
        let max = i64::from(self.max_qty.unwrap_or(u32::MAX).max(MIN_QUANTITY));
        value.clamp(i64::from(MIN_QUANTITY), max) as u32
    }
}

/// 修理可否
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Repairability {
    /// 部品到着待ち
    WaitingForParts,
    /// すぐに修理開始
    StartingRepair,
}

impl Repairability {
    pub fn is_waiting_for_parts(self) -> bool {
        matches!(self, Repairability::WaitingForParts)
    }
}

impl From<bool> for Repairability {
    fn from(waiting: bool) -> Self {
        if waiting {
            Repairability::WaitingForParts
        } else {
            Repairability::StartingRepair
        }
    }
}

impl From<Repairability> for bool {
    fn from(status: Repairability) -> Self {
        status.is_waiting_for_parts()
    }
}

/// 検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// エラー表示先のフィールド名
    #[serde(alias = "name")]
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
