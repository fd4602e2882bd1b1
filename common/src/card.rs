//! 部品カード（追加フォーム）
//!
//! 数量ステッパーとシリアル番号入力を持ち、送信でバスケット行を作る。

use crate::constants::{MIN_QUANTITY, QUANTITY_STEP};
use crate::types::{CatalogItem, SelectedPart};

#[derive(Debug, Clone)]
pub struct PartCard {
    item: CatalogItem,
    quantity: u32,
    old_serial_number: Option<String>,
    new_serial_number: Option<String>,
}

impl PartCard {
    pub fn new(item: CatalogItem) -> Self {
        Self {
            item,
            quantity: MIN_QUANTITY,
            old_serial_number: None,
            new_serial_number: None,
        }
    }

    pub fn item(&self) -> &CatalogItem {
        &self.item
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 入力値を [1, maxQty] に丸めて設定
    pub fn set_quantity(&mut self, value: i64) -> u32 {
        let max = i64::from(self.item.max_quantity());
        self.quantity = value.clamp(i64::from(MIN_QUANTITY), max) as u32;
        self.quantity
    }

    pub fn decrement_disabled(&self) -> bool {
        self.quantity <= MIN_QUANTITY
    }

    pub fn increment_disabled(&self) -> bool {
        self.quantity >= self.item.max_quantity()
    }

    pub fn decrement(&mut self) -> u32 {
        if !self.decrement_disabled() {
            self.quantity -= QUANTITY_STEP;
        }
        self.quantity
    }

    pub fn increment(&mut self) -> u32 {
        if !self.increment_disabled() {
            self.quantity += QUANTITY_STEP;
        }
        self.quantity
    }

    pub fn set_old_serial_number(&mut self, value: impl Into<String>) {
        self.old_serial_number = non_empty(value.into());
    }

    pub fn set_new_serial_number(&mut self, value: impl Into<String>) {
        self.new_serial_number = non_empty(value.into());
    }

    /// バスケットに追加する行を作る
    pub fn submit(&self) -> SelectedPart {
        let mut part = SelectedPart::from_catalog(&self.item, self.quantity);
        part.old_serial_number = self.old_serial_number.clone();
        part.new_serial_number = self.new_serial_number.clone();
        part
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
