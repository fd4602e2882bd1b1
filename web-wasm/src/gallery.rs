//! 部品ギャラリー（ブラウザ向け公開面）
//!
//! ホストページはこのオブジェクトを作り、`connect()` で下書きを復元し、
//! 操作のたびに `parts()` / `selectedParts()` を読み直して描画する。

use crate::api::host::HostService;
use crate::local_store::LocalStore;
use js_sys::{Function, Promise};
use serde::Serialize;
use spare_parts_common::{
    filter_catalog, load_catalog, mark_added, CatalogEntry, DraftSession, DraftStore, PartCard,
    PartsService, Repairability, RestoreOutcome,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

struct GalleryState {
    asset_id: String,
    session: DraftSession<LocalStore>,
    catalog: Vec<CatalogEntry>,
    search: String,
    connected: bool,
}

impl GalleryState {
    /// 選択済みの部品をカタログ側で無効表示にする
    fn refresh_added(&mut self) {
        let ledger = self.session.ledger();
        mark_added(&mut self.catalog, |name| ledger.contains(name));
    }
}

#[wasm_bindgen]
pub struct SparePartsGallery {
    state: Rc<RefCell<GalleryState>>,
    service: Rc<HostService>,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
impl SparePartsGallery {
    #[wasm_bindgen(constructor)]
    pub fn new(
        asset_id: String,
        service_call_id: String,
        fetch_catalog: Function,
        fetch_existing_selection: Function,
    ) -> Result<SparePartsGallery, JsValue> {
        let store = LocalStore::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let session = DraftSession::new(service_call_id, DraftStore::new(store));
        Ok(Self {
            state: Rc::new(RefCell::new(GalleryState {
                asset_id,
                session,
                catalog: Vec::new(),
                search: String::new(),
                connected: false,
            })),
            service: Rc::new(HostService::new(fetch_catalog, fetch_existing_selection)),
        })
    }

    /// 下書きを復元する。下書きが無ければ保存済み明細を取得する
    ///
    /// 取得が終わる前に `disconnect()` されたら結果は捨てる。
    pub fn connect(&self) -> Promise {
        let outcome = {
            let mut state = self.state.borrow_mut();
            state.connected = true;
            let outcome = state.session.enter();
            state.refresh_added();
            outcome
        };

        let weak: Weak<RefCell<GalleryState>> = Rc::downgrade(&self.state);
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            if outcome == RestoreOutcome::Restored {
                return Ok(JsValue::TRUE);
            }

            let service_call_id = match weak.upgrade() {
                Some(state) => state.borrow().session.service_call_id().to_string(),
                None => return Ok(JsValue::FALSE),
            };
            let result = service.fetch_existing_selection(&service_call_id).await;

            let Some(state) = weak.upgrade() else {
                return Ok(JsValue::FALSE);
            };
            let mut state = state.borrow_mut();
            if !state.connected {
                return Ok(JsValue::FALSE);
            }
            let applied = match result {
                Ok(lines) => state.session.apply_existing_lines(lines),
                Err(e) => {
                    gloo::console::error!(format!("保存済み明細の取得に失敗: {}", e));
                    state.session.existing_lines_failed(&e);
                    false
                }
            };
            state.refresh_added();
            Ok(JsValue::from_bool(applied))
        })
    }

    /// カタログを取得する。失敗時は空のカタログになる
    #[wasm_bindgen(js_name = loadCatalog)]
    pub fn load_catalog(&self) -> Promise {
        let weak = Rc::downgrade(&self.state);
        let service = Rc::clone(&self.service);
        let asset_id = self.state.borrow().asset_id.clone();
        future_to_promise(async move {
            let entries = load_catalog(service.as_ref(), &asset_id).await;
            let Some(state) = weak.upgrade() else {
                return Ok(JsValue::UNDEFINED);
            };
            let mut state = state.borrow_mut();
            let count = entries.len();
            state.catalog = entries;
            state.refresh_added();
            Ok(JsValue::from_f64(count as f64))
        })
    }

    #[wasm_bindgen(js_name = setSearch)]
    pub fn set_search(&self, query: String) {
        self.state.borrow_mut().search = query;
    }

    /// 検索で絞り込んだカタログ
    pub fn parts(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        let filtered = filter_catalog(&state.catalog, &state.search);
        to_js(&filtered)
    }

    #[wasm_bindgen(js_name = selectedParts)]
    pub fn selected_parts(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        to_js(state.session.ledger().selected())
    }

    /// カードから部品を追加する。カタログに無い・追加済みなら false
    #[wasm_bindgen(js_name = addCatalogPart)]
    pub fn add_catalog_part(
        &self,
        name: String,
        quantity: i32,
        old_serial_number: Option<String>,
        new_serial_number: Option<String>,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(entry) = state.catalog.iter().find(|e| e.item.name == name) else {
            gloo::console::warn!(format!("カタログに無い部品: {}", name));
            return false;
        };

        let mut card = PartCard::new(entry.item.clone());
        card.set_quantity(i64::from(quantity));
        if let Some(value) = old_serial_number {
            card.set_old_serial_number(value);
        }
        if let Some(value) = new_serial_number {
            card.set_new_serial_number(value);
        }

        let added = state.session.ledger_mut().add_part(card.submit());
        state.refresh_added();
        added
    }

    #[wasm_bindgen(js_name = removePart)]
    pub fn remove_part(&self, name: String) -> bool {
        let mut state = self.state.borrow_mut();
        let removed = state.session.ledger_mut().remove_part(&name).is_some();
        state.refresh_added();
        removed
    }

    /// 数量を変更し、丸めた後の値を返す
    #[wasm_bindgen(js_name = setQuantity)]
    pub fn set_quantity(&self, name: String, value: i32) -> Option<u32> {
        self.state
            .borrow_mut()
            .session
            .ledger_mut()
            .set_quantity(&name, i64::from(value))
    }

    #[wasm_bindgen(js_name = setAppealEnabled)]
    pub fn set_appeal_enabled(&self, row_id: String, enabled: bool) {
        self.state
            .borrow_mut()
            .session
            .ledger_mut()
            .set_appeal_enabled(&row_id, enabled);
    }

    #[wasm_bindgen(js_name = setAppealReason)]
    pub fn set_appeal_reason(&self, row_id: String, reason: String) -> bool {
        self.state
            .borrow_mut()
            .session
            .ledger_mut()
            .set_appeal_reason(&row_id, &reason)
    }

    /// true = 部品待ち, false = 修理開始, undefined = 未選択
    #[wasm_bindgen(js_name = setRepairability)]
    pub fn set_repairability(&self, waiting_for_parts: Option<bool>) {
        self.state
            .borrow_mut()
            .session
            .ledger_mut()
            .set_repairability(waiting_for_parts.map(Repairability::from));
    }

    #[wasm_bindgen(js_name = isRepairabilityVisible)]
    pub fn is_repairability_visible(&self) -> bool {
        self.state
            .borrow()
            .session
            .ledger()
            .is_repairability_visible()
    }

    pub fn repairability(&self) -> Option<bool> {
        self.state
            .borrow()
            .session
            .ledger()
            .repairability()
            .map(bool::from)
    }

    #[wasm_bindgen(js_name = repairabilityError)]
    pub fn repairability_error(&self) -> bool {
        self.state.borrow().session.is_repairability_error()
    }

    /// 保存前の検証。`{ isValid, errorMessage? }` を返す
    pub fn validate(&self) -> Result<JsValue, JsValue> {
        let outcome = self.state.borrow_mut().session.validate();
        to_js(&outcome)
    }

    #[wasm_bindgen(getter, js_name = sparePartsJson)]
    pub fn spare_parts_json(&self) -> Result<String, JsValue> {
        self.state
            .borrow()
            .session
            .spare_parts_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// 画面を離れる。以降に届いた取得結果は捨てる
    pub fn disconnect(&self) {
        let mut state = self.state.borrow_mut();
        state.connected = false;
        state.session.suspend();
    }
}
