//! localStorage による下書き媒体
//!
//! オリジン単位・同期・期限なし。容量超過などの失敗は `Error::Storage` で返す。

use spare_parts_common::{Error, KeyValueStore, Result};
use wasm_bindgen::JsValue;

pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| Error::Storage("window が取得できません".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| Error::Storage("localStorage が使えません".to_string()))?;
        Ok(Self { storage })
    }
}

fn storage_error(value: JsValue) -> Error {
    Error::Storage(format!("{:?}", value))
}

impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}
