//! ホストページが渡すコールバックによる外部連携
//!
//! コールバックは引数1つ（機器ID / サービスコールID）を受け取り、
//! 配列またはその配列を返す Promise を返す。

use js_sys::{Function, Promise};
use serde::de::DeserializeOwned;
use spare_parts_common::{CatalogItem, Error, PartsService, Result, SelectedPart};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

pub struct HostService {
    fetch_catalog: Function,
    fetch_existing_selection: Function,
}

impl HostService {
    pub fn new(fetch_catalog: Function, fetch_existing_selection: Function) -> Self {
        Self {
            fetch_catalog,
            fetch_existing_selection,
        }
    }
}

fn remote_error(value: JsValue) -> Error {
    Error::Remote(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

async fn call_host<T: DeserializeOwned>(callback: &Function, arg: &str) -> Result<T> {
    let returned = callback
        .call1(&JsValue::NULL, &JsValue::from_str(arg))
        .map_err(remote_error)?;
    let resolved = JsFuture::from(Promise::resolve(&returned))
        .await
        .map_err(remote_error)?;
    serde_wasm_bindgen::from_value(resolved).map_err(|e| Error::Remote(e.to_string()))
}

impl PartsService for HostService {
    async fn fetch_catalog(&self, asset_id: &str) -> Result<Vec<CatalogItem>> {
        call_host(&self.fetch_catalog, asset_id).await
    }

    async fn fetch_existing_selection(&self, service_call_id: &str) -> Result<Vec<SelectedPart>> {
        call_host(&self.fetch_existing_selection, service_call_id).await
    }
}
