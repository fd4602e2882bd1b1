//! フィクスチャによる外部連携
//!
//! - `<data_dir>/catalog/<assetId>.json`: カタログ部品の配列
//! - `<data_dir>/service-calls/<serviceCallId>.json`: 保存済み明細の配列
//!
//! 明細ファイルが無いサービスコールは明細0件として扱う。

use crate::config::is_safe_name;
use serde::de::DeserializeOwned;
use spare_parts_common::{CatalogItem, Error, PartsService, Result, SelectedPart};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FixtureService {
    data_dir: PathBuf,
}

impl FixtureService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn catalog_path(&self, asset_id: &str) -> Result<PathBuf> {
        Ok(self
            .data_dir
            .join("catalog")
            .join(format!("{}.json", checked_id(asset_id)?)))
    }

    pub fn lines_path(&self, service_call_id: &str) -> Result<PathBuf> {
        Ok(self
            .data_dir
            .join("service-calls")
            .join(format!("{}.json", checked_id(service_call_id)?)))
    }
}

/// IDはそのままファイル名になるので、パスを含むものは拒否する
fn checked_id(id: &str) -> Result<&str> {
    if is_safe_name(id) {
        Ok(id)
    } else {
        Err(Error::Remote(format!("IDに使えない文字があります: {}", id)))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Remote(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content).map_err(|e| Error::Remote(format!("{}: {}", path.display(), e)))
}

impl PartsService for FixtureService {
    async fn fetch_catalog(&self, asset_id: &str) -> Result<Vec<CatalogItem>> {
        read_json(&self.catalog_path(asset_id)?).await
    }

    async fn fetch_existing_selection(&self, service_call_id: &str) -> Result<Vec<SelectedPart>> {
        let path = self.lines_path(service_call_id)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        read_json(&path).await
    }
}
