//! 外部連携（カタログ取得・保存済み明細取得）
//!
//! 通信方式は実装側に任せる。失敗はログに残して空の結果に落とす。

use crate::catalog::{decorate, sort_catalog, CatalogEntry};
use crate::error::Result;
use crate::types::{CatalogItem, SelectedPart};
use tracing::{debug, error};

#[allow(async_fn_in_trait)]
pub trait PartsService {
    /// 機器に対応するカタログ部品
    async fn fetch_catalog(&self, asset_id: &str) -> Result<Vec<CatalogItem>>;

    /// サービスコールに保存済みの明細（`id` は保存済みレコードID）
    async fn fetch_existing_selection(&self, service_call_id: &str) -> Result<Vec<SelectedPart>>;
}

/// カタログを取得して表示順に並べ、装飾する
pub async fn load_catalog<P: PartsService>(service: &P, asset_id: &str) -> Vec<CatalogEntry> {
    match service.fetch_catalog(asset_id).await {
        Ok(items) => {
            debug!(asset_id, count = items.len(), "catalog loaded");
            decorate(sort_catalog(items))
        }
        Err(e) => {
            error!(asset_id, error = %e, "failed to load catalog");
            Vec::new()
        }
    }
}
