//! Spare Parts Common Library
//!
//! CLIとWeb(WASM)で共有される部品選択の下書きエンジン:
//! カタログの並べ替え・検索、選択台帳、下書きの保存・復元、保存前の検証

pub mod constants;
pub mod types;
pub mod error;
pub mod store;
pub mod catalog;
pub mod card;
pub mod ledger;
pub mod payload;
pub mod service;
pub mod draft;

pub use types::{CatalogItem, Repairability, SelectedPart, SkuToIdMap, ValidationError};
pub use error::{Error, Result};
pub use store::{DraftSlot, DraftStore, KeyValueStore, MemoryStore};
pub use catalog::{decorate, filter_catalog, mark_added, sort_catalog, CatalogEntry};
pub use card::PartCard;
pub use ledger::SelectionLedger;
pub use payload::{CommitPayload, PartLine, ServiceCallUpdate};
pub use service::{load_catalog, PartsService};
pub use draft::{DraftSession, DraftState, ErrorFields, RestoreOutcome, ValidationOutcome};
