//! エラー型定義

use crate::store::DraftSlot;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 保存済みの値が期待する形に復元できない（破損・改ざん）
    #[error("Decode error ({slot}): {source}")]
    Decode {
        slot: DraftSlot,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Remote error: {0}")]
    Remote(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_decode_names_slot() {
        let json_error = serde_json::from_str::<Vec<String>>("{}").unwrap_err();
        let error = Error::Decode {
            slot: DraftSlot::MarkedForDelete,
            source: json_error,
        };
        let display = format!("{}", error);
        assert!(display.starts_with("Decode error (markedForDelete)"));
    }

    #[test]
    fn test_error_display_remote() {
        let error = Error::Remote("サービスコール明細の取得に失敗".to_string());
        assert_eq!(
            format!("{}", error),
            "Remote error: サービスコール明細の取得に失敗"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Storage("quota".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Storage"));
        assert!(debug.contains("quota"));
    }
}
