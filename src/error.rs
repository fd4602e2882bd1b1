use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftCliError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("部品がカタログにありません: {0}")]
    PartNotFound(String),

    #[error("部品が選択されていません: {0}")]
    NotSelected(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] spare_parts_common::Error),
}

pub type Result<T> = std::result::Result<T, DraftCliError>;
