use crate::error::{DraftCliError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_ORIGIN: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 保存の単位（ブラウザのオリジンに相当）
    pub origin: String,
    /// 下書きファイルの保存先（未設定ならデータディレクトリ）
    pub store_dir: Option<PathBuf>,
    /// カタログ・明細フィクスチャのディレクトリ
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.into(),
            store_dir: None,
            data_dir: PathBuf::from("fixtures"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DraftCliError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("parts-draft").join("config.json"))
    }

    /// 下書きファイルのディレクトリ
    pub fn resolved_store_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.store_dir {
            return Ok(dir.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| DraftCliError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("parts-draft"))
    }

    /// オリジン名を検証して設定
    pub fn set_origin(&mut self, origin: String) -> Result<()> {
        if !is_safe_name(&origin) {
            return Err(DraftCliError::Config(format!(
                "オリジン名に使えない文字があります: {}",
                origin
            )));
        }
        self.origin = origin;
        Ok(())
    }
}

/// ファイル名に使える名前か（英数字と `-` `_` `.`、先頭は `.` 以外）
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
