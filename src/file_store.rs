//! ファイル保存の下書き媒体
//!
//! オリジンごとに1つのJSONファイルを持ち、書き込みのたびに保存する。
//! 破損・バージョン違いのファイルは空として扱う。

use crate::error::Result;
use serde::{Deserialize, Serialize};
use spare_parts_common::KeyValueStore;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 保存ファイルの構造
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// キー → JSON文字列
    entries: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    const CURRENT_VERSION: u32 = 1;

    /// 保存ファイルのパス
    pub fn store_path(dir: &Path, origin: &str) -> PathBuf {
        dir.join(format!("{}.json", origin))
    }

    /// 保存ファイルを開く（無ければ空）
    pub fn open(dir: &Path, origin: &str) -> Result<Self> {
        let path = Self::store_path(dir, origin);
        let entries = if path.exists() {
            Self::read_entries(&path)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
        let reader = BufReader::new(File::open(path)?);
        match serde_json::from_reader::<_, StoreFile>(reader) {
            Ok(file) if file.version == Self::CURRENT_VERSION => Ok(file.entries),
            Ok(file) => {
                warn!(path = %path.display(), version = file.version, "store version mismatch, starting empty");
                Ok(BTreeMap::new())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable store file, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 同じディレクトリの一時ファイルに書いてから置き換える
    fn flush(&self) -> spare_parts_common::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let file = StoreFile {
            version: Self::CURRENT_VERSION,
            entries: self.entries.clone(),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &file)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> spare_parts_common::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> spare_parts_common::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> spare_parts_common::Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
