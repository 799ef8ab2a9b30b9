use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::get_timestamp;

/// Album every download is filed under.
pub const APP_ALBUM: &str = "ViBE";

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryEntry {
    pub title: String,
    pub path: PathBuf,
    pub added_at: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct LibraryIndex {
    albums: BTreeMap<String, Vec<LibraryEntry>>,
}

/// JSON-backed media index, one file in the app data directory. Stands in
/// for the platform media library: finished downloads are filed under an
/// album, created on first use.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    index_path: PathBuf,
}

impl MediaLibrary {
    pub fn new(index_path: PathBuf) -> Self {
        Self { index_path }
    }

    /// Index file next to the fixed download directory.
    pub fn default_location() -> Self {
        let path = match directories::ProjectDirs::from("app", "vibe", "downloader") {
            Some(dirs) => dirs.data_dir().join("library.json"),
            None => PathBuf::from("ViBE").join("library.json"),
        };
        Self::new(path)
    }

    /// File a downloaded asset under `album`, creating the album (and the
    /// index file itself) if absent.
    pub fn register(&self, album: &str, title: &str, file: &Path) -> Result<(), LibraryError> {
        let mut index = self.load()?;
        index
            .albums
            .entry(album.to_string())
            .or_default()
            .push(LibraryEntry {
                title: title.to_string(),
                path: file.to_path_buf(),
                added_at: get_timestamp(),
            });
        self.store(&index)
    }

    fn load(&self) -> Result<LibraryIndex, LibraryError> {
        match std::fs::read_to_string(&self.index_path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LibraryIndex::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, index: &LibraryIndex) -> Result<(), LibraryError> {
        if let Some(parent) = self.index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(index)?;
        std::fs::write(&self.index_path, contents)?;
        Ok(())
    }
}
