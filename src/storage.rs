use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the destination directory is obtained: either the user grants one
/// through the folder picker, or downloads go to a fixed app directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageStrategy {
    /// Ask the user to pick (and thereby grant) a directory. Cancelling
    /// the dialog is a silent no-op, not an error.
    #[default]
    ScopedDirectoryPermission,
    /// A well-known per-user application directory, no prompt.
    FixedAppDirectory,
}

impl StorageStrategy {
    /// Resolve the destination directory, or `None` when the user
    /// declined to grant one.
    pub async fn resolve_destination(self) -> Option<PathBuf> {
        match self {
            StorageStrategy::ScopedDirectoryPermission => rfd::AsyncFileDialog::new()
                .set_title("Choose download folder")
                .pick_folder()
                .await
                .map(|handle| handle.path().to_path_buf()),
            StorageStrategy::FixedAppDirectory => Some(fixed_app_directory()),
        }
    }
}

/// Download directory under the per-user data dir, `ViBE/` as a last
/// resort when the platform reports no home.
pub fn fixed_app_directory() -> PathBuf {
    match directories::ProjectDirs::from("app", "vibe", "downloader") {
        Some(dirs) => dirs.data_dir().join("downloads"),
        None => PathBuf::from("ViBE"),
    }
}
