use crate::core::Storage;
use crate::utils::error::{MigrationError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at `base_path`. Absolute paths ignore the root.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

/// Sibling of `target` that a write goes to before it is renamed into place.
fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".partial");
    target.with_file_name(name)
}

fn storage_error(path: &Path, e: std::io::Error) -> MigrationError {
    MigrationError::Storage {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    /// Writes to a staging file next to the target, then renames it over the
    /// target. Readers never see a partially written file.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }

        let staged = staging_path(&full_path);
        tokio::fs::write(&staged, data)
            .await
            .map_err(|e| storage_error(&staged, e))?;
        if let Err(e) = tokio::fs::rename(&staged, &full_path).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(storage_error(&full_path, e));
        }
        Ok(())
    }
}
