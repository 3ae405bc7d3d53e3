//! On-disk storage for uploaded record files

use std::path::{Path, PathBuf};

use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("stored file name is not a plain file name: {0}")]
    InvalidName(String),
    #[error("uploaded file missing on server")]
    Missing,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn safe_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.is_empty() {
        "upload".to_string()
    } else {
        safe
    }
}

/// Directory of uploaded files, named `<unix-millis>_<safe-name>`
#[derive(Debug, Clone)]
pub struct Uploads {
    root: PathBuf,
}

impl Uploads {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the bytes and return the stored file name
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let stored = format!("{}_{}", millis, safe_file_name(original_name));

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&stored), bytes).await?;
        tracing::debug!(stored = %stored, size = bytes.len(), "stored upload");
        Ok(stored)
    }

    pub async fn read(&self, stored_name: &str) -> Result<Vec<u8>, UploadError> {
        let path = self.path_of(stored_name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(UploadError::Missing),
            Err(e) => Err(e.into()),
        }
    }

    fn path_of(&self, stored_name: &str) -> Result<PathBuf, UploadError> {
        // Stored names come from the database, but never leave the directory
        if matches!(stored_name, "" | "." | "..") || safe_file_name(stored_name) != stored_name {
            return Err(UploadError::InvalidName(stored_name.to_string()));
        }
        Ok(self.root.join(stored_name))
    }
}
