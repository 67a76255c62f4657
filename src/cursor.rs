//! File-backed sync watermark.
//!
//! The file holds a single decimal unix timestamp `c`: every payment created
//! before `c` has been handled. A missing file means nothing has been synced
//! yet and reads as `0`.

use crate::errors::AppError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored cursor, defaulting to `0` when the file does not exist.
    pub async fn load(&self) -> Result<i64, AppError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No cursor file at {}, starting from 0",
                    self.path.display()
                );
                return Ok(0);
            }
            Err(e) => {
                return Err(AppError::CursorError(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        parse_cursor(&content).map_err(|msg| {
            AppError::CursorError(format!("Invalid cursor in {}: {}", self.path.display(), msg))
        })
    }

    /// Persists `value`, replacing the previous cursor atomically.
    pub async fn store(&self, value: i64) -> Result<(), AppError> {
        let tmp = self.tmp_path();

        tokio::fs::write(&tmp, value.to_string())
            .await
            .map_err(|e| {
                AppError::CursorError(format!("Failed to write {}: {}", tmp.display(), e))
            })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::CursorError(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::info!("Updated the last uploaded timestamp to: {}", value);
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Parses cursor file content: a non-negative decimal integer, surrounding
/// whitespace allowed.
pub fn parse_cursor(content: &str) -> Result<i64, String> {
    let trimmed = content.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| format!("expected a unix timestamp, found {:?}", trimmed))?;
    if value < 0 {
        return Err(format!("cursor cannot be negative ({})", value));
    }
    Ok(value)
}
