//! On-disk token cache.

use crate::error::Result;
use crate::token::Token;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// JSON file holding the most recent token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store backed by `path`. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached token, or `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Token>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the token, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!(path = %self.path.display(), "Token cache written");
        Ok(())
    }
}
