//! Durable token storage
//!
//! The durable side is a small file holding the `authToken` entry, surviving
//! across sessions. The request-scoped mirror (the `token` cookie) lives on
//! the gateway, which attaches the token to every request.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Durable client-side storage for the session token
pub trait TokenStore: Send + Sync {
    /// Read the previously persisted token, if any
    fn load(&self) -> Result<Option<String>>;

    /// Persist a freshly issued token, replacing any prior value
    fn persist(&mut self, token: &str) -> Result<()>;
}

/// File-backed token store (the durable `authToken` entry)
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim().to_string();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn persist(&mut self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("failed to create token dir: {}", e)))?;
        }
        fs::write(&self.path, token).map_err(|e| {
            Error::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// In-memory token store for tests and embedders with their own persistence
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }

    fn persist(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }
}
