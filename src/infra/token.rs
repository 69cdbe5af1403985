//! Bearer credential holders.
//!
//! Every outgoing request asks the holder for the current credential right
//! before it is sent, so a `set` is visible to the very next request.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use super::error::InfraError;

const SOURCE: &str = "infra::token";

/// Process-wide holder of an optional bearer credential.
pub trait TokenHolder: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str) -> Result<(), InfraError>;
    fn clear(&self) -> Result<(), InfraError>;

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

/// Credential kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenHolder {
    token: RwLock<Option<String>>,
}

impl MemoryTokenHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenHolder for MemoryTokenHolder {
    fn get(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                warn!(target_module = SOURCE, "Recovered from poisoned token lock");
                poisoned.into_inner().clone()
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), InfraError> {
        let mut guard = self.token.write().unwrap_or_else(|poisoned| {
            warn!(target_module = SOURCE, "Recovered from poisoned token lock");
            poisoned.into_inner()
        });
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        let mut guard = self.token.write().unwrap_or_else(|poisoned| {
            warn!(target_module = SOURCE, "Recovered from poisoned token lock");
            poisoned.into_inner()
        });
        *guard = None;
        Ok(())
    }
}

/// Credential persisted to a file so it survives restarts.
///
/// A missing or blank file means no credential.
#[derive(Debug, Clone)]
pub struct FileTokenHolder {
    path: PathBuf,
}

impl FileTokenHolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/recipebox/token`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recipebox").join("token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, source: std::io::Error) -> InfraError {
        InfraError::TokenStore {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl TokenHolder for FileTokenHolder {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read stored credential"
                );
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), InfraError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.store_error(err))?;
        }
        fs::write(&self.path, token.trim()).map_err(|err| self.store_error(err))?;
        debug!(path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed stored credential");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.store_error(err)),
        }
    }
}
