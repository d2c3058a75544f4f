use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::ClientResult;

/// Persistent slot holding the single bearer credential across process runs.
/// Only the session store reads or writes it.
pub trait CredentialStorage: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, credential: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// File-backed slot used by the CLI. The credential is the whole file body.
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> ClientResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(body) => {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credential: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, credential)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory slot for tests and short-lived sessions.
#[derive(Default)]
pub struct MemoryCredentialStorage {
    slot: RwLock<Option<String>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self.slot.read().clone())
    }

    fn save(&self, credential: &str) -> ClientResult<()> {
        *self.slot.write() = Some(credential.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot.write() = None;
        Ok(())
    }
}
