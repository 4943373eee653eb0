//! Persistence of the consent choice.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

use super::ConsentState;

pub trait ConsentStore: Send + Sync {
    fn load(&self) -> Result<ConsentState, StorageError>;
    fn save(&self, state: ConsentState) -> Result<(), StorageError>;
}

/// Single-value file holding `granted` or `denied`. A missing file is Unset.
#[derive(Debug, Clone)]
pub struct FileConsentStore {
    path: PathBuf,
}

impl FileConsentStore {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

impl ConsentStore for FileConsentStore {
    fn load(&self) -> Result<ConsentState, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => ConsentState::parse(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ConsentState::Unset),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn save(&self, state: ConsentState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        match state.as_stored() {
            Some(value) => fs::write(&self.path, value).map_err(|e| self.io_err(e)),
            None => match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(self.io_err(e)),
                _ => Ok(()),
            },
        }
    }
}

/// In-process store, used when no writable location exists and by tests.
#[derive(Debug, Default)]
pub struct MemoryConsentStore {
    value: Mutex<ConsentState>,
}

impl MemoryConsentStore {
    pub fn new(initial: ConsentState) -> Self {
        Self { value: Mutex::new(initial) }
    }
}

impl ConsentStore for MemoryConsentStore {
    fn load(&self) -> Result<ConsentState, StorageError> {
        Ok(*self.value.lock().unwrap_or_else(|p| p.into_inner()))
    }

    fn save(&self, state: ConsentState) -> Result<(), StorageError> {
        *self.value.lock().unwrap_or_else(|p| p.into_inner()) = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unset() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConsentStore::new(&dir.path().join("consent"));
        assert_eq!(store.load().unwrap(), ConsentState::Unset);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConsentStore::new(&dir.path().join("nested").join("consent"));
        store.save(ConsentState::Granted).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "granted");
        assert_eq!(store.load().unwrap(), ConsentState::Granted);

        store.save(ConsentState::Denied).unwrap();
        assert_eq!(store.load().unwrap(), ConsentState::Denied);

        store.save(ConsentState::Unset).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_garbage_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consent");
        fs::write(&path, "maybe").unwrap();
        let err = FileConsentStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::InvalidValue(_)));
    }
}
