//! Document persistence for the token.
//!
//! The adapter only ever touches one record, addressed by [`TOKEN_KEY`]. Any
//! document database (or anything that can hold a JSON object under a key) can
//! back it by implementing [`CredentialStore`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use miette::Diagnostic;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key of the singleton token record.
pub const TOKEN_KEY: &str = "token";

/// Identity field a document store adds to every record.
pub const ID_FIELD: &str = "_id";

pub type Document = Map<String, Value>;

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("io error: {0}")]
    #[diagnostic(code(xero_adapter::store::io))]
    Io(#[from] io::Error),

    #[error("stored document is not valid json: {0}")]
    #[diagnostic(code(xero_adapter::store::serialization))]
    Serialization(#[from] serde_json::Error),

    #[error("credential store backend failed: {0}")]
    #[diagnostic(code(xero_adapter::store::backend))]
    Backend(String),
}

/// Key/value persistence for credential documents.
pub trait CredentialStore: Send + Sync {
    fn find(&self, key: &str) -> Result<Option<Document>, StoreError>;

    /// Replaces the document under `key`, inserting it when absent.
    fn replace(&self, key: &str, document: Document) -> Result<(), StoreError>;

    /// Removes the document under `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn find(&self, key: &str) -> Result<Option<Document>, StoreError> {
        (**self).find(key)
    }

    fn replace(&self, key: &str, document: Document) -> Result<(), StoreError> {
        (**self).replace(key, document)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Process-local store. Records carry an `_id` field the way a document database's would.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    documents: Mutex<HashMap<String, Document>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Document>>, StoreError> {
        self.documents
            .lock()
            .map_err(|e| StoreError::Backend(format!("memory store lock poisoned: {e}")))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find(&self, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn replace(&self, key: &str, mut document: Document) -> Result<(), StoreError> {
        document.insert(ID_FIELD.to_string(), Value::String(key.to_string()));
        self.lock()?.insert(key.to_string(), document);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory. Files are written owner-only on unix.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        self.base_dir.join(format!("{name}.json"))
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn find(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn replace(&self, key: &str, mut document: Document) -> Result<(), StoreError> {
        let path = self.path_for(key);
        Self::ensure_parent(&path)?;
        document.insert(ID_FIELD.to_string(), Value::String(key.to_string()));

        // Write then rename so a concurrent reader never sees half a document.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(&document)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staging, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn memory_store_upserts_and_deletes() {
        let store = MemoryCredentialStore::new();
        assert!(store.find(TOKEN_KEY).unwrap().is_none());

        store.replace(TOKEN_KEY, document(json!({"access_token": "a"}))).unwrap();
        store.replace(TOKEN_KEY, document(json!({"access_token": "b"}))).unwrap();
        let found = store.find(TOKEN_KEY).unwrap().unwrap();
        assert_eq!(found["access_token"], "b");
        assert_eq!(found[ID_FIELD], TOKEN_KEY);

        store.delete(TOKEN_KEY).unwrap();
        assert!(store.find(TOKEN_KEY).unwrap().is_none());
        store.delete(TOKEN_KEY).unwrap();
    }

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials"));

        store.replace(TOKEN_KEY, document(json!({"access_token": "a"}))).unwrap();
        let found = store.find(TOKEN_KEY).unwrap().unwrap();
        assert_eq!(found["access_token"], "a");
        assert!(dir.path().join("credentials/token.json").exists());

        store.delete(TOKEN_KEY).unwrap();
        assert!(store.find(TOKEN_KEY).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_writes_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.replace(TOKEN_KEY, Document::new()).unwrap();

        let mode = fs::metadata(dir.path().join("token.json")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
