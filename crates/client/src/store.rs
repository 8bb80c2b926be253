//! Persisted session store.
//!
//! Three keys (`token`, `username`, `role`) that outlive the process. A
//! missing key is a normal state, not an error.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use voxgate_auth::{Session, SessionGrant};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionKey {
    Token,
    Username,
    Role,
}

impl SessionKey {
    pub const ALL: [SessionKey; 3] = [SessionKey::Token, SessionKey::Username, SessionKey::Role];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::Username => "username",
            SessionKey::Role => "role",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session store at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("session store lock poisoned")]
    Poisoned,
}

/// Durable key/value storage for the session.
///
/// Writes complete before the call returns; a subsequent `get` observes them.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Result<Option<String>, StoreError>;

    fn set(&self, key: SessionKey, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: SessionKey) -> Result<(), StoreError>;

    /// Remove every session key.
    fn clear(&self) -> Result<(), StoreError> {
        for key in SessionKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }

    /// Write all three keys of a grant.
    fn save(&self, grant: &SessionGrant) -> Result<(), StoreError> {
        self.set(SessionKey::Token, &grant.token)?;
        self.set(SessionKey::Username, &grant.username)?;
        self.set(SessionKey::Role, grant.role.as_str())
    }

    /// Rebuild the in-memory session from whatever is stored.
    fn load_session(&self) -> Result<Session, StoreError> {
        Ok(Session::rehydrate(
            self.get(SessionKey::Token)?,
            self.get(SessionKey::Username)?,
            self.get(SessionKey::Role)?,
        ))
    }
}

/// In-memory store.
///
/// Intended for tests and throwaway runs; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<SessionKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().map(|e| e.is_empty()).unwrap_or(false)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(&key);
        Ok(())
    }
}

/// JSON-file store.
///
/// The file holds one flat object of strings. Reads are served from an
/// in-memory mirror; every mutation rewrites the file through a temporary
/// sibling and a rename, so readers never see a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<SessionKey, String>>,
    /// Set when the file on disk does not match the mirror and must be
    /// rewritten on the next mutation.
    stale: AtomicBool,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// A corrupt file is logged and treated as empty; the next write replaces
    /// it. Use [`FileStore::open_strict`] to get [`StoreError::Corrupt`]
    /// instead.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        match Self::open_strict(path) {
            Err(StoreError::Corrupt { path, reason }) => {
                tracing::warn!(
                    path = %path.display(),
                    %reason,
                    "session store is corrupt; starting signed out"
                );
                Ok(Self {
                    path,
                    entries: RwLock::new(BTreeMap::new()),
                    stale: AtomicBool::new(true),
                })
            }
            other => other,
        }
    }

    /// Open the store at `path`, failing on a file that is not a JSON object
    /// of strings.
    pub fn open_strict(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened session store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            stale: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut BTreeMap<SessionKey, String>),
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = entries.clone();
        f(&mut next);
        if next == *entries && !self.stale.load(Ordering::Acquire) {
            return Ok(());
        }
        write_entries(&self.path, &next)?;
        *entries = next;
        self.stale.store(false, Ordering::Release);
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), StoreError> {
        self.mutate(|e| {
            e.insert(key, value.to_string());
        })
    }

    fn remove(&self, key: SessionKey) -> Result<(), StoreError> {
        self.mutate(|e| {
            e.remove(&key);
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|e| e.clear())
    }

    fn save(&self, grant: &SessionGrant) -> Result<(), StoreError> {
        self.mutate(|e| {
            e.insert(SessionKey::Token, grant.token.clone());
            e.insert(SessionKey::Username, grant.username.clone());
            e.insert(SessionKey::Role, grant.role.as_str().to_string());
        })
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<SessionKey, String>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let object: BTreeMap<String, String> =
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut entries = BTreeMap::new();
    for (name, value) in object {
        match SessionKey::from_name(&name) {
            Some(key) => {
                entries.insert(key, value);
            }
            None => tracing::debug!(key = %name, "ignoring unknown key in session store"),
        }
    }
    Ok(entries)
}

fn write_entries(path: &Path, entries: &BTreeMap<SessionKey, String>) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let object: BTreeMap<&str, &str> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let body = serde_json::to_vec_pretty(&object).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp).map_err(io_err)?;
    file.write_all(&body).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    fs::rename(&tmp, path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxgate_auth::{Role, SessionStatus};

    fn grant() -> SessionGrant {
        SessionGrant::new("t1", "alice", Role::Transcriber)
    }

    #[test]
    fn missing_keys_read_as_absent() {
        let store = MemoryStore::new();
        for key in SessionKey::ALL {
            assert_eq!(store.get(key).unwrap(), None);
        }
        store.remove(SessionKey::Token).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_rebuilds_the_session() {
        let store = MemoryStore::new();
        store.save(&grant()).unwrap();

        let session = store.load_session().unwrap();
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.grant(), Some(&grant()));
    }

    #[test]
    fn clear_removes_all_keys() {
        let store = MemoryStore::new();
        store.save(&grant()).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.save(&grant()).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(SessionKey::Token).unwrap().as_deref(), Some("t1"));
        assert_eq!(reopened.get(SessionKey::Role).unwrap().as_deref(), Some("transcriber"));
        assert_eq!(reopened.load_session().unwrap().grant(), Some(&grant()));
    }

    #[test]
    fn file_store_clear_empties_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.save(&grant()).unwrap();
        store.clear().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let object: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert!(object.is_empty());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn strict_open_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = FileStore::open_strict(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn corrupt_file_opens_empty_and_is_replaced_by_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token": 5}"#).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(!store.load_session().unwrap().is_authenticated());
        for key in SessionKey::ALL {
            assert_eq!(store.get(key).unwrap(), None);
        }

        store.clear().unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        let object: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert!(object.is_empty());
        assert!(FileStore::open_strict(&path).is_ok());
    }

    #[test]
    fn file_store_ignores_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token":"t9","theme":"dark"}"#).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(SessionKey::Token).unwrap().as_deref(), Some("t9"));
        // Partial record: rehydrates as signed out.
        assert!(!store.load_session().unwrap().is_authenticated());
    }
}
