//! JSON key-value fallback store
//!
//! One document per key in a flat data directory. Every mutation in the
//! profile store lands here; when the relational backend is down this
//! is also the read source. The key patterns are the app's historical
//! storage keys and must not change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// Durable key for the login session document
pub const SESSION_KEY: &str = "session";

/// Durable key for a user's personal data document
pub fn personal_data_key(user: &str) -> String {
    format!("datos_personales_{user}")
}

/// Durable key for a user's experience list
pub fn experience_key(user: &str) -> String {
    format!("exp_{user}")
}

/// Durable key for a user's certification list
pub fn certification_key(user: &str) -> String {
    format!("cert_{user}")
}

/// File-backed key-value store, one JSON document per key.
#[derive(Debug, Clone)]
pub struct FallbackStore {
    dir: PathBuf,
}

impl FallbackStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read and deserialize the document stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Serialize and write `value` under `key`
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(value)?;
        fs::write(self.key_path(key), contents)?;
        Ok(())
    }

    /// Remove the document stored under `key`. Missing keys are fine.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Directory this store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of JSON documents currently stored
    pub fn document_count(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Session;

    #[test]
    fn test_set_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FallbackStore::open(dir.path()).unwrap();

        let session = Session::new("ana", "0042", true);
        store.set(SESSION_KEY, &session).unwrap();

        let loaded: Session = store.get(SESSION_KEY).unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FallbackStore::open(dir.path()).unwrap();

        let loaded: Option<Session> = store.get("nothing_here").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_remove_is_tolerant_of_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FallbackStore::open(dir.path()).unwrap();

        store.remove("never_written").unwrap();

        store.set(SESSION_KEY, &Session::new("ana", "0042", true)).unwrap();
        store.remove(SESSION_KEY).unwrap();
        let loaded: Option<Session> = store.get(SESSION_KEY).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_key_patterns() {
        assert_eq!(personal_data_key("ana"), "datos_personales_ana");
        assert_eq!(experience_key("ana"), "exp_ana");
        assert_eq!(certification_key("ana"), "cert_ana");
    }

    #[test]
    fn test_document_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = FallbackStore::open(dir.path()).unwrap();
        assert_eq!(store.document_count().unwrap(), 0);

        store.set(SESSION_KEY, &Session::new("ana", "0042", true)).unwrap();
        store.set(&experience_key("ana"), &Vec::<i32>::new()).unwrap();
        assert_eq!(store.document_count().unwrap(), 2);
    }
}
