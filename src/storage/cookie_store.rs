use crate::error::StorageError;
use crate::presentation::serialization::Serializer;
use crate::session::cookies::StoredCookie;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed persistence for a session's cookie snapshot, so a later run
/// can skip the login roundtrips entirely.
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn save(&self, cookies: &[StoredCookie]) -> Result<(), StorageError> {
        let json = Serializer::to_json_pretty(&cookies.to_vec())?;
        fs::write(&self.path, json)?;
        debug!("Persisted {} cookies to {:?}", cookies.len(), self.path);
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<StoredCookie>, StorageError> {
        let json = fs::read_to_string(&self.path)?;
        Serializer::from_json(&json)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
