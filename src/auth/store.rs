use crate::error::{AppError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CLIENT_SECRETS_FILE: &str = "client_secrets.json";
pub const TOKEN_CACHE_FILE: &str = "mycreds.txt";
pub const SERVICE_ACCOUNT_FILE: &str = "service_account.json";

const CREDENTIAL_FILES: &[&str] = &[CLIENT_SECRETS_FILE, TOKEN_CACHE_FILE, SERVICE_ACCOUNT_FILE];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// Credentials only live for the lifetime of the process
    Memory,
    /// Credentials are written in plaintext under this directory
    Disk(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    persistence: Persistence,
}

impl CredentialStore {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }

    pub fn in_memory() -> Self {
        Self::new(Persistence::Memory)
    }

    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::new(Persistence::Disk(dir.into()))
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        match &self.persistence {
            Persistence::Memory => None,
            Persistence::Disk(dir) => Some(dir.join(name)),
        }
    }

    /// Path of the OAuth token cache, if tokens are persisted.
    pub fn token_cache(&self) -> Option<PathBuf> {
        self.path(TOKEN_CACHE_FILE)
    }

    /// Write credential material to its fixed file. No-op in memory mode.
    pub fn persist(&self, name: &str, contents: &str) -> Result<()> {
        let Some(path) = self.path(name) else {
            return Ok(());
        };

        ensure_parent(&path)?;

        // Create file with owner-only permissions from the start
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .map_err(|e| AppError::Auth(format!("Failed to create {:?}: {}", path, e)))?;

        file.write_all(contents.as_bytes())
            .map_err(|e| AppError::Auth(format!("Failed to write {:?}: {}", path, e)))?;

        warn!(path = ?path, "Persisted plaintext credentials to disk");

        Ok(())
    }

    /// Remove every persisted credential file, returning how many were deleted.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;

        for name in CREDENTIAL_FILES {
            let Some(path) = self.path(name) else {
                continue;
            };

            if !path.exists() {
                continue;
            }

            fs::remove_file(&path)
                .map_err(|e| AppError::Auth(format!("Failed to delete {:?}: {}", path, e)))?;
            debug!(path = ?path, "Removed credential file");
            removed += 1;
        }

        Ok(removed)
    }
}

pub(super) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Auth(format!("Failed to create credentials directory: {}", e))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_memory_store_writes_nothing() {
        let store = CredentialStore::in_memory();

        store.persist(CLIENT_SECRETS_FILE, "{}").unwrap();
        assert_eq!(store.token_cache(), None);
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn test_disk_store_persists_with_owner_only_mode() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::on_disk(dir.path().join("nested"));

        store.persist(SERVICE_ACCOUNT_FILE, r#"{"type": "service_account"}"#).unwrap();

        let path = dir.path().join("nested").join(SERVICE_ACCOUNT_FILE);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"type": "service_account"}"#
        );
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_persist_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::on_disk(dir.path());

        store.persist(CLIENT_SECRETS_FILE, "{\"first\": true}").unwrap();
        store.persist(CLIENT_SECRETS_FILE, "{}").unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(CLIENT_SECRETS_FILE)).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_clear_removes_known_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::on_disk(dir.path());

        store.persist(CLIENT_SECRETS_FILE, "{}").unwrap();
        store.persist(TOKEN_CACHE_FILE, "[]").unwrap();
        fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(!dir.path().join(CLIENT_SECRETS_FILE).exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_token_cache_path() {
        let store = CredentialStore::on_disk("/var/creds");
        assert_eq!(
            store.token_cache(),
            Some(PathBuf::from("/var/creds/mycreds.txt"))
        );
    }
}
