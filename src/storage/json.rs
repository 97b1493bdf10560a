use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    models::store::LocalStorage,
    storage::{Storage, StorageError, codec},
};

const KEPT_BACKUPS: usize = 5;

/// UTC `YYYYMMDDTHHMMSS.nnnnnnnnnZ`, always the same length.
fn backup_stamp(timestamp: jiff::Timestamp) -> String {
    format!(
        "{}.{:09}Z",
        timestamp.strftime("%Y%m%dT%H%M%S"),
        timestamp.subsec_nanosecond()
    )
}

/// Keeps the whole database as a single JSON document.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or(Path::new("."))
            .join("backups")
    }

    /// Copies the current document aside before it gets replaced. Returns
    /// the number of bytes copied, 0 when there was nothing to back up.
    fn backup(&self) -> Result<u64, StorageError> {
        let exists = fs::exists(&self.path).map_err(|e| StorageError::BackupFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if !exists {
            return Ok(0);
        }

        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir).map_err(|e| StorageError::BackupFailed {
            path: backup_dir.clone(),
            source: e,
        })?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("store.json"));
        let backup_path =
            backup_dir.join(format!("{}-{}", file_name, backup_stamp(jiff::Timestamp::now())));

        let bytes = fs::copy(&self.path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path.clone(),
            source: e,
        })?;
        debug!(path = %backup_path.display(), bytes, "Backed up store");
        Ok(bytes)
    }

    /// Deletes all but the newest backups. Backup names end with a fixed
    /// width timestamp, so name order is age order.
    fn prune_backups(&self) -> Result<(), StorageError> {
        let backup_dir = self.backup_dir();
        let cleanup_failed = |e| StorageError::CleanupFailed {
            dir: backup_dir.clone(),
            source: e,
        };

        if !fs::exists(&backup_dir).map_err(cleanup_failed)? {
            return Ok(());
        }

        let mut backups = fs::read_dir(&backup_dir)
            .map_err(cleanup_failed)?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        if backups.len() <= KEPT_BACKUPS {
            return Ok(());
        }

        backups.sort();
        let stale = backups.len() - KEPT_BACKUPS;
        for backup in &backups[..stale] {
            fs::remove_file(backup).map_err(cleanup_failed)?;
        }
        debug!(removed = stale, "Pruned old backups");

        Ok(())
    }

    /// Moves the freshly written `temp_path` over the store under the lock,
    /// backing up the current document first.
    fn replace_with(&self, temp_path: &Path) -> Result<(), StorageError> {
        let save_failed = |path: &Path, e| StorageError::SaveFailed {
            path: path.to_path_buf(),
            source: e,
        };

        let lock_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| save_failed(lock_path.as_path(), e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| save_failed(lock_path.as_path(), e))?;

        self.backup()?;
        self.prune_backups()?;

        fs::rename(temp_path, &self.path).map_err(|e| save_failed(self.path.as_path(), e))?;
        lock_file.unlock().map_err(|e| save_failed(lock_path.as_path(), e))?;

        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Option<LocalStorage>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::LoadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        match codec::loads(&content)? {
            Some(store) => Ok(Some(store)),
            None => Err(StorageError::Corrupted {
                path: self.path.clone(),
            }),
        }
    }

    fn save(&self, store: &LocalStorage) -> Result<(), StorageError> {
        let content = codec::dumps(store)?;

        let temp_path = PathBuf::from(format!("{}.tmp.{}", self.path.display(), Uuid::new_v4()));
        fs::write(&temp_path, content).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        if let Err(e) = self.replace_with(&temp_path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e);
        }

        info!(path = %self.path.display(), "Saved store");
        Ok(())
    }
}
