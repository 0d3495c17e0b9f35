//! File-backed snapshot store.

use crate::backend::SnapshotStore;
use crate::error::{PersistError, PersistResult};
use crate::migration::SnapshotMigrations;
use crate::snapshot::Snapshot;
use fs2::FileExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A snapshot store backed by a JSON file.
///
/// # Durability
///
/// `save` writes the full snapshot to a sibling temp file, syncs it, and
/// renames it over the live path. A crash mid-save leaves the previous
/// snapshot intact.
///
/// # Process exclusivity
///
/// Opening the store takes an exclusive advisory lock on a sibling `.lock`
/// file, held until the store is dropped. A second process opening the same
/// path gets [`PersistError::Locked`].
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    migrations: SnapshotMigrations,
    write_guard: Mutex<()>,
    /// Held for the lifetime of the store; the lock releases on drop.
    _lock: File,
}

impl FileSnapshotStore {
    /// Opens a snapshot store at the given path with the standard
    /// migrations, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Locked`] if another process holds the lock,
    /// or an I/O error if the lock file cannot be created.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Self::open_with_migrations(path, SnapshotMigrations::standard())
    }

    /// Opens a snapshot store with a custom migration registry.
    pub fn open_with_migrations(
        path: impl AsRef<Path>,
        migrations: SnapshotMigrations,
    ) -> PersistResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        migrations.validate()?;

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(Self::lock_path(&path))?;
        lock.try_lock_exclusive()
            .map_err(|_| PersistError::Locked { path: path.clone() })?;

        Ok(Self {
            path,
            migrations,
            write_guard: Mutex::new(()),
            _lock: lock,
        })
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(".lock");
        PathBuf::from(os)
    }

    fn temp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> PersistResult<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        let mut value: Value = serde_json::from_str(&text)?;
        self.migrations.upgrade(&mut value)?;

        let snapshot = serde_json::from_value(value)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> PersistResult<()> {
        let _guard = self.write_guard.lock();

        let bytes = serde_json::to_vec(snapshot)?;
        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        Ok(())
    }
}
