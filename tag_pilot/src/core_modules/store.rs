// THEORY:
// The last-command store is a single-slot mailbox between whoever computes
// steering actions and whoever consumes them. It is not a log: every write
// replaces the previous record, and only the newest record is observable.
//
// Key architectural principles:
// 1.  **One Contract, Many Media**: `CommandStore` only describes the cell.
//     `FileStore` backs it with a JSON file that several processes can share,
//     `MemoryStore` with an in-process lock.
// 2.  **No Torn Reads**: the file store never rewrites the target in place. It
//     writes a sibling temporary file and renames it over the target, so a
//     reader sees either the old record or the new one. Writers inside one
//     process are additionally serialized by a mutex.
// 3.  **Lazy Initialization**: a missing record is not an error. `read` writes
//     the default `searching` record and tries exactly once more. The default
//     is only ever created, never renamed over an existing file, so it cannot
//     replace a record another handle has just written.

use crate::core_modules::action::{Action, LastCommand};
use crate::error::StoreError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// File name used when no store path is configured.
pub const DEFAULT_STORE_FILE: &str = "last_result.json";

/// A single-slot, last-writer-wins cell holding the most recent command.
pub trait CommandStore: Send + Sync {
    /// Returns the stored record, or `None` if the medium holds nothing.
    fn load(&self) -> Result<Option<LastCommand>, StoreError>;

    /// Writes the default `searching` record if no record exists. Never
    /// touches an existing record.
    fn initialize_if_absent(&self) -> Result<(), StoreError>;

    /// Atomically replaces the stored record with `action`.
    fn write(&self, action: Action) -> Result<(), StoreError>;

    /// Returns the current record, initializing the medium once if it is
    /// found empty.
    fn read(&self) -> Result<LastCommand, StoreError> {
        if let Some(record) = self.load()? {
            return Ok(record);
        }
        self.initialize_if_absent()?;
        self.load()?.ok_or(StoreError::Missing)
    }
}

/// A JSON file holding `{"direction": "<action>"}`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories and the default
    /// record as needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let store = Self {
            path,
            write_lock: Mutex::new(()),
        };
        store.initialize_if_absent()?;
        info!(path = %store.path.display(), "last-command store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the store. The record stays on disk for other readers.
    pub fn close(self) {
        info!(path = %self.path.display(), "last-command store closed");
    }

    /// Publishes `record` through a sibling temp file. With `clobber` unset the
    /// target is only created, never replaced, and an existing target wins.
    fn persist(&self, record: LastCommand, clobber: bool) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        serde_json::to_writer(&mut tmp, &record).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;
        tmp.flush().map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        let published = if clobber {
            tmp.persist(&self.path).map(drop)
        } else {
            tmp.persist_noclobber(&self.path).map(drop)
        };
        match published {
            Ok(()) => Ok(()),
            Err(e) if !clobber && e.error.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e.error)),
        }
    }
}

impl CommandStore for FileStore {
    fn load(&self) -> Result<Option<LastCommand>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: self.path.clone(),
                source: e,
            })
    }

    fn initialize_if_absent(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        if self.path.exists() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "initializing last-command record");
        self.persist(LastCommand::default(), false)
    }

    fn write(&self, action: Action) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.persist(LastCommand::new(action), true)
    }
}

/// An in-process cell, for single-process setups and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<LastCommand>>,
}

impl MemoryStore {
    /// Creates a store already holding the default record.
    pub fn open() -> Self {
        Self {
            slot: RwLock::new(Some(LastCommand::default())),
        }
    }

    /// Drops the record, as if the medium had been wiped externally.
    pub fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}

impl CommandStore for MemoryStore {
    fn load(&self) -> Result<Option<LastCommand>, StoreError> {
        Ok(*self.slot.read().map_err(|_| StoreError::Poisoned)?)
    }

    fn initialize_if_absent(&self) -> Result<(), StoreError> {
        self.slot
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .get_or_insert_with(LastCommand::default);
        Ok(())
    }

    fn write(&self, action: Action) -> Result<(), StoreError> {
        *self.slot.write().map_err(|_| StoreError::Poisoned)? = Some(LastCommand::new(action));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn file_store() -> (TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join(DEFAULT_STORE_FILE)).unwrap();
        (dir, store)
    }

    #[test]
    fn open_writes_default_record() {
        let (_dir, store) = file_store();
        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "direction": "searching" }));
    }

    #[test]
    fn open_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("a/b/state.json")).unwrap();
        assert_eq!(store.read().unwrap().direction, Action::Searching);
    }

    #[test]
    fn initialize_keeps_existing_record() {
        let (_dir, store) = file_store();
        store.write(Action::TurnRight).unwrap();
        store.initialize_if_absent().unwrap();
        store.initialize_if_absent().unwrap();
        assert_eq!(store.read().unwrap().direction, Action::TurnRight);

        let memory = MemoryStore::open();
        memory.write(Action::Forward).unwrap();
        memory.initialize_if_absent().unwrap();
        memory.initialize_if_absent().unwrap();
        assert_eq!(memory.read().unwrap().direction, Action::Forward);
    }

    #[test]
    fn last_write_wins() {
        let (_dir, store) = file_store();
        store.write(Action::TurnLeft).unwrap();
        store.write(Action::Forward).unwrap();
        assert_eq!(store.read().unwrap().direction, Action::Forward);
    }

    #[test]
    fn read_recreates_deleted_file() {
        let (_dir, store) = file_store();
        store.write(Action::TurnLeft).unwrap();
        fs::remove_file(store.path()).unwrap();
        assert_eq!(store.read().unwrap().direction, Action::Searching);
        assert!(store.path().exists());
    }

    #[test]
    fn read_recreates_cleared_memory() {
        let store = MemoryStore::open();
        store.write(Action::TurnRight).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.read().unwrap().direction, Action::Searching);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, store) = file_store();
        fs::write(store.path(), b"{\"direction\": ").unwrap();
        assert!(matches!(store.read(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn initialize_never_replaces_another_handles_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILE);
        let a = Arc::new(FileStore::open(&path).unwrap());
        let b = Arc::new(FileStore::open(&path).unwrap());

        for round in 0..500 {
            fs::remove_file(&path).unwrap();
            let init = {
                let a = Arc::clone(&a);
                thread::spawn(move || a.initialize_if_absent().unwrap())
            };
            let write = {
                let b = Arc::clone(&b);
                thread::spawn(move || b.write(Action::TurnLeft).unwrap())
            };
            init.join().unwrap();
            write.join().unwrap();
            assert_eq!(a.read().unwrap().direction, Action::TurnLeft, "round {round}");
        }
    }

    #[test]
    fn initialize_on_existing_file_from_other_handle_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STORE_FILE);
        let a = FileStore::open(&path).unwrap();
        let b = FileStore::open(&path).unwrap();
        b.write(Action::Forward).unwrap();
        a.initialize_if_absent().unwrap();
        assert_eq!(a.read().unwrap().direction, Action::Forward);
    }

    #[test]
    fn concurrent_readers_never_see_torn_records() {
        let (_dir, store) = file_store();
        let store = Arc::new(store);

        let writers: Vec<_> = [Action::TurnLeft, Action::TurnRight, Action::Forward]
            .into_iter()
            .map(|action| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..50 {
                        store.write(action).unwrap();
                    }
                })
            })
            .collect();
        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    store.read().unwrap();
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
        assert_ne!(store.read().unwrap().direction, Action::Searching);
    }
}
