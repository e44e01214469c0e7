//! Local device storage for the game snapshot.
//!
//! Storage is a plain key/value seam. The snapshot is overwritten on every
//! commit and never appended to.

pub mod file;
pub mod memory;
pub mod snapshot;
pub mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use snapshot::Snapshot;
pub use sqlite::SqliteStorage;

use crate::hunt::{state::GameState, store::StoreObserver};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Synchronous key/value storage, shaped after browser local storage.
pub trait StateStorage: Send {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: StateStorage + ?Sized> StateStorage for Box<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }
}

/// Store observer that writes the persisted subtree after every commit.
pub struct Persister {
    storage: Box<dyn StateStorage>,
    key: String,
    total_tasks: u32,
}

impl Persister {
    pub fn new(storage: Box<dyn StateStorage>, key: impl Into<String>, total_tasks: u32) -> Self {
        Self {
            storage,
            key: key.into(),
            total_tasks,
        }
    }
}

impl StoreObserver for Persister {
    fn committed(&mut self, state: &GameState) {
        let json = match Snapshot::capture(state, self.total_tasks).to_json() {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(%error, "failed to encode game snapshot");
                return;
            }
        };

        if let Err(error) = self.storage.save(&self.key, &json) {
            tracing::warn!(%error, key = %self.key, "failed to persist game snapshot");
        }
    }
}
