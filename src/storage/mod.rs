// Durable key-value storage backends

pub mod file;
pub mod sqlite;

pub use file::FileStorage;
pub use sqlite::SqliteStorage;

use crate::error::Result;
use std::collections::HashMap;

/// Synchronous key-value blob store
///
/// Each key names a slot holding one string value. `set` replaces the whole
/// value and must be durable by the time it returns.
pub trait Storage {
    /// Read the value in `key`, or `None` if the slot was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value in `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `key` already holding `value`
    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.slots.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
