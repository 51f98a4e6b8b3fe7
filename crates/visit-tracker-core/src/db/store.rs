//! Flat string-keyed storage abstraction.

use std::collections::HashMap;

use super::{Database, DbResult};

/// A flat, string-keyed durable key-value store.
///
/// Writes replace the whole value under a key.
pub trait KeyValueStore {
    /// Read the value under `key`, if any.
    fn get_item(&self, key: &str) -> DbResult<Option<String>>;

    /// Replace the value under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> DbResult<()>;
}

impl KeyValueStore for Database {
    fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Database::get_item(self, key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> DbResult<()> {
        Database::set_item(self, key, value)
    }
}

/// Process-local store with no durability.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> DbResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise<S: KeyValueStore>(store: &mut S) {
        assert_eq!(store.get_item("visits").unwrap(), None);

        store.set_item("visits", "[]").unwrap();
        assert_eq!(store.get_item("visits").unwrap(), Some("[]".to_string()));

        store.set_item("visits", "[1]").unwrap();
        assert_eq!(store.get_item("visits").unwrap(), Some("[1]".to_string()));
    }

    #[test]
    fn test_memory_store() {
        exercise(&mut MemoryStore::new());
    }

    #[test]
    fn test_database_store() {
        exercise(&mut Database::open_in_memory().unwrap());
    }
}
