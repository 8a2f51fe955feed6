//! In-memory storage adapter.

use crate::store::{StorageAdapter, StoreResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// HashMap-backed adapter for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test helper).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageAdapter for MemoryAdapter {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_absent_key_is_none() {
        let adapter = MemoryAdapter::new();
        assert_eq!(adapter.get("missing").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let adapter = MemoryAdapter::new();
        adapter.set("k", "v").unwrap();
        assert_eq!(adapter.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn remove_is_idempotent() {
        let adapter = MemoryAdapter::new();
        adapter.set("k", "v").unwrap();
        adapter.remove("k").unwrap();
        adapter.remove("k").unwrap();
        assert_eq!(adapter.get("k").unwrap(), None);
    }
}
