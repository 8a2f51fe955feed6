//! Shared fixtures for integration tests.

use satchel::domain::AccountContext;
use satchel::lifecycle::NoteLifecycleManager;
use satchel::store::{MemoryAdapter, StorageAdapter, StoreError, StoreResult};
use std::sync::Mutex;

/// Lifecycle manager over in-memory storage.
pub fn mem_manager() -> NoteLifecycleManager<MemoryAdapter> {
    NoteLifecycleManager::with_adapter(MemoryAdapter::new())
}

/// Signed-in context used by most tests.
pub fn ctx() -> AccountContext {
    AccountContext::signed_in("alice")
}

/// Adapter that can be told to reject writes to one key.
///
/// Reads and writes to every other key pass through to in-memory storage,
/// so a test can break exactly one phase of a two-phase move.
#[derive(Default)]
pub struct FlakyAdapter {
    inner: MemoryAdapter,
    fail_set_on: Mutex<Option<String>>,
}

impl FlakyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All subsequent writes to `key` fail until [`heal`](Self::heal).
    pub fn fail_writes_to(&self, key: &str) {
        *self.lock() = Some(key.to_string());
    }

    pub fn heal(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.fail_set_on.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageAdapter for FlakyAdapter {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.lock().as_deref() == Some(key) {
            return Err(StoreError::Backend(format!("injected write failure: {key}")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}
