//! Keyed persistence of whole collections under account-scoped keys.
//!
//! The storage contract is deliberately coarse: a collection is read and
//! written as one JSON value, last-writer-wins, no field-level merge. The
//! lifecycle manager's single-entry operations are the sole sanctioned
//! access path; there is no locking here, and interleaved read-modify-write
//! sequences on the same key can silently overwrite each other.

mod memory;
mod sqlite;

pub use memory::MemoryAdapter;
pub use sqlite::SqliteAdapter;

use crate::domain::{AccountContext, CollectionKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The stored payload for a key could not be decoded or encoded.
    #[error("corrupt collection at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A backend adapter failed outside the database path.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The consumed storage contract: atomic get/set/remove of string values.
///
/// Each call is atomic from the core's perspective; on error the caller
/// must treat the stored value as unchanged and assume nothing was
/// partially persisted.
pub trait StorageAdapter {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Whole-collection persistence over a [`StorageAdapter`].
///
/// Keys are account-scoped: `"{namespace}::{kind}"`, where a context without
/// a username resolves to the shared anonymous namespace.
pub struct CollectionStore<A: StorageAdapter> {
    adapter: A,
}

impl<A: StorageAdapter> CollectionStore<A> {
    /// Wraps a storage adapter.
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    /// Returns the underlying adapter.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Storage key for an account's collection.
    pub fn key(ctx: &AccountContext, kind: CollectionKind) -> String {
        format!("{}::{}", ctx.namespace(), kind.key_suffix())
    }

    /// Reads a whole collection; an unset key yields an empty list.
    pub fn get<T: DeserializeOwned>(
        &self,
        ctx: &AccountContext,
        kind: CollectionKind,
    ) -> StoreResult<Vec<T>> {
        let key = Self::key(ctx, kind);
        match self.adapter.get(&key)? {
            None => Ok(Vec::new()),
            Some(payload) => {
                serde_json::from_str(&payload).map_err(|source| StoreError::Corrupt { key, source })
            }
        }
    }

    /// Overwrites a whole collection (last-writer-wins).
    pub fn set<T: Serialize>(
        &self,
        ctx: &AccountContext,
        kind: CollectionKind,
        items: &[T],
    ) -> StoreResult<()> {
        let key = Self::key(ctx, kind);
        let payload = serde_json::to_string(items)
            .map_err(|source| StoreError::Corrupt {
                key: key.clone(),
                source,
            })?;
        self.adapter.set(&key, &payload)
    }

    /// Removes a collection entirely.
    pub fn clear(&self, ctx: &AccountContext, kind: CollectionKind) -> StoreResult<()> {
        self.adapter.remove(&Self::key(ctx, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Note;
    use pretty_assertions::assert_eq;

    fn store() -> CollectionStore<MemoryAdapter> {
        CollectionStore::new(MemoryAdapter::new())
    }

    #[test]
    fn unset_collection_reads_as_empty() {
        let store = store();
        let ctx = AccountContext::signed_in("alice");
        let notes: Vec<Note> = store.get(&ctx, CollectionKind::Active).unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let store = store();
        let ctx = AccountContext::signed_in("alice");
        let notes = vec![Note::new("A", "one"), Note::new("B", "two")];
        store.set(&ctx, CollectionKind::Active, &notes).unwrap();

        let loaded: Vec<Note> = store.get(&ctx, CollectionKind::Active).unwrap();
        assert_eq!(loaded, notes);
    }

    #[test]
    fn set_overwrites_whole_collection() {
        let store = store();
        let ctx = AccountContext::signed_in("alice");
        store
            .set(&ctx, CollectionKind::Active, &[Note::new("A", "")])
            .unwrap();
        let replacement = vec![Note::new("B", "")];
        store.set(&ctx, CollectionKind::Active, &replacement).unwrap();

        let loaded: Vec<Note> = store.get(&ctx, CollectionKind::Active).unwrap();
        assert_eq!(loaded, replacement, "no field-level merge, last writer wins");
    }

    #[test]
    fn accounts_are_disjoint_namespaces() {
        let store = store();
        let alice = AccountContext::signed_in("alice");
        let bob = AccountContext::signed_in("bob");
        store
            .set(&alice, CollectionKind::Active, &[Note::new("A", "")])
            .unwrap();

        let bobs: Vec<Note> = store.get(&bob, CollectionKind::Active).unwrap();
        assert!(bobs.is_empty());
    }

    #[test]
    fn anonymous_context_routes_to_shared_namespace() {
        let store = store();
        let a = AccountContext::anonymous();
        let b = AccountContext::anonymous();
        store
            .set(&a, CollectionKind::Active, &[Note::new("A", "")])
            .unwrap();

        let loaded: Vec<Note> = store.get(&b, CollectionKind::Active).unwrap();
        assert_eq!(loaded.len(), 1, "all anonymous contexts share one namespace");
    }

    #[test]
    fn clear_removes_the_key() {
        let store = store();
        let ctx = AccountContext::signed_in("alice");
        store
            .set(&ctx, CollectionKind::Trash, &[Note::new("A", "")])
            .unwrap();
        store.clear(&ctx, CollectionKind::Trash).unwrap();

        let loaded: Vec<Note> = store.get(&ctx, CollectionKind::Trash).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_payload_surfaces_as_error() {
        let store = store();
        let ctx = AccountContext::signed_in("alice");
        let key = CollectionStore::<MemoryAdapter>::key(&ctx, CollectionKind::Active);
        store.adapter().set(&key, "not json").unwrap();

        let result: StoreResult<Vec<Note>> = store.get(&ctx, CollectionKind::Active);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn key_format_is_namespace_scoped() {
        let ctx = AccountContext::signed_in("alice");
        assert_eq!(
            CollectionStore::<MemoryAdapter>::key(&ctx, CollectionKind::Trash),
            "alice::trash"
        );
        let anon = AccountContext::anonymous();
        assert_eq!(
            CollectionStore::<MemoryAdapter>::key(&anon, CollectionKind::Active),
            "anonymous::notes"
        );
    }
}
