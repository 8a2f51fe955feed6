//! Account context and collection addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace shared by all pre-login usage.
pub const ANONYMOUS_NAMESPACE: &str = "anonymous";

/// Resolved identity, passed explicitly into every core call.
///
/// There is no ambient "current session": callers resolve identity once and
/// hand the context down to the store, lifecycle, retention, and sync layers.
/// Absence of a username routes storage to the shared anonymous namespace;
/// absence of an auth token disables remote reconciliation without disabling
/// local CRUD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountContext {
    username: Option<String>,
    auth_token: Option<String>,
}

impl AccountContext {
    /// Context for pre-login usage (anonymous namespace, no remote sync).
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for a signed-in account without an auth token (local-only mode).
    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            auth_token: None,
        }
    }

    /// Context for a signed-in account with an auth token (sync enabled).
    pub fn with_token(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            auth_token: Some(token.into()),
        }
    }

    /// Returns the signed-in username, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the auth token, if any.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// True when a username is resolvable.
    pub fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }

    /// Storage namespace for this context.
    ///
    /// Falls back to [`ANONYMOUS_NAMESPACE`] when no username is available.
    pub fn namespace(&self) -> &str {
        self.username.as_deref().unwrap_or(ANONYMOUS_NAMESPACE)
    }
}

/// The disjoint per-account collections plus derived indexes.
///
/// `Active`, `Draft`, and `Trash` hold whole note lists; a note's lifecycle
/// state is which collection holds it, not a stored field. `TagIndex` and
/// `CategoryIndex` are recomputed in full from `Active` on every active
/// write. `RecentSources` is a small per-account history of source
/// attributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Active,
    Draft,
    Trash,
    TagIndex,
    CategoryIndex,
    RecentSources,
}

impl CollectionKind {
    /// Storage key suffix for this collection.
    pub fn key_suffix(self) -> &'static str {
        match self {
            CollectionKind::Active => "notes",
            CollectionKind::Draft => "drafts",
            CollectionKind::Trash => "trash",
            CollectionKind::TagIndex => "tag_index",
            CollectionKind::CategoryIndex => "category_index",
            CollectionKind::RecentSources => "recent_sources",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn anonymous_context_routes_to_shared_namespace() {
        let ctx = AccountContext::anonymous();
        assert_eq!(ctx.namespace(), ANONYMOUS_NAMESPACE);
        assert!(!ctx.is_signed_in());
        assert!(ctx.auth_token().is_none());
    }

    #[test]
    fn signed_in_context_uses_username_as_namespace() {
        let ctx = AccountContext::signed_in("alice");
        assert_eq!(ctx.namespace(), "alice");
        assert!(ctx.is_signed_in());
        assert!(ctx.auth_token().is_none());
    }

    #[test]
    fn token_enables_sync_without_changing_namespace() {
        let ctx = AccountContext::with_token("alice", "tok-123");
        assert_eq!(ctx.namespace(), "alice");
        assert_eq!(ctx.auth_token(), Some("tok-123"));
    }

    #[test]
    fn collection_kinds_have_distinct_suffixes() {
        use std::collections::HashSet;
        let kinds = [
            CollectionKind::Active,
            CollectionKind::Draft,
            CollectionKind::Trash,
            CollectionKind::TagIndex,
            CollectionKind::CategoryIndex,
            CollectionKind::RecentSources,
        ];
        let suffixes: HashSet<_> = kinds.iter().map(|k| k.key_suffix()).collect();
        assert_eq!(suffixes.len(), kinds.len());
    }
}
