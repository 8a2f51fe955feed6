//! TTL-based eviction over the trash collection.
//!
//! Eviction is computed solely from each entry's `deleted_at` stamp; there
//! is no background timer. The binary invokes [`TrashRetentionPolicy::auto_clean`]
//! once at startup for whichever account is resolvable.

use crate::domain::{AccountContext, CollectionKind, Note};
use crate::store::{CollectionStore, StorageAdapter, StoreResult};
use chrono::{Duration, Utc};
use log::{info, warn};
use serde::Serialize;

/// Days a trashed note is kept before eviction.
pub const TRASH_TTL_DAYS: i64 = 30;

/// Entries aged past this (but under the TTL) count as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 25;

/// Outcome of one eviction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub kept: usize,
    pub evicted: usize,
}

/// Snapshot of the trash collection's retention state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrashStats {
    pub total: usize,
    /// Entries aged in `[25, 30)` days.
    pub expiring_soon: usize,
    /// Entries past the TTL that have not yet been evicted.
    pub expired: usize,
}

/// TTL retention over one account's trash collection.
pub struct TrashRetentionPolicy<'a, A: StorageAdapter> {
    store: &'a CollectionStore<A>,
}

impl<'a, A: StorageAdapter> TrashRetentionPolicy<'a, A> {
    pub fn new(store: &'a CollectionStore<A>) -> Self {
        Self { store }
    }

    /// Partitions trash into keep/evict by age and persists the kept subset.
    ///
    /// An entry is evicted when `now - deleted_at >= 30 days`. Entries
    /// missing the delete stamp are an invariant violation: they are logged
    /// and kept, never evicted. The collection is only rewritten when
    /// something was actually evicted.
    pub fn auto_clean(&self, ctx: &AccountContext) -> StoreResult<CleanReport> {
        let trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
        let now = Utc::now();
        let ttl = Duration::days(TRASH_TTL_DAYS);

        let total = trash.len();
        let kept: Vec<Note> = trash
            .into_iter()
            .filter(|note| match note.deleted_at {
                Some(deleted_at) => now - deleted_at < ttl,
                None => {
                    warn!(
                        "invariant violation: trash entry {} in `{}` has no delete stamp; kept",
                        note.id,
                        ctx.namespace()
                    );
                    true
                }
            })
            .collect();

        let report = CleanReport {
            kept: kept.len(),
            evicted: total - kept.len(),
        };
        if report.evicted > 0 {
            self.store.set(ctx, CollectionKind::Trash, &kept)?;
            info!(
                "trash auto-clean for `{}`: evicted {}, kept {}",
                ctx.namespace(),
                report.evicted,
                report.kept
            );
        }
        Ok(report)
    }

    /// Counts without evicting: total, expiring soon, and already expired.
    pub fn statistics(&self, ctx: &AccountContext) -> StoreResult<TrashStats> {
        let trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
        let now = Utc::now();
        let ttl = Duration::days(TRASH_TTL_DAYS);
        let soon = Duration::days(EXPIRING_SOON_DAYS);

        let mut expiring_soon = 0;
        let mut expired = 0;
        for note in &trash {
            let Some(deleted_at) = note.deleted_at else {
                continue;
            };
            let age = now - deleted_at;
            if age >= ttl {
                expired += 1;
            } else if age >= soon {
                expiring_soon += 1;
            }
        }

        Ok(TrashStats {
            total: trash.len(),
            expiring_soon,
            expired,
        })
    }
}
