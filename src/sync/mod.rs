//! Pull/merge/push reconciliation against the remote service of record.
//!
//! One engine serves both the notes and drafts endpoint families; the two
//! services differ only in target collection and endpoint instance. A full
//! sync always pulls, merges, and persists before pushing, so push operates
//! on reconciled state. A quick sync pushes only. Every push item gets a
//! single attempt; failures are counted, never retried, and never abort the
//! rest of the batch.

mod remote;

pub use remote::{
    ApiEnvelope, RemoteCollection, RemoteCreated, RemoteError, RemoteItem, RemotePage,
    RemoteRecord, RemoteResult,
};

use crate::domain::{AccountContext, CollectionKind, Note, NoteId};
use crate::store::{CollectionStore, StorageAdapter, StoreError};
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use thiserror::Error;

/// The remote listing is fetched as one large page.
const PULL_PAGE: u32 = 1;
const PULL_PAGE_LIMIT: u32 = 1000;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A reconciliation run is already in flight for this account.
    #[error("sync already running for this account")]
    Busy,

    /// The context has no auth token; remote reconciliation is disabled.
    #[error("no auth token, remote sync is disabled")]
    NoAuthToken,

    /// The pull (or another fatal remote call) failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for reconciliation runs.
pub type SyncResult<T> = Result<T, SyncError>;

/// Tallies from one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records fetched from the remote listing.
    pub pulled: usize,
    /// Local-only records kept by the merge (flagged `needs_upload`).
    pub kept_local: usize,
    /// Local records dropped because their remote identity vanished.
    pub dropped_local: usize,
    /// Successful remote creates during push.
    pub created: usize,
    /// Successful remote updates during push.
    pub updated: usize,
    /// Push items that failed (single attempt each).
    pub failed: usize,
}

/// Outcome of [`merge`]: the reconciled list plus what happened to the
/// local-only records.
#[derive(Debug)]
pub struct MergeOutcome {
    pub notes: Vec<Note>,
    pub kept_local: usize,
    pub dropped_local: usize,
}

/// Reconciles local and remote record sets.
///
/// Remote wins verbatim for every id it contains; local edits not yet
/// pushed for an overlapping id are discarded. A local record absent from
/// the remote set is kept (flagged `needs_upload`) only when it has never
/// been assigned a remote identity; one that carries a remote id is
/// dropped, because the prior remote identity proves a remote-side
/// deletion. This asymmetry is the documented contract, not a full merge.
pub fn merge(local: Vec<Note>, remote: Vec<Note>) -> MergeOutcome {
    let remote_ids: HashSet<NoteId> = remote.iter().map(|n| n.id.clone()).collect();

    let mut notes = remote;
    let mut kept_local = 0;
    let mut dropped_local = 0;
    for mut note in local {
        if remote_ids.contains(&note.id) {
            continue;
        }
        if note.never_synced() {
            note.needs_upload = true;
            notes.push(note);
            kept_local += 1;
        } else {
            debug!(
                "merge: dropping {} (remote id {:?} no longer listed)",
                note.id, note.remote_id
            );
            dropped_local += 1;
        }
    }

    MergeOutcome {
        notes,
        kept_local,
        dropped_local,
    }
}

/// Pull/merge/push engine over one collection and one endpoint family.
pub struct SyncReconciler<'s, A: StorageAdapter, R: RemoteCollection> {
    store: &'s CollectionStore<A>,
    remote: R,
    target: CollectionKind,
    busy: Mutex<HashSet<String>>,
}

impl<'s, A: StorageAdapter, R: RemoteCollection> SyncReconciler<'s, A, R> {
    /// Reconciler for the active notes collection.
    pub fn for_notes(store: &'s CollectionStore<A>, remote: R) -> Self {
        Self::over(store, remote, CollectionKind::Active)
    }

    /// Structurally identical sibling for the drafts collection.
    pub fn for_drafts(store: &'s CollectionStore<A>, remote: R) -> Self {
        Self::over(store, remote, CollectionKind::Draft)
    }

    fn over(store: &'s CollectionStore<A>, remote: R, target: CollectionKind) -> Self {
        Self {
            store,
            remote,
            target,
            busy: Mutex::new(HashSet::new()),
        }
    }

    /// Full reconciliation: pull, merge, persist, then push.
    ///
    /// # Errors
    ///
    /// `NoAuthToken` without a token; `Busy` while another run holds this
    /// account's flag; `Remote` when the pull fails (local state is left
    /// untouched); `Store` when persistence fails.
    pub fn full_sync(&self, ctx: &AccountContext) -> SyncResult<SyncReport> {
        self.require_token(ctx)?;
        let _guard = self.begin(ctx.namespace())?;

        let pulled = self.pull()?;
        let local: Vec<Note> = self.store.get(ctx, self.target)?;
        let mut report = SyncReport {
            pulled: pulled.len(),
            ..SyncReport::default()
        };

        let outcome = merge(local, pulled);
        report.kept_local = outcome.kept_local;
        report.dropped_local = outcome.dropped_local;

        let mut notes = outcome.notes;
        self.persist(ctx, &notes)?;

        self.push_records(&mut notes, &mut report);
        self.persist(ctx, &notes)?;

        info!(
            "full sync of {} for `{}`: pulled {}, kept {}, dropped {}, created {}, updated {}, failed {}",
            self.target,
            ctx.namespace(),
            report.pulled,
            report.kept_local,
            report.dropped_local,
            report.created,
            report.updated,
            report.failed,
        );
        Ok(report)
    }

    /// Push-only reconciliation for bandwidth-constrained callers.
    pub fn quick_sync(&self, ctx: &AccountContext) -> SyncResult<SyncReport> {
        self.require_token(ctx)?;
        let _guard = self.begin(ctx.namespace())?;

        let mut notes: Vec<Note> = self.store.get(ctx, self.target)?;
        let mut report = SyncReport::default();
        self.push_records(&mut notes, &mut report);
        self.persist(ctx, &notes)?;

        info!(
            "quick sync of {} for `{}`: created {}, updated {}, failed {}",
            self.target,
            ctx.namespace(),
            report.created,
            report.updated,
            report.failed,
        );
        Ok(report)
    }

    /// Persists the target collection; an active write also recomputes the
    /// derived tag/category indexes, like every other active writer.
    fn persist(&self, ctx: &AccountContext, notes: &[Note]) -> SyncResult<()> {
        self.store.set(ctx, self.target, notes)?;
        if self.target == CollectionKind::Active {
            crate::lifecycle::recompute_indexes(self.store, ctx, notes)?;
        }
        Ok(())
    }

    /// Fetches the remote-authoritative set for this collection.
    fn pull(&self) -> SyncResult<Vec<Note>> {
        let page = self.remote.list(PULL_PAGE, PULL_PAGE_LIMIT)?;
        Ok(page
            .items
            .into_iter()
            .filter_map(RemoteItem::into_note)
            .collect())
    }

    /// Pushes every record once: create when it has no remote identity,
    /// update when it has one. Failures are tallied and skipped.
    fn push_records(&self, notes: &mut [Note], report: &mut SyncReport) {
        for note in notes.iter_mut() {
            let record = RemoteRecord::from_note(note);
            let result = match note.remote_id.clone() {
                None => self.remote.create(&record).map(|created| {
                    note.remote_id = Some(created.id);
                    report.created += 1;
                }),
                Some(remote_id) => self.remote.update(&remote_id, &record).map(|()| {
                    report.updated += 1;
                }),
            };
            match result {
                Ok(()) => {
                    note.last_synced_at = Some(Utc::now());
                    note.is_synced = true;
                    note.needs_upload = false;
                }
                Err(err) => {
                    warn!("push failed for {}: {err}", note.id);
                    report.failed += 1;
                }
            }
        }
    }

    fn require_token(&self, ctx: &AccountContext) -> SyncResult<()> {
        if ctx.auth_token().is_some() {
            Ok(())
        } else {
            Err(SyncError::NoAuthToken)
        }
    }

    fn begin(&self, namespace: &str) -> SyncResult<BusyGuard<'_>> {
        let mut flags = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        if !flags.insert(namespace.to_string()) {
            return Err(SyncError::Busy);
        }
        Ok(BusyGuard {
            flags: &self.busy,
            namespace: namespace.to_string(),
        })
    }
}

/// Clears the per-account busy flag when a run ends, even on early return.
struct BusyGuard<'a> {
    flags: &'a Mutex<HashSet<String>>,
    namespace: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.namespace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_keeps_never_synced_local_flagged_for_upload() {
        let local = vec![Note::new("local-only", "x")];
        let outcome = merge(local, Vec::new());
        assert_eq!(outcome.kept_local, 1);
        assert_eq!(outcome.dropped_local, 0);
        assert!(outcome.notes[0].needs_upload);
    }

    #[test]
    fn merge_drops_local_with_vanished_remote_identity() {
        let mut note = Note::new("was-synced", "x");
        note.remote_id = Some("r2".into());
        let outcome = merge(vec![note], Vec::new());
        assert!(outcome.notes.is_empty());
        assert_eq!(outcome.dropped_local, 1);
    }

    #[test]
    fn merge_remote_wins_on_overlapping_id() {
        let mut local = Note::new("local title", "local body");
        local.remote_id = Some("r1".into());

        let mut remote = local.clone();
        remote.title = "remote title".into();

        let outcome = merge(vec![local], vec![remote]);
        assert_eq!(outcome.notes.len(), 1);
        assert_eq!(outcome.notes[0].title, "remote title");
        assert_eq!(outcome.kept_local, 0);
    }

    #[test]
    fn merge_preserves_remote_order_then_locals() {
        let r1 = Note::new("r1", "");
        let r2 = Note::new("r2", "");
        let l = Note::new("l", "");
        let outcome = merge(vec![l], vec![r1.clone(), r2.clone()]);
        let titles: Vec<&str> = outcome.notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["r1", "r2", "l"]);
    }
}
