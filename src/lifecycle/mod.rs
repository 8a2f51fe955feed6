//! Note lifecycle management: create/update, soft-delete/restore,
//! permanent delete, drafts, favorites, search, and statistics.
//!
//! The manager is the sole sanctioned access path to the active, draft,
//! and trash collections. Its invariants:
//!
//! - A note id is present in at most one of active/draft/trash at any time.
//! - Tag and category indexes are recomputed in full from the active
//!   collection on every active write, never patched incrementally.
//! - Moves between collections are two-phase (remove, then add) with the
//!   first phase rolled back when the second fails.
//! - Entries carrying deletion or draft markers never pass into or out of
//!   the active collection; they are filtered and logged, not propagated.

use crate::domain::{AccountContext, CollectionKind, Note, NoteId, names_match};
use crate::store::{CollectionStore, StorageAdapter, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// How many source attributions the per-account history keeps.
const RECENT_SOURCES_CAP: usize = 10;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The id is absent from the collection the operation expected.
    #[error("note not found: {id}")]
    NotFound { id: String },

    /// A mutating call was attempted with no resolvable identity.
    #[error("not logged in")]
    NotLoggedIn,

    /// A storage failure aborted the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LifecycleError {
    /// True when the caller should branch to a login flow.
    pub fn needs_login(&self) -> bool {
        matches!(self, LifecycleError::NotLoggedIn)
    }

    fn not_found(id: &NoteId) -> Self {
        LifecycleError::NotFound { id: id.to_string() }
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// One failed element of a batch operation.
#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub id: String,
    pub error: String,
}

/// Outcome of a batch operation; per-item failures are collected, the
/// batch always runs to completion.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn record_failure(&mut self, id: String, error: impl ToString) {
        self.failures.push(BatchFailure {
            id,
            error: error.to_string(),
        });
    }
}

/// Filters for searching the active collection.
#[derive(Debug, Default, Clone)]
pub struct SearchQuery {
    /// Case-insensitive substring over title, content, and source.
    pub keyword: Option<String>,
    /// Case-insensitive tag name.
    pub tag: Option<String>,
    pub category: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl SearchQuery {
    fn matches(&self, note: &Note) -> bool {
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let hit = note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
                || note
                    .source
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(tag) = &self.tag
            && !crate::domain::contains_name(&note.tags, tag)
        {
            return false;
        }
        if let Some(category) = &self.category
            && note.category.as_deref() != Some(category.as_str())
        {
            return false;
        }
        if let Some(after) = self.created_after
            && note.created_at < after
        {
            return false;
        }
        if let Some(before) = self.created_before
            && note.created_at > before
        {
            return false;
        }
        true
    }
}

/// Read-only per-account statistics.
#[derive(Debug, Serialize)]
pub struct AccountStatistics {
    pub notes: usize,
    pub drafts: usize,
    pub trashed: usize,
    pub favorites: usize,
    pub total_word_count: usize,
    /// Counts keyed by lowercased tag name.
    pub tag_counts: BTreeMap<String, usize>,
    pub category_counts: BTreeMap<String, usize>,
}

/// Owns the lifecycle of one account's note collections.
pub struct NoteLifecycleManager<A: StorageAdapter> {
    store: CollectionStore<A>,
}

impl<A: StorageAdapter> NoteLifecycleManager<A> {
    /// Creates a manager over a collection store.
    pub fn new(store: CollectionStore<A>) -> Self {
        Self { store }
    }

    /// Wraps a raw adapter.
    pub fn with_adapter(adapter: A) -> Self {
        Self::new(CollectionStore::new(adapter))
    }

    /// Returns the underlying collection store (used by retention and sync).
    pub fn store(&self) -> &CollectionStore<A> {
        &self.store
    }

    // ===========================================
    // Create / update
    // ===========================================

    /// Upserts a note into the active collection.
    ///
    /// New ids are generated by [`Note::new`]; an id already present in the
    /// active collection is updated in place, preserving its original
    /// `created_at`. Always stamps `updated_at`, recomputes the word count,
    /// and marks the record unsynced. Tag and category indexes are rebuilt
    /// from the full active collection afterwards.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` when the context has no username.
    pub fn save_note(&self, ctx: &AccountContext, mut note: Note) -> LifecycleResult<Note> {
        self.require_login(ctx)?;
        let mut active = self.load_active(ctx)?;
        Self::stamp_for_save(&mut note, &active);
        match active.iter().position(|n| n.id == note.id) {
            Some(pos) => active[pos] = note.clone(),
            None => active.push(note.clone()),
        }
        self.persist_active(ctx, &active)?;

        if let Some(source) = note.source.clone() {
            self.remember_source(ctx, &source)?;
        }
        Ok(note)
    }

    /// Batch form of [`save_note`](Self::save_note): the per-item contract
    /// is unchanged, but the collection is persisted once for the whole
    /// batch. Item failures are collected and the batch continues.
    pub fn save_many(
        &self,
        ctx: &AccountContext,
        items: Vec<Note>,
    ) -> LifecycleResult<BatchReport> {
        self.require_login(ctx)?;
        let mut active = self.load_active(ctx)?;
        let mut report = BatchReport::default();
        let mut sources = Vec::new();

        for mut note in items {
            Self::stamp_for_save(&mut note, &active);
            if let Some(source) = note.source.clone() {
                sources.push(source);
            }
            match active.iter().position(|n| n.id == note.id) {
                Some(pos) => active[pos] = note,
                None => active.push(note),
            }
            report.succeeded += 1;
        }

        self.persist_active(ctx, &active)?;
        for source in sources {
            self.remember_source(ctx, &source)?;
        }
        Ok(report)
    }

    fn stamp_for_save(note: &mut Note, active: &[Note]) {
        let now = Utc::now();
        match active.iter().find(|n| n.id == note.id) {
            Some(existing) => note.created_at = existing.created_at,
            None => note.created_at = now,
        }
        note.updated_at = now;
        note.word_count = Note::count_words(&note.content);
        note.is_synced = false;
        note.clear_lifecycle_markers();
    }

    // ===========================================
    // Reads
    // ===========================================

    /// Returns the active collection (contaminated entries filtered).
    pub fn list_notes(&self, ctx: &AccountContext) -> LifecycleResult<Vec<Note>> {
        Ok(self.load_active(ctx)?)
    }

    /// Finds an active note by id.
    pub fn get_note(&self, ctx: &AccountContext, id: &NoteId) -> LifecycleResult<Note> {
        self.load_active(ctx)?
            .into_iter()
            .find(|n| n.id == *id)
            .ok_or_else(|| LifecycleError::not_found(id))
    }

    /// Returns the draft collection.
    pub fn list_drafts(&self, ctx: &AccountContext) -> LifecycleResult<Vec<Note>> {
        Ok(self.store.get(ctx, CollectionKind::Draft)?)
    }

    /// Returns the trash collection.
    pub fn list_trash(&self, ctx: &AccountContext) -> LifecycleResult<Vec<Note>> {
        Ok(self.store.get(ctx, CollectionKind::Trash)?)
    }

    /// Searches the active collection.
    pub fn search(&self, ctx: &AccountContext, query: &SearchQuery) -> LifecycleResult<Vec<Note>> {
        let active = self.load_active(ctx)?;
        Ok(active.into_iter().filter(|n| query.matches(n)).collect())
    }

    /// Distinct tag names derived from the active collection.
    pub fn tag_index(&self, ctx: &AccountContext) -> LifecycleResult<Vec<String>> {
        Ok(self.store.get(ctx, CollectionKind::TagIndex)?)
    }

    /// Distinct categories derived from the active collection.
    pub fn category_index(&self, ctx: &AccountContext) -> LifecycleResult<Vec<String>> {
        Ok(self.store.get(ctx, CollectionKind::CategoryIndex)?)
    }

    /// Most-recent-first source attribution history.
    pub fn recent_sources(&self, ctx: &AccountContext) -> LifecycleResult<Vec<String>> {
        Ok(self.store.get(ctx, CollectionKind::RecentSources)?)
    }

    /// Read-only account statistics.
    pub fn statistics(&self, ctx: &AccountContext) -> LifecycleResult<AccountStatistics> {
        let active = self.load_active(ctx)?;
        let drafts: Vec<Note> = self.store.get(ctx, CollectionKind::Draft)?;
        let trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;

        let mut tag_counts = BTreeMap::new();
        let mut category_counts = BTreeMap::new();
        for note in &active {
            for tag in &note.tags {
                *tag_counts.entry(tag.name.to_lowercase()).or_insert(0) += 1;
            }
            if let Some(category) = &note.category {
                *category_counts.entry(category.clone()).or_insert(0) += 1;
            }
        }

        Ok(AccountStatistics {
            notes: active.len(),
            drafts: drafts.len(),
            trashed: trash.len(),
            favorites: active.iter().filter(|n| n.is_favorite).count(),
            total_word_count: active.iter().map(|n| n.word_count).sum(),
            tag_counts,
            category_counts,
        })
    }

    // ===========================================
    // Soft delete / restore / permanent delete
    // ===========================================

    /// Moves an active note into trash (two-phase, rolled back on failure).
    ///
    /// Phase A persists the active collection minus the target; phase B
    /// appends the target, stamped with `deleted_at`, to trash. If phase B
    /// fails the original active list is re-persisted. Calling this for an
    /// id already in trash is a successful no-op.
    pub fn soft_delete(&self, ctx: &AccountContext, id: &NoteId) -> LifecycleResult<()> {
        self.require_login(ctx)?;
        let active = self.load_active(ctx)?;

        let Some(pos) = active.iter().position(|n| n.id == *id) else {
            let trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
            if trash.iter().any(|n| n.id == *id) {
                return Ok(());
            }
            return Err(LifecycleError::not_found(id));
        };

        let original = active.clone();
        let mut remaining = active;
        let mut target = remaining.remove(pos);
        self.persist_active(ctx, &remaining)?;

        target.clear_lifecycle_markers();
        target.deleted_at = Some(Utc::now());
        let mut trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
        trash.push(target);

        if let Err(err) = self.store.set(ctx, CollectionKind::Trash, &trash) {
            self.roll_back_active(ctx, &original, &err);
            return Err(err.into());
        }
        Ok(())
    }

    /// Batch soft delete: same per-id contract, one persist per collection.
    ///
    /// Ids already in trash count as successes (idempotent); unknown ids are
    /// collected as failures and the batch continues.
    pub fn soft_delete_many(
        &self,
        ctx: &AccountContext,
        ids: &[NoteId],
    ) -> LifecycleResult<BatchReport> {
        self.require_login(ctx)?;
        let active = self.load_active(ctx)?;
        let mut trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
        let mut report = BatchReport::default();

        let original = active.clone();
        let mut remaining = active;
        let now = Utc::now();
        for id in ids {
            if let Some(pos) = remaining.iter().position(|n| n.id == *id) {
                let mut target = remaining.remove(pos);
                target.clear_lifecycle_markers();
                target.deleted_at = Some(now);
                trash.push(target);
                report.succeeded += 1;
            } else if trash.iter().any(|n| n.id == *id) {
                report.succeeded += 1;
            } else {
                report.record_failure(id.to_string(), LifecycleError::not_found(id));
            }
        }

        self.persist_active(ctx, &remaining)?;
        if let Err(err) = self.store.set(ctx, CollectionKind::Trash, &trash) {
            self.roll_back_active(ctx, &original, &err);
            return Err(err.into());
        }
        Ok(report)
    }

    /// Moves a trashed note back into the active collection.
    ///
    /// Inverse two-phase move: trash is persisted without the target first,
    /// then the target (markers stripped) is appended to active. If the
    /// active write fails, the entry is re-inserted into trash.
    pub fn restore(&self, ctx: &AccountContext, id: &NoteId) -> LifecycleResult<Note> {
        self.require_login(ctx)?;
        let mut trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;

        let pos = trash
            .iter()
            .position(|n| n.id == *id)
            .ok_or_else(|| LifecycleError::not_found(id))?;
        let mut target = trash.remove(pos);
        self.store.set(ctx, CollectionKind::Trash, &trash)?;

        target.clear_lifecycle_markers();
        let mut active = self.load_active(ctx)?;
        active.push(target.clone());

        if let Err(err) = self.store.set(ctx, CollectionKind::Active, &active) {
            // Roll back: put the entry back into trash.
            trash.push({
                let mut back = target;
                back.deleted_at = Some(Utc::now());
                back
            });
            if let Err(rollback_err) = self.store.set(ctx, CollectionKind::Trash, &trash) {
                error!(
                    "restore rollback failed for {id}: {rollback_err} (original error: {err})"
                );
            }
            return Err(err.into());
        }
        // Index rebuild failures don't undo the move; indexes are derived
        // data and the next active write recomputes them.
        self.rebuild_indexes(ctx, &active)?;
        Ok(target)
    }

    /// Removes a note from trash irreversibly.
    ///
    /// This path never reaches into the active collection: an id that is
    /// not currently trashed is `NotFound` even if an active note has it.
    pub fn permanent_delete(&self, ctx: &AccountContext, id: &NoteId) -> LifecycleResult<()> {
        self.require_login(ctx)?;
        let mut trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
        let pos = trash
            .iter()
            .position(|n| n.id == *id)
            .ok_or_else(|| LifecycleError::not_found(id))?;
        trash.remove(pos);
        self.store.set(ctx, CollectionKind::Trash, &trash)?;
        Ok(())
    }

    /// Clears the trash collection, returning how many entries were removed.
    pub fn empty_trash(&self, ctx: &AccountContext) -> LifecycleResult<usize> {
        self.require_login(ctx)?;
        let trash: Vec<Note> = self.store.get(ctx, CollectionKind::Trash)?;
        let count = trash.len();
        self.store.clear(ctx, CollectionKind::Trash)?;
        Ok(count)
    }

    // ===========================================
    // Favorites
    // ===========================================

    /// Flips the favorite flag, stamping or clearing `favorited_at`.
    ///
    /// A field-level patch in intent, but it still goes through the same
    /// whole-collection read-modify-write as every other active mutation.
    pub fn toggle_favorite(&self, ctx: &AccountContext, id: &NoteId) -> LifecycleResult<Note> {
        self.require_login(ctx)?;
        let mut active = self.load_active(ctx)?;
        let pos = active
            .iter()
            .position(|n| n.id == *id)
            .ok_or_else(|| LifecycleError::not_found(id))?;

        let note = &mut active[pos];
        note.is_favorite = !note.is_favorite;
        note.favorited_at = note.is_favorite.then(Utc::now);
        note.updated_at = Utc::now();
        let updated = note.clone();

        self.persist_active(ctx, &active)?;
        Ok(updated)
    }

    // ===========================================
    // Drafts
    // ===========================================

    /// Upserts a note into the draft collection.
    ///
    /// Drafts live independently from active notes; saving a draft touches
    /// neither the active collection nor the derived indexes.
    pub fn save_draft(&self, ctx: &AccountContext, mut note: Note) -> LifecycleResult<Note> {
        self.require_login(ctx)?;
        let mut drafts: Vec<Note> = self.store.get(ctx, CollectionKind::Draft)?;

        let now = Utc::now();
        match drafts.iter().position(|n| n.id == note.id) {
            Some(pos) => {
                note.created_at = drafts[pos].created_at;
                note.updated_at = now;
                note.word_count = Note::count_words(&note.content);
                drafts[pos] = note.clone();
            }
            None => {
                note.created_at = now;
                note.updated_at = now;
                note.word_count = Note::count_words(&note.content);
                drafts.push(note.clone());
            }
        }
        self.store.set(ctx, CollectionKind::Draft, &drafts)?;
        Ok(note)
    }

    /// Removes a draft.
    pub fn delete_draft(&self, ctx: &AccountContext, id: &NoteId) -> LifecycleResult<()> {
        self.require_login(ctx)?;
        let mut drafts: Vec<Note> = self.store.get(ctx, CollectionKind::Draft)?;
        let pos = drafts
            .iter()
            .position(|n| n.id == *id)
            .ok_or_else(|| LifecycleError::not_found(id))?;
        drafts.remove(pos);
        self.store.set(ctx, CollectionKind::Draft, &drafts)?;
        Ok(())
    }

    /// Publishes a draft as a brand-new active note, then deletes the draft.
    ///
    /// Copy-then-delete, not a move: the published note gets a fresh id,
    /// fresh `created_at`, and no remote identity or sync metadata. Its
    /// identity is unrelated to the draft's id.
    pub fn publish_draft(&self, ctx: &AccountContext, draft_id: &NoteId) -> LifecycleResult<Note> {
        self.require_login(ctx)?;
        let drafts: Vec<Note> = self.store.get(ctx, CollectionKind::Draft)?;
        let draft = drafts
            .iter()
            .find(|n| n.id == *draft_id)
            .ok_or_else(|| LifecycleError::not_found(draft_id))?;

        let mut published = Note::new(draft.title.clone(), draft.content.clone());
        published.category = draft.category.clone();
        published.tags = draft.tags.clone();
        published.source = draft.source.clone();
        published.image_refs = draft.image_refs.clone();
        published.audio_refs = draft.audio_refs.clone();

        let saved = self.save_note(ctx, published)?;
        self.delete_draft(ctx, draft_id)?;
        Ok(saved)
    }

    // ===========================================
    // Internals
    // ===========================================

    fn require_login(&self, ctx: &AccountContext) -> LifecycleResult<()> {
        if ctx.is_signed_in() {
            Ok(())
        } else {
            Err(LifecycleError::NotLoggedIn)
        }
    }

    /// Reads the active collection, filtering contaminated entries.
    fn load_active(&self, ctx: &AccountContext) -> StoreResult<Vec<Note>> {
        let notes: Vec<Note> = self.store.get(ctx, CollectionKind::Active)?;
        Ok(Self::sanitize_active(ctx, notes))
    }

    /// Writes the active collection and rebuilds the derived indexes.
    fn persist_active(&self, ctx: &AccountContext, notes: &[Note]) -> StoreResult<()> {
        let clean = Self::sanitize_active(ctx, notes.to_vec());
        self.store.set(ctx, CollectionKind::Active, &clean)?;
        self.rebuild_indexes(ctx, &clean)
    }

    /// Drops entries bearing deletion or draft markers.
    ///
    /// Self-healing guard, not a normal code path: occurrences are logged
    /// as invariant violations and never propagated.
    fn sanitize_active(ctx: &AccountContext, notes: Vec<Note>) -> Vec<Note> {
        notes
            .into_iter()
            .filter(|note| {
                if note.carries_lifecycle_markers() {
                    warn!(
                        "invariant violation: note {} in active collection of `{}` carries \
                         lifecycle markers (deleted_at={:?}, is_draft={}); filtered",
                        note.id,
                        ctx.namespace(),
                        note.deleted_at,
                        note.is_draft,
                    );
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    /// Recomputes the tag and category indexes from the full active list.
    fn rebuild_indexes(&self, ctx: &AccountContext, active: &[Note]) -> StoreResult<()> {
        recompute_indexes(&self.store, ctx, active)
    }

    /// Pushes a source attribution onto the per-account history.
    fn remember_source(&self, ctx: &AccountContext, source: &str) -> StoreResult<()> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let mut recent: Vec<String> = self.store.get(ctx, CollectionKind::RecentSources)?;
        recent.retain(|s| !names_match(s, trimmed));
        recent.insert(0, trimmed.to_string());
        recent.truncate(RECENT_SOURCES_CAP);
        self.store.set(ctx, CollectionKind::RecentSources, &recent)
    }

    fn roll_back_active(&self, ctx: &AccountContext, original: &[Note], cause: &StoreError) {
        if let Err(rollback_err) = self.persist_active(ctx, original) {
            error!(
                "active rollback failed for `{}`: {rollback_err} (original error: {cause})",
                ctx.namespace()
            );
        }
    }
}

/// Recomputes the tag and category indexes from the full active list.
///
/// Every writer of the active collection must call this (the lifecycle
/// manager does so via `persist_active`, the sync reconciler after each
/// reconciled persist); the indexes are derived data and never patched
/// incrementally.
pub(crate) fn recompute_indexes<A: StorageAdapter>(
    store: &CollectionStore<A>,
    ctx: &AccountContext,
    active: &[Note],
) -> StoreResult<()> {
    let mut seen = std::collections::HashSet::new();
    let mut tags: Vec<String> = Vec::new();
    for tag in active.iter().flat_map(|n| n.tags.iter()) {
        if seen.insert(tag.name.to_lowercase()) {
            tags.push(tag.name.clone());
        }
    }

    let mut categories: Vec<String> = Vec::new();
    for category in active.iter().filter_map(|n| n.category.as_ref()) {
        if !categories.iter().any(|c| names_match(c, category)) {
            categories.push(category.clone());
        }
    }

    store.set(ctx, CollectionKind::TagIndex, &tags)?;
    store.set(ctx, CollectionKind::CategoryIndex, &categories)
}
