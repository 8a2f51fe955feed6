//! Command handlers for the CLI.

mod drafts;
mod notes;
mod stats;
mod trash;

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::domain::{AccountContext, Note, NoteId};
use crate::lifecycle::NoteLifecycleManager;
use crate::store::SqliteAdapter;

// Re-export public items
pub use drafts::{handle_draft_list, handle_draft_new, handle_draft_publish, handle_draft_rm};
pub use notes::{
    handle_categories, handle_favorite, handle_list, handle_new, handle_search, handle_show,
    handle_tags,
};
pub use stats::handle_stats;
pub use trash::{
    handle_autoclean, handle_empty_trash, handle_purge, handle_restore, handle_trash,
    handle_trash_stats,
};

// ===========================================
// Shared Utilities
// ===========================================

/// Opens the lifecycle manager over the database under the data directory.
pub fn open_manager(data_dir: &Path) -> Result<NoteLifecycleManager<SqliteAdapter>> {
    let db_path = data_dir.join("satchel.db");
    let adapter = SqliteAdapter::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    Ok(NoteLifecycleManager::with_adapter(adapter))
}

/// Resolves the account context from an optional username and token.
pub fn resolve_context(account: Option<String>, auth_token: Option<String>) -> AccountContext {
    match (account, auth_token) {
        (Some(username), Some(token)) => AccountContext::with_token(username, token),
        (Some(username), None) => AccountContext::signed_in(username),
        (None, _) => AccountContext::anonymous(),
    }
}

/// Result of resolving a user-supplied id or id prefix.
pub enum ResolveResult {
    Unique(Note),
    Ambiguous(Vec<Note>),
    NotFound,
}

/// Resolves an id or unambiguous id prefix against a note list.
///
/// Exact matches win outright; otherwise the input is treated as a
/// case-insensitive prefix of the id.
pub fn resolve_in(notes: &[Note], input: &str) -> ResolveResult {
    if let Some(note) = notes.iter().find(|n| n.id.to_string() == input) {
        return ResolveResult::Unique(note.clone());
    }

    let needle = input.to_uppercase();
    let matches: Vec<Note> = notes
        .iter()
        .filter(|n| n.id.to_string().starts_with(&needle))
        .cloned()
        .collect();
    match matches.len() {
        0 => ResolveResult::NotFound,
        1 => ResolveResult::Unique(matches.into_iter().next().expect("one match")),
        _ => ResolveResult::Ambiguous(matches),
    }
}

/// Resolves to a single id, printing candidates and failing on ambiguity.
pub fn resolve_id(notes: &[Note], input: &str) -> Result<NoteId> {
    match resolve_in(notes, input) {
        ResolveResult::Unique(note) => Ok(note.id),
        ResolveResult::Ambiguous(candidates) => {
            eprintln!("'{input}' matches multiple notes:");
            for note in &candidates {
                eprintln!("  {}  {}", note.id.prefix(), note.title);
            }
            bail!("ambiguous note identifier");
        }
        ResolveResult::NotFound => bail!("note not found: '{input}'"),
    }
}
