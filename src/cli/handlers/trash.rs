//! Handlers for trash commands (trash, restore, purge, empty-trash,
//! autoclean, trash-stats).

use anyhow::{Context, Result};
use std::io::Write;

use super::resolve_id;
use crate::cli::output::{NoteListing, Output, OutputFormat};
use crate::cli::{
    AutocleanArgs, EmptyTrashArgs, PurgeArgs, RestoreArgs, TrashArgs, TrashStatsArgs,
};
use crate::domain::{AccountContext, NoteId};
use crate::lifecycle::NoteLifecycleManager;
use crate::retention::TrashRetentionPolicy;
use crate::store::StorageAdapter;

/// Move one or more notes into trash.
pub fn handle_trash<A: StorageAdapter>(
    args: &TrashArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let notes = manager.list_notes(ctx)?;
    let ids: Vec<NoteId> = args
        .notes
        .iter()
        .map(|input| resolve_id(&notes, input))
        .collect::<Result<_>>()?;

    let report = manager.soft_delete_many(ctx, &ids)?;
    match args.format {
        OutputFormat::Human => {
            println!("Trashed {} note(s)", report.succeeded);
            for failure in &report.failures {
                eprintln!("  failed {}: {}", failure.id, failure.error);
            }
        }
        OutputFormat::Json => {
            let out = Output::new(&report);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Restore a trashed note into the active collection.
pub fn handle_restore<A: StorageAdapter>(
    args: &RestoreArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let trash = manager.list_trash(ctx)?;
    let id = resolve_id(&trash, &args.note)?;
    let restored = manager.restore(ctx, &id)?;

    match args.format {
        OutputFormat::Human => {
            println!("Restored '{}' [{}]", restored.title, restored.id.prefix());
        }
        OutputFormat::Json => {
            let out = Output::new(NoteListing::from_note(&restored));
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Permanently delete a single trashed note.
pub fn handle_purge<A: StorageAdapter>(
    args: &PurgeArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let trash = manager.list_trash(ctx)?;
    let id = resolve_id(&trash, &args.note)?;
    manager.permanent_delete(ctx, &id)?;
    println!("Purged {}", id.prefix());
    Ok(())
}

/// Permanently delete everything in trash, after confirmation.
pub fn handle_empty_trash<A: StorageAdapter>(
    args: &EmptyTrashArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let pending = manager.list_trash(ctx)?.len();
    if pending == 0 {
        println!("Trash is already empty");
        return Ok(());
    }

    if !args.yes {
        print!("Permanently delete {pending} trashed note(s)? [y/N] ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .context("failed to read confirmation")?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Aborted");
            return Ok(());
        }
    }

    let removed = manager.empty_trash(ctx)?;
    println!("Removed {removed} note(s) from trash");
    Ok(())
}

/// Evict trash entries past the retention TTL.
pub fn handle_autoclean<A: StorageAdapter>(
    args: &AutocleanArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let policy = TrashRetentionPolicy::new(manager.store());
    let report = policy.auto_clean(ctx)?;

    match args.format {
        OutputFormat::Human => {
            println!("Evicted {}, kept {}", report.evicted, report.kept);
        }
        OutputFormat::Json => {
            let out = Output::new(report);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Show trash retention statistics without evicting anything.
pub fn handle_trash_stats<A: StorageAdapter>(
    args: &TrashStatsArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let policy = TrashRetentionPolicy::new(manager.store());
    let stats = policy.statistics(ctx)?;

    match args.format {
        OutputFormat::Human => {
            println!("Trashed:       {}", stats.total);
            println!("Expiring soon: {}", stats.expiring_soon);
            println!("Expired:       {}", stats.expired);
        }
        OutputFormat::Json => {
            let out = Output::new(stats);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
