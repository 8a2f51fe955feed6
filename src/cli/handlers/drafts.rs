//! Handlers for draft commands (draft new/ls/publish/rm).

use anyhow::Result;

use super::resolve_id;
use crate::cli::output::{NoteListing, Output, OutputFormat};
use crate::cli::{DraftListArgs, DraftNewArgs, DraftPublishArgs, DraftRmArgs};
use crate::domain::{AccountContext, Note};
use crate::lifecycle::NoteLifecycleManager;
use crate::store::StorageAdapter;

/// Create a new draft.
pub fn handle_draft_new<A: StorageAdapter>(
    args: &DraftNewArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let draft = manager.save_draft(ctx, Note::new(args.title.clone(), args.content.clone()))?;
    match args.format {
        OutputFormat::Human => {
            println!("Saved draft '{}' [{}]", draft.title, draft.id.prefix());
        }
        OutputFormat::Json => {
            let out = Output::new(&draft);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// List drafts.
pub fn handle_draft_list<A: StorageAdapter>(
    args: &DraftListArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let drafts = manager.list_drafts(ctx)?;
    match args.format {
        OutputFormat::Human => {
            if drafts.is_empty() {
                println!("No drafts");
                return Ok(());
            }
            for draft in &drafts {
                let listing = NoteListing::from_note(draft);
                println!("{}", listing.human_line(&draft.id.prefix()));
            }
        }
        OutputFormat::Json => {
            let listings: Vec<NoteListing> = drafts.iter().map(NoteListing::from_note).collect();
            let out = Output::new(listings);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Publish a draft as a brand-new active note.
pub fn handle_draft_publish<A: StorageAdapter>(
    args: &DraftPublishArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let drafts = manager.list_drafts(ctx)?;
    let id = resolve_id(&drafts, &args.draft)?;
    let published = manager.publish_draft(ctx, &id)?;

    match args.format {
        OutputFormat::Human => {
            println!(
                "Published '{}' as [{}]",
                published.title,
                published.id.prefix()
            );
        }
        OutputFormat::Json => {
            let out = Output::new(&published);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// Delete a draft.
pub fn handle_draft_rm<A: StorageAdapter>(
    args: &DraftRmArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let drafts = manager.list_drafts(ctx)?;
    let id = resolve_id(&drafts, &args.draft)?;
    manager.delete_draft(ctx, &id)?;
    println!("Deleted draft {}", id.prefix());
    Ok(())
}
