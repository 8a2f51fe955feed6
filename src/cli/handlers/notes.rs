//! Handlers for active note commands (new, ls, search, show, favorite,
//! tags, categories).

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::io::{IsTerminal, Read};

use super::resolve_id;
use crate::cli::output::{NoteListing, Output, OutputFormat};
use crate::cli::{
    CategoriesArgs, FavoriteArgs, ListArgs, NewArgs, SearchArgs, ShowArgs, TagsArgs,
};
use crate::domain::{
    AccountContext, Note, TagOrigin, TagRef, contains_name, derive_source_tags,
};
use crate::lifecycle::{NoteLifecycleManager, SearchQuery};
use crate::store::StorageAdapter;

/// Create a new note.
pub fn handle_new<A: StorageAdapter>(
    args: &NewArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let content = if args.content.is_empty() && !std::io::stdin().is_terminal() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read note content from stdin")?;
        buf
    } else {
        args.content.clone()
    };

    let mut note = Note::new(args.title.clone(), content);
    note.category = args.category.clone();
    note.tags = args
        .tags
        .iter()
        .map(|name| TagRef::new(name, TagOrigin::UserProvided))
        .collect();
    if let Some(source) = &args.source {
        note.source = Some(source.clone());
        for derived in derive_source_tags(source) {
            if !contains_name(&note.tags, &derived) {
                note.tags.push(TagRef::new(derived, TagOrigin::SourceDerived));
            }
        }
    }

    let saved = manager.save_note(ctx, note)?;
    match args.format {
        OutputFormat::Human => {
            println!("Created '{}' [{}]", saved.title, saved.id.prefix());
        }
        OutputFormat::Json => {
            let out = Output::new(&saved);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// List active notes, optionally filtered.
pub fn handle_list<A: StorageAdapter>(
    args: &ListArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let notes: Vec<Note> = manager
        .list_notes(ctx)?
        .into_iter()
        .filter(|n| {
            args.tag
                .as_deref()
                .is_none_or(|tag| contains_name(&n.tags, tag))
        })
        .filter(|n| {
            args.category
                .as_deref()
                .is_none_or(|cat| n.category.as_deref() == Some(cat))
        })
        .filter(|n| !args.favorites || n.is_favorite)
        .collect();

    print_listing(&notes, args.format)
}

/// Search active notes by keyword, tag, category, and date range.
pub fn handle_search<A: StorageAdapter>(
    args: &SearchArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let query = SearchQuery {
        keyword: args.query.clone(),
        tag: args.tag.clone(),
        category: args.category.clone(),
        created_after: args.after.as_deref().map(parse_day_start).transpose()?,
        created_before: args.before.as_deref().map(parse_day_end).transpose()?,
    };
    let hits = manager.search(ctx, &query)?;
    print_listing(&hits, args.format)
}

/// Show one note in full.
pub fn handle_show<A: StorageAdapter>(
    args: &ShowArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let notes = manager.list_notes(ctx)?;
    let id = resolve_id(&notes, &args.note)?;
    let note = manager.get_note(ctx, &id)?;

    println!("# {}", note.title);
    println!("id:       {}", note.id);
    if let Some(category) = &note.category {
        println!("category: {category}");
    }
    if !note.tags.is_empty() {
        let names: Vec<&str> = note.tags.iter().map(|t| t.name.as_str()).collect();
        println!("tags:     {}", names.join(", "));
    }
    if let Some(source) = &note.source {
        println!("source:   {source}");
    }
    println!("created:  {}", note.created_at.to_rfc3339());
    println!("updated:  {}", note.updated_at.to_rfc3339());
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
    Ok(())
}

/// Toggle a note's favorite flag.
pub fn handle_favorite<A: StorageAdapter>(
    args: &FavoriteArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let notes = manager.list_notes(ctx)?;
    let id = resolve_id(&notes, &args.note)?;
    let note = manager.toggle_favorite(ctx, &id)?;

    match args.format {
        OutputFormat::Human => {
            let verb = if note.is_favorite {
                "Favorited"
            } else {
                "Unfavorited"
            };
            println!("{verb} '{}' [{}]", note.title, note.id.prefix());
        }
        OutputFormat::Json => {
            let out = Output::new(&note);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

/// List distinct tag names from the active collection.
pub fn handle_tags<A: StorageAdapter>(
    args: &TagsArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    print_names(&manager.tag_index(ctx)?, args.format)
}

/// List distinct categories from the active collection.
pub fn handle_categories<A: StorageAdapter>(
    args: &CategoriesArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    print_names(&manager.category_index(ctx)?, args.format)
}

fn print_listing(notes: &[Note], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if notes.is_empty() {
                println!("No notes found");
                return Ok(());
            }
            for note in notes {
                let listing = NoteListing::from_note(note);
                println!("{}", listing.human_line(&note.id.prefix()));
            }
        }
        OutputFormat::Json => {
            let listings: Vec<NoteListing> = notes.iter().map(NoteListing::from_note).collect();
            let out = Output::new(listings);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn print_names(names: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for name in names {
                println!("{name}");
            }
        }
        OutputFormat::Json => {
            let out = Output::new(names);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn parse_day_start(s: &str) -> Result<DateTime<Utc>> {
    let date = parse_date(s)?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
        .and_utc())
}

fn parse_day_end(s: &str) -> Result<DateTime<Utc>> {
    let date = parse_date(s)?;
    Ok(date
        .and_hms_opt(23, 59, 59)
        .expect("end of day is valid")
        .and_utc())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let start = parse_day_start("2024-03-15").unwrap();
        let end = parse_day_end("2024-03-15").unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-03-15T23:59:59+00:00");
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(parse_date("15/03/2024").is_err());
    }
}
