//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use output::OutputFormat;
use std::path::PathBuf;

/// satchel - account-scoped local-first notes with trash retention and sync
#[derive(Parser, Debug)]
#[command(name = "satchel", version, about, long_about = None)]
pub struct Cli {
    /// Account username (overrides config file)
    #[arg(short = 'a', long, global = true)]
    pub account: Option<String>,

    /// Data directory (overrides config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new note
    New(NewArgs),

    /// List notes
    #[command(name = "ls")]
    List(ListArgs),

    /// Search notes by keyword, tag, category, or date range
    Search(SearchArgs),

    /// Show a note's contents
    Show(ShowArgs),

    /// Toggle a note's favorite flag
    Favorite(FavoriteArgs),

    /// Move a note to trash
    Trash(TrashArgs),

    /// Restore a note from trash
    Restore(RestoreArgs),

    /// Permanently delete a note from trash
    Purge(PurgeArgs),

    /// Permanently delete everything in trash
    EmptyTrash(EmptyTrashArgs),

    /// Evict trash entries older than 30 days
    Autoclean(AutocleanArgs),

    /// Show trash retention statistics
    TrashStats(TrashStatsArgs),

    /// Show account statistics
    Stats(StatsArgs),

    /// List all tags
    Tags(TagsArgs),

    /// List all categories
    Categories(CategoriesArgs),

    /// Manage drafts
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `new` command
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Note title
    pub title: String,

    /// Note content (reads stdin when omitted and stdin is piped)
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Category for the note
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Tag for the note (can be specified multiple times)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Free-text source attribution; also derives source tags
    #[arg(short, long)]
    pub source: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `ls` (list) command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Filter by tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Filter by category
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Only favorites
    #[arg(long)]
    pub favorites: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `search` command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search keyword (title, content, source)
    pub query: Option<String>,

    /// Filter by tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Filter by category
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Only notes created on/after this date (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<String>,

    /// Only notes created on/before this date (YYYY-MM-DD)
    #[arg(long)]
    pub before: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Note ID (full or unambiguous prefix)
    pub note: String,
}

/// Arguments for the `favorite` command
#[derive(Parser, Debug)]
pub struct FavoriteArgs {
    /// Note ID (full or unambiguous prefix)
    pub note: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `trash` command
#[derive(Parser, Debug)]
pub struct TrashArgs {
    /// Note IDs (full or unambiguous prefixes)
    #[arg(required = true)]
    pub notes: Vec<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `restore` command
#[derive(Parser, Debug)]
pub struct RestoreArgs {
    /// Note ID (full or unambiguous prefix)
    pub note: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `purge` command
#[derive(Parser, Debug)]
pub struct PurgeArgs {
    /// Note ID (full or unambiguous prefix)
    pub note: String,
}

/// Arguments for the `empty-trash` command
#[derive(Parser, Debug)]
pub struct EmptyTrashArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `autoclean` command
#[derive(Parser, Debug)]
pub struct AutocleanArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `trash-stats` command
#[derive(Parser, Debug)]
pub struct TrashStatsArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `stats` command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `tags` command
#[derive(Parser, Debug)]
pub struct TagsArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `categories` command
#[derive(Parser, Debug)]
pub struct CategoriesArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Draft subcommands
#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    /// Create or update a draft
    New(DraftNewArgs),

    /// List drafts
    #[command(name = "ls")]
    List(DraftListArgs),

    /// Publish a draft as a new active note
    Publish(DraftPublishArgs),

    /// Delete a draft
    Rm(DraftRmArgs),
}

/// Arguments for the `draft new` command
#[derive(Parser, Debug)]
pub struct DraftNewArgs {
    /// Draft title
    pub title: String,

    /// Draft content
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `draft ls` command
#[derive(Parser, Debug)]
pub struct DraftListArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `draft publish` command
#[derive(Parser, Debug)]
pub struct DraftPublishArgs {
    /// Draft ID (full or unambiguous prefix)
    pub draft: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `draft rm` command
#[derive(Parser, Debug)]
pub struct DraftRmArgs {
    /// Draft ID (full or unambiguous prefix)
    pub draft: String,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
