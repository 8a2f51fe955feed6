//! satchel - account-scoped local-first notes with trash retention and sync

pub mod cli;
pub mod domain;
pub mod lifecycle;
pub mod retention;
pub mod store;
pub mod sync;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::warn;

use cli::{
    Cli, Command, DraftCommand,
    config::Config,
    handlers::{
        handle_autoclean, handle_categories, handle_draft_list, handle_draft_new,
        handle_draft_publish, handle_draft_rm, handle_empty_trash, handle_favorite, handle_list,
        handle_new, handle_purge, handle_restore, handle_search, handle_show, handle_stats,
        handle_tags, handle_trash, handle_trash_stats, open_manager, resolve_context,
    },
};
use retention::TrashRetentionPolicy;

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _logger = flexi_logger::Logger::try_with_env_or_str(level)
        .context("invalid log specification")?
        .start()
        .context("failed to initialize logging")?;

    if let Command::Completions(args) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "satchel", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load()?;
    let data_dir = config.data_dir(cli.data_dir.as_ref());
    let ctx = resolve_context(
        config.account(cli.account.as_deref()),
        config.auth_token.clone(),
    );

    let manager = open_manager(&data_dir)?;

    // One eviction pass per invocation; a failure here never blocks the
    // requested command.
    if let Err(err) = TrashRetentionPolicy::new(manager.store()).auto_clean(&ctx) {
        warn!("startup trash auto-clean failed: {err}");
    }

    match &cli.command {
        Command::New(args) => handle_new(args, &manager, &ctx),
        Command::List(args) => handle_list(args, &manager, &ctx),
        Command::Search(args) => handle_search(args, &manager, &ctx),
        Command::Show(args) => handle_show(args, &manager, &ctx),
        Command::Favorite(args) => handle_favorite(args, &manager, &ctx),
        Command::Trash(args) => handle_trash(args, &manager, &ctx),
        Command::Restore(args) => handle_restore(args, &manager, &ctx),
        Command::Purge(args) => handle_purge(args, &manager, &ctx),
        Command::EmptyTrash(args) => handle_empty_trash(args, &manager, &ctx),
        Command::Autoclean(args) => handle_autoclean(args, &manager, &ctx),
        Command::TrashStats(args) => handle_trash_stats(args, &manager, &ctx),
        Command::Stats(args) => handle_stats(args, &manager, &ctx),
        Command::Tags(args) => handle_tags(args, &manager, &ctx),
        Command::Categories(args) => handle_categories(args, &manager, &ctx),
        Command::Draft(draft) => match draft {
            DraftCommand::New(args) => handle_draft_new(args, &manager, &ctx),
            DraftCommand::List(args) => handle_draft_list(args, &manager, &ctx),
            DraftCommand::Publish(args) => handle_draft_publish(args, &manager, &ctx),
            DraftCommand::Rm(args) => handle_draft_rm(args, &manager, &ctx),
        },
        Command::Completions(_) => unreachable!("handled before opening the store"),
    }
}
