//! Handler for the stats command.

use anyhow::Result;

use crate::cli::StatsArgs;
use crate::cli::output::{Output, OutputFormat};
use crate::domain::AccountContext;
use crate::lifecycle::NoteLifecycleManager;
use crate::store::StorageAdapter;

/// Show per-account statistics across all collections.
pub fn handle_stats<A: StorageAdapter>(
    args: &StatsArgs,
    manager: &NoteLifecycleManager<A>,
    ctx: &AccountContext,
) -> Result<()> {
    let stats = manager.statistics(ctx)?;

    match args.format {
        OutputFormat::Human => {
            println!("Account: {}", ctx.namespace());
            println!("Notes:      {}", stats.notes);
            println!("Drafts:     {}", stats.drafts);
            println!("Trashed:    {}", stats.trashed);
            println!("Favorites:  {}", stats.favorites);
            println!("Characters: {}", stats.total_word_count);
            if !stats.tag_counts.is_empty() {
                println!("Tags:");
                for (name, count) in &stats.tag_counts {
                    println!("  {name}: {count}");
                }
            }
            if !stats.category_counts.is_empty() {
                println!("Categories:");
                for (name, count) in &stats.category_counts {
                    println!("  {name}: {count}");
                }
            }
        }
        OutputFormat::Json => {
            let out = Output::new(&stats);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
