//! Clean command implementation.

use anyhow::Result;
use humansize::{format_size, BINARY};
use std::path::PathBuf;

use crate::cleanup::{CleanStats, Cleaner};
use crate::cli::CleanArgs;
use crate::config::Config;
use crate::template::Selectors;

/// Run the clean command.
///
/// Actions run in order and the first failing one stops the command.
pub fn run(args: CleanArgs, config: &Config, settings_path: Option<PathBuf>) -> Result<()> {
    let actions = if args.actions.is_empty() {
        config.selection.clean_actions.clone()
    } else {
        args.actions
    };

    if actions.is_empty() {
        println!("No cleanup actions configured.");
        return Ok(());
    }

    let selectors = Selectors::new(&args.target, &args.platform, &args.cpu, &args.configuration);

    let mut cleaner = Cleaner::new(config);
    if let Some(path) = settings_path {
        cleaner = cleaner.with_settings_path(path);
    }

    let mut total = CleanStats::default();
    for action in actions {
        let stats = cleaner.run(action, &selectors)?;
        println!(
            "  {:<16} removed {:>4}  freed {:>10}",
            action.name(),
            stats.removed,
            format_size(stats.freed_bytes, BINARY)
        );
        total.removed += stats.removed;
        total.freed_bytes += stats.freed_bytes;
    }

    println!(
        "\nTotal for {}: {} item{} removed, {} freed",
        selectors,
        total.removed,
        if total.removed == 1 { "" } else { "s" },
        format_size(total.freed_bytes, BINARY)
    );

    Ok(())
}
