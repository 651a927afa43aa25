//! Share command implementation

use colored::Colorize;
use fanout_core::{ShareOutcome, Workspace};

use crate::error::Result;

/// Run the share command
pub fn run_share(workspace: &Workspace, target: &str, client: &str) -> Result<()> {
    let outcome = workspace.share(target, client)?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &ShareOutcome) {
    println!(
        "{} {} with {}",
        "Shared".green().bold(),
        outcome.path.cyan(),
        outcome.client.cyan()
    );

    let pruned_files = outcome.pruned.files.len();
    if pruned_files > 0 {
        println!(
            "   Removed {} {} from {} because they're included within {}",
            pruned_files,
            plural(pruned_files, "file", "files"),
            outcome.client,
            outcome.path.cyan()
        );
    }
    let pruned_modules = outcome.pruned.modules.len();
    if pruned_modules > 0 {
        println!(
            "   Removed {} {} from {} because they're included within {}",
            pruned_modules,
            plural(pruned_modules, "submodule", "submodules"),
            outcome.client,
            outcome.path.cyan()
        );
    }

    let copied = outcome.summary.copied();
    if copied > 0 {
        println!(
            "   {} {} {}",
            "Copied".dimmed(),
            copied,
            plural(copied, "file", "files")
        );
    }
    for report in outcome.summary.clients.values() {
        for error in &report.errors {
            println!("   {} {}", "!".red(), error);
        }
    }
}

pub(crate) fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
