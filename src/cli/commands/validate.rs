//! `institrack validate` command - Check collection integrity

use console::style;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{format_short_id, open_engine};
use crate::core::entity::Status;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Show summary only, don't show individual problems
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let engine = open_engine(global)?;
    let issues = engine.check().into_diagnostic()?;
    let counts = engine.counts().into_diagnostic()?;

    println!(
        "{} Checked {} submission(s)\n",
        style("→").blue(),
        counts.total()
    );
    for status in Status::ALL {
        println!("  {:<10} {}", status, style(counts.get(status)).cyan());
    }
    println!();

    if !args.summary {
        for issue in &issues {
            println!(
                "{} {} - {}",
                style("✗").red(),
                style(format_short_id(issue.key_id())).cyan(),
                issue
            );
        }
    }

    if issues.is_empty() {
        println!("{} All collections are consistent", style("✓").green());
        return Ok(());
    }

    println!();
    bail!("{} integrity problem(s) found", issues.len())
}
