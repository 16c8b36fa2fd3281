//! Reject command - Send submissions back to the provider with a reason

use clap::Args;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::filters::RejectSource;
use crate::cli::helpers::open_engine;
use crate::core::entity::Status;

/// Reject pending or approved submissions
#[derive(Debug, Args)]
pub struct RejectArgs {
    /// Submission keys or prefixes (accepts multiple, or - for stdin)
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Rejection reason (required)
    #[arg(long, short = 'r')]
    pub reason: String,

    /// Only reject from this collection (default: pending, then approved)
    #[arg(long, value_enum)]
    pub from: Option<RejectSource>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl RejectArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        if self.reason.trim().is_empty() {
            miette::bail!("A rejection requires a non-empty reason (-r)");
        }

        let mut engine = open_engine(global)?;
        let keys = super::resolve_keys(&engine, &self.keys, self.yes || self.dry_run)?;

        println!("Rejecting {} submission(s)...", keys.len());
        println!("Reason: {}", self.reason.trim());
        super::print_plan(&engine, &keys);

        if self.dry_run {
            println!("\nNo changes made (dry run).");
            return Ok(());
        }
        if !super::confirm(self.yes)? {
            return Ok(());
        }

        let mut failed = 0;
        for key in &keys {
            let result = match self.from {
                Some(from) => engine.reject_from(Status::from(from), key, &self.reason),
                None => engine.reject(key, &self.reason),
            };
            match result {
                Ok(sub) => println!(
                    "{} Rejected {} {}",
                    style("✓").green(),
                    style(&sub.key_id).cyan(),
                    sub.title()
                ),
                Err(e) => {
                    failed += 1;
                    eprintln!("{} {}", style("✗").red(), e);
                }
            }
        }

        super::finish(failed, keys.len(), "rejected")
    }
}
