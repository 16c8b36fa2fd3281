//! Approve command - Move pending submissions to approved

use clap::Args;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::open_engine;
use crate::core::team::Action;

/// Approve pending submissions
#[derive(Debug, Args)]
pub struct ApproveArgs {
    /// Submission keys or prefixes (accepts multiple, or - for stdin)
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl ApproveArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let mut engine = open_engine(global)?;
        engine
            .authorize(Action::Approve)
            .map_err(|e| miette::miette!("{}", e))?;

        let keys = super::resolve_keys(&engine, &self.keys, self.yes || self.dry_run)?;

        println!("Approving {} submission(s)...", keys.len());
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
            match engine.approve(key) {
                Ok(sub) => println!(
                    "{} Approved {} {}",
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

        super::finish(failed, keys.len(), "approved")
    }
}
