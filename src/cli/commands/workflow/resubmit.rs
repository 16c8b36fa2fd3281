//! Resubmit command - Revise a rejected submission and return it to pending

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::commands::sub::FieldArgs;
use crate::cli::helpers::{open_engine, resolve_key};

/// Revise a rejected submission and send it back for review
#[derive(Debug, Args)]
pub struct ResubmitArgs {
    /// Submission key (or unique prefix)
    pub key: String,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Remove all courses
    #[arg(long, conflicts_with = "courses")]
    pub courses_clear: bool,
}

impl ResubmitArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let mut engine = open_engine(global)?;
        let key = resolve_key(&engine, &self.key)?;

        let update = self.fields.update()?;
        let courses = self.fields.courses(self.courses_clear)?;

        let sub = engine.resubmit(&key, &update, courses).into_diagnostic()?;
        println!(
            "{} Resubmitted {} {}",
            style("✓").green(),
            style(&sub.key_id).cyan(),
            style(sub.title()).yellow()
        );
        println!("   Awaiting review in {}", style("pending").dim());
        Ok(())
    }
}
