//! `institrack import` command - Load a legacy browser-storage dump

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::open_engine;
use crate::core::entity::Status;
use crate::core::legacy::{self, LegacyDump};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// JSON dump with institutionData / approvedData / rejectedData
    pub file: PathBuf,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut engine = open_engine(global)?;
    let dump = LegacyDump::from_file(&args.file).into_diagnostic()?;

    println!(
        "{} Importing {} record(s) from {}",
        style("→").blue(),
        dump.len(),
        args.file.display()
    );

    let report = legacy::import(&mut engine, &dump).into_diagnostic()?;

    for status in Status::ALL {
        println!(
            "  {:<10} {}",
            status,
            style(report.imported_into(status)).cyan()
        );
    }
    for skipped in &report.skipped {
        println!(
            "{} {} #{} {} - {}",
            style("!").yellow(),
            skipped.status,
            skipped.index,
            skipped
                .key_id
                .as_ref()
                .map(|k| k.to_string())
                .unwrap_or_default(),
            skipped.reason
        );
    }

    println!(
        "\n{} Imported {} submission(s), skipped {}",
        style("✓").green(),
        report.imported.len(),
        report.skipped.len()
    );
    Ok(())
}
