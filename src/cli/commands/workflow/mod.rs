//! Workflow commands - moving submissions between collections

pub mod approve;
pub mod reject;
pub mod resubmit;

pub use approve::ApproveArgs;
pub use reject::RejectArgs;
pub use resubmit::ResubmitArgs;

use console::style;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::helpers::{collect_key_args, format_short_id, resolve_key};
use crate::core::identity::KeyId;
use crate::core::store::RecordStore;
use crate::core::workflow::WorkflowEngine;

/// Resolve key arguments (or `-` for stdin) to full keys
fn resolve_keys<S: RecordStore>(
    engine: &WorkflowEngine<S>,
    args: &[String],
    yes: bool,
) -> Result<Vec<KeyId>> {
    let from_stdin = args.len() == 1 && args[0] == "-";
    if from_stdin && !yes {
        bail!("--yes is required when reading keys from stdin");
    }

    let keys = collect_key_args(args)?
        .iter()
        .map(|arg| resolve_key(engine, arg))
        .collect::<Result<Vec<_>>>()?;
    if keys.is_empty() {
        bail!("No submissions given");
    }
    Ok(keys)
}

/// Print the planned keys with their titles
fn print_plan<S: RecordStore>(engine: &WorkflowEngine<S>, keys: &[KeyId]) {
    for key in keys {
        match engine.find(key) {
            Ok(Some((status, sub))) => println!(
                "  {}  {}  {}",
                style(format_short_id(key)).cyan(),
                sub.title(),
                style(format!("({})", status)).dim()
            ),
            _ => println!("  {}  {}", style(format_short_id(key)).cyan(), style("(not visible)").dim()),
        }
    }
}

/// Ask before changing anything unless `yes`
fn confirm(yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("Proceed? [y/N] ");
    std::io::Write::flush(&mut std::io::stdout()).into_diagnostic()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).into_diagnostic()?;
    if !input.trim().eq_ignore_ascii_case("y") {
        println!("Aborted.");
        return Ok(false);
    }
    Ok(true)
}

/// Fail the command if any key failed
fn finish(failed: usize, total: usize, verb: &str) -> Result<()> {
    if failed > 0 {
        bail!("{} of {} submission(s) could not be {}", failed, total, verb);
    }
    Ok(())
}
