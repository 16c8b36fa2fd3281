//! `institrack init` command - Initialize a new project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let project = Project::init(&cwd, args.force).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized institrack project in {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!("   {}", style(project.config_path().display()).dim());
    println!();
    println!(
        "Submit one with: {}",
        style("institrack sub new --name \"...\"").yellow()
    );
    Ok(())
}
