//! Command-line argument definitions

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::import::ImportArgs;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::sub::SubCommands;
use crate::cli::commands::validate::ValidateArgs;
use crate::cli::commands::workflow::{ApproveArgs, RejectArgs, ResubmitArgs};
use crate::core::store::StoreFormat;
use crate::core::team::Role;

/// Institution submission review pipeline
#[derive(Parser, Debug)]
#[command(name = "institrack", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Act as this role (provider, admin, verifier, super-admin)
    #[arg(long, global = true)]
    pub role: Option<Role>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Directory holding the collections (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Encoding of collection files (yaml or json)
    #[arg(long, global = true)]
    pub store_format: Option<StoreFormat>,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format for list and show commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// TSV for lists, YAML for single records
    #[default]
    Auto,
    Yaml,
    Json,
    Tsv,
    Csv,
    /// Keys only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new project in the current directory
    Init(InitArgs),

    /// Create, list, show and edit submissions
    #[command(subcommand)]
    Sub(SubCommands),

    /// Approve pending submissions
    Approve(ApproveArgs),

    /// Reject pending or approved submissions with a reason
    Reject(RejectArgs),

    /// Revise a rejected submission and send it back for review
    Resubmit(ResubmitArgs),

    /// Check every collection for broken invariants
    Validate(ValidateArgs),

    /// Import a legacy browser-storage dump
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
