use clap::Parser;
use miette::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use institrack::cli::commands::{completions, import, init, sub, validate};
use institrack::cli::{Cli, Commands, GlobalOpts};
use institrack::core::Config;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "INSTITRACK_LOG";

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let config = Config::load();
    init_tracing(&cli.global, &config);

    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let global = cli.global;
    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Sub(cmd) => sub::run(cmd, &global),
        Commands::Approve(args) => args.run(&global),
        Commands::Reject(args) => args.run(&global),
        Commands::Resubmit(args) => args.run(&global),
        Commands::Validate(args) => validate::run(args, &global),
        Commands::Import(args) => import::run(args, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Log to stderr; `INSTITRACK_LOG` wins over flags, flags over config
fn init_tracing(global: &GlobalOpts, config: &Config) {
    let level = if global.quiet {
        "error".to_string()
    } else {
        match global.verbose {
            0 => config.log_level.clone().unwrap_or_else(|| "warn".to_string()),
            1 => "info".to_string(),
            _ => "debug".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}
