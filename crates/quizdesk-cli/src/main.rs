//! quizdesk CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quizdesk", version, about = "Scenario-driven quiz gradebook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios and write reports
    Run {
        /// Path to a .toml scenario or a directory of scenarios
        #[arg(long)]
        scenario: PathBuf,

        /// Output directory (default: from config, then ./quizdesk-results)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Skip the remaining steps of a scenario after its first failure
        #[arg(long)]
        stop_on_failure: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate scenario TOML files
    Validate {
        /// Path to a scenario file or directory
        #[arg(long)]
        scenario: PathBuf,
    },

    /// Create starter config and example scenario
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizdesk=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            output,
            format,
            stop_on_failure,
            config,
        } => commands::run::execute(scenario, output, format, stop_on_failure, config),
        Commands::Validate { scenario } => commands::validate::execute(scenario),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
