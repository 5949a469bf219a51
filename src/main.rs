use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "inkdag")]
#[command(about = "Inkdag - a declarative diagram layout engine")]
#[command(version)]
struct Cli {
    /// Output as JSON for machine consumption
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a diagram document and write the SVG
    Render {
        /// Input JSON document
        input: PathBuf,

        /// Output SVG path (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Layout configuration TOML overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a document and report diagnostics without rendering
    Check {
        /// Input JSON document
        input: PathBuf,

        /// Layout configuration TOML overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report layout statistics (levels, scores, crossings, canvas)
    Stats {
        /// Input JSON document
        input: PathBuf,

        /// Layout configuration TOML overriding the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            input,
            output,
            config,
        } => commands::render::run(&input, output.as_deref(), config.as_deref(), cli.json),
        Commands::Check { input, config } => {
            commands::check::run(&input, config.as_deref(), cli.json)
        }
        Commands::Stats { input, config } => {
            commands::stats::run(&input, config.as_deref(), cli.json)
        }
    }
}
