mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "printcrop", about = "Crop photos to exact print sizes")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the crop and write it as PNG or JPEG
    Export(commands::export::ExportArgs),
    /// Render the full canvas with the crop overlay
    Preview(commands::preview::PreviewArgs),
    /// Print or save the default configuration as TOML
    Config(commands::config::ConfigArgs),
    /// List named crop presets
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Export(args) => commands::export::run(args),
        Commands::Preview(args) => commands::preview::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Presets => commands::config::list_presets(),
    }
}
