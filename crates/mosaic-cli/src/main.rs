mod commands;
mod rawsource;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mosaic", about = "Tile-mosaic registration and global positioning")]
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
    /// Register a tile directory and write absolute positions
    Stitch(commands::stitch::StitchArgs),
    /// Show the tile grid and effective configuration
    Info(commands::info::InfoArgs),
    /// Print per-tile overlap geometry from a positions YAML document
    Overlaps(commands::overlaps::OverlapsArgs),
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
        Commands::Stitch(args) => commands::stitch::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Overlaps(args) => commands::overlaps::run(args),
    }
}
