use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mosaic_core::grid::ingest;
use mosaic_core::StitchConfig;

use crate::rawsource;

#[derive(Args)]
pub struct InfoArgs {
    /// Directory of tile files to inspect.
    pub dir: PathBuf,

    /// Pipeline config file (TOML). Defaults built in otherwise.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let cfg: StitchConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text).context("invalid pipeline config")?
        }
        None => StitchConfig::default(),
    };

    let grid = ingest(&args.dir, cfg.ascending_tiles_x, cfg.ascending_tiles_y, &rawsource::open)
        .context("failed to ingest tile directory")?;

    println!("{} tiles, {} rows x {} cols", grid.len(), grid.rows(), grid.cols());
    println!("{} slice(s)", grid.slices().len());
    println!();
    println!("config:");
    println!("{cfg}");
    println!();

    for tile in grid.tiles() {
        println!(
            "{:<40} nominal=({:>5},{:>5},{:>4}) size=({}x{}x{})",
            tile.name.display(),
            tile.nominal.0,
            tile.nominal.1,
            tile.nominal.2,
            tile.xsize,
            tile.ysize,
            tile.nfrms,
        );
    }

    Ok(())
}
