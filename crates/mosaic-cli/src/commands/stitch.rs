use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use mosaic_core::persist::{AbsolutePositionRecord, PersistedDocument, XcorrOptions, XcorrRecord};
use mosaic_core::pipeline::{run_pipeline_reported, PipelineStage, ProgressReporter};
use mosaic_core::StitchConfig;

use crate::rawsource;
use crate::summary;

#[derive(Args)]
pub struct StitchArgs {
    /// Directory of tile files to register.
    pub dir: PathBuf,

    /// Pipeline config file (TOML). Defaults built in otherwise.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to read/write the xcorr/absolute-positions YAML document.
    #[arg(long)]
    pub yaml: Option<PathBuf>,
}

struct CliProgress {
    bar: ProgressBar,
}

impl ProgressReporter for CliProgress {
    fn begin_stage(&self, stage: PipelineStage, total: usize) {
        self.bar.set_length(total.max(1) as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, _stage: PipelineStage, delta: usize) {
        self.bar.inc(delta as u64);
    }

    fn finish_stage(&self, stage: PipelineStage) {
        self.bar.set_message(format!("{stage} done"));
    }
}

pub fn run(args: &StitchArgs) -> Result<()> {
    let cfg: StitchConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text).context("invalid pipeline config")?
        }
        None => StitchConfig::default(),
    };
    let yaml_path = args.yaml.clone().unwrap_or_else(|| args.dir.join("xcorr.yml"));

    summary::print_stitch_summary(&args.dir, &yaml_path, &cfg);

    if yaml_path.exists() {
        if let Ok(doc) = PersistedDocument::load(&yaml_path) {
            if doc.absolute_positions.is_some() {
                println!("absolute positions already present, skipping registration and global optimization");
                return Ok(());
            }
        }
    }

    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:28} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let progress = CliProgress { bar: bar.clone() };
    let cancel = AtomicBool::new(false);

    let output = run_pipeline_reported(&args.dir, &cfg, &rawsource::open, &progress, &cancel)
        .context("stitching pipeline failed")?;
    bar.finish_with_message("done");

    let xcorr: Vec<XcorrRecord> = output.pairs.iter().map(XcorrRecord::from).collect();
    let absolute_positions: Vec<AbsolutePositionRecord> = output
        .grid
        .tiles()
        .iter()
        .filter_map(AbsolutePositionRecord::from_tile)
        .collect();
    let doc = PersistedDocument {
        xcorr_options: XcorrOptions {
            ascending_tiles_x: cfg.ascending_tiles_x,
            ascending_tiles_y: cfg.ascending_tiles_y,
        },
        xcorr,
        absolute_positions: Some(absolute_positions),
    };
    doc.save(&yaml_path)?;

    println!("\n{} tiles, {} pairs measured", output.grid.len(), output.pairs.len());
    println!("positions written to {}", yaml_path.display());

    Ok(())
}
