use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mosaic_core::grid::ingest;
use mosaic_core::overlap::{overlaps_for, OverlapBox};
use mosaic_core::persist::PersistedDocument;
use mosaic_core::tile::Absolute;

use crate::rawsource;

#[derive(Args)]
pub struct OverlapsArgs {
    /// Directory of tile files the positions in `yaml` refer to.
    pub dir: PathBuf,

    /// xcorr/absolute-positions YAML document produced by `mosaic stitch`.
    pub yaml: PathBuf,
}

fn fmt_box(b: OverlapBox) -> String {
    if b == OverlapBox::default() {
        "-".to_string()
    } else {
        format!(
            "z[{},{}) y[{},{}) x[{},{})",
            b.z_from, b.z_to, b.y_from, b.y_to, b.x_from, b.x_to
        )
    }
}

pub fn run(args: &OverlapsArgs) -> Result<()> {
    let doc = PersistedDocument::load(&args.yaml).context("failed to load positions YAML")?;
    let positions = doc
        .absolute_positions
        .as_ref()
        .context("YAML document has no absolute_positions; run `mosaic stitch` first")?;

    let mut grid = ingest(
        &args.dir,
        doc.xcorr_options.ascending_tiles_x,
        doc.xcorr_options.ascending_tiles_y,
        &rawsource::open,
    )
    .context("failed to ingest tile directory")?;

    for rec in positions {
        if let Some(idx) = grid.index_by_name(&rec.filename) {
            grid.tile_mut(idx).absolute = Some(Absolute {
                xs: rec.xs,
                ys: rec.ys,
                zs: rec.zs,
            });
        }
    }

    for idx in 0..grid.len() {
        let tile = grid.tile(idx);
        let ov = overlaps_for(&grid, idx);
        println!("{}", tile.name.display());
        println!("  n : {}", fmt_box(ov.n));
        println!("  s : {}", fmt_box(ov.s));
        println!("  e : {}", fmt_box(ov.e));
        println!("  w : {}", fmt_box(ov.w));
        println!("  ne: {}", fmt_box(ov.ne));
        println!("  nw: {}", fmt_box(ov.nw));
        println!("  se: {}", fmt_box(ov.se));
        println!("  sw: {}", fmt_box(ov.sw));
    }

    Ok(())
}
