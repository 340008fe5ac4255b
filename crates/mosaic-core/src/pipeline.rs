//! Orchestrator tying the tile matrix, pair aligner, initial-position
//! estimator, global optimizer, and overlap geometry into one run.
//!
//! Mirrors the shape of `jupiter-core::pipeline::orchestrator`: a
//! `ProgressReporter` trait the CLI drives with `indicatif`, and a plain
//! function from `(directory, config)` to a result — no global mutable
//! state.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::align::{align_pair, AlignParams};
use crate::config::StitchConfig;
use crate::error::{Result, StitchError};
use crate::grid::{ingest, TileGrid};
use crate::initial::estimate_initial_positions;
use crate::optimize::optimize;
use crate::overlap::{overlaps_for, Overlaps};
use crate::pair::Pair;
use crate::persist::{AbsolutePositionRecord, PersistedDocument, XcorrOptions, XcorrRecord};
use crate::source::FrameSource;
use crate::tile::Absolute;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Ingest,
    Align,
    InitialPositions,
    GlobalOptimization,
    OverlapGeometry,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Ingest => "ingest",
            PipelineStage::Align => "pair alignment",
            PipelineStage::InitialPositions => "initial positions",
            PipelineStage::GlobalOptimization => "global optimization",
            PipelineStage::OverlapGeometry => "overlap geometry",
        };
        write!(f, "{s}")
    }
}

/// Progress hooks the CLI drives with `indicatif` progress bars. Every
/// method defaults to a no-op so library callers can ignore progress.
pub trait ProgressReporter: Send + Sync {
    fn begin_stage(&self, _stage: PipelineStage, _total: usize) {}
    fn advance(&self, _stage: PipelineStage, _delta: usize) {}
    fn finish_stage(&self, _stage: PipelineStage) {}
}

/// Default reporter that reports nothing.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Everything a completed run produced.
pub struct PipelineOutput {
    pub grid: TileGrid,
    pub pairs: Vec<Pair>,
}

impl PipelineOutput {
    /// Overlap boxes for every tile, in tile order.
    pub fn overlaps(&self) -> Vec<Overlaps> {
        (0..self.grid.len()).map(|idx| overlaps_for(&self.grid, idx)).collect()
    }
}

/// Run the pipeline with no progress reporting and no cancellation.
pub fn run_pipeline(
    dir: &Path,
    cfg: &StitchConfig,
    open: &(dyn Fn(&Path) -> Result<Box<dyn FrameSource>> + Sync),
) -> Result<PipelineOutput> {
    run_pipeline_reported(dir, cfg, open, &NoOpReporter, &AtomicBool::new(false))
}

/// Run the pipeline, reporting stage progress and honoring `cancel`.
///
/// A cancellation observed mid-alignment aborts the pool; the partial pair
/// table is discarded and an error is returned.
pub fn run_pipeline_reported(
    dir: &Path,
    cfg: &StitchConfig,
    open: &(dyn Fn(&Path) -> Result<Box<dyn FrameSource>> + Sync),
    progress: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<PipelineOutput> {
    progress.begin_stage(PipelineStage::Ingest, 1);
    let mut grid = ingest(dir, cfg.ascending_tiles_x, cfg.ascending_tiles_y, open)?;
    progress.finish_stage(PipelineStage::Ingest);

    let jobs = grid.neighbor_pairs();
    progress.begin_stage(PipelineStage::Align, jobs.len());

    let pairs: Vec<Pair> = jobs
        .into_par_iter()
        .filter_map(|(a_idx, b_idx, axis)| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let a_tile = grid.tile(a_idx);
            let b_tile = grid.tile(b_idx);
            let a_source = open(&a_tile.name).ok()?;
            let b_source = open(&b_tile.name).ok()?;
            let z_frame = cfg.align.z_frame.min(a_tile.nfrms.saturating_sub(1));
            let params = AlignParams {
                z_frame,
                overlap: cfg.align.overlap,
                max_shift_z: cfg.align.max_shift_z,
                max_shift_x: cfg.align.max_shift_x,
            };
            let result = align_pair(
                a_tile.name.clone(),
                b_tile.name.clone(),
                a_source.as_ref(),
                b_source.as_ref(),
                axis,
                &params,
            )
            .ok()
            .flatten();
            progress.advance(PipelineStage::Align, 1);
            result
        })
        .collect();
    progress.finish_stage(PipelineStage::Align);

    if cancel.load(Ordering::Relaxed) {
        return Err(StitchError::Pipeline("cancelled".to_string()));
    }

    progress.begin_stage(PipelineStage::InitialPositions, 1);
    estimate_initial_positions(&mut grid, &pairs);
    progress.finish_stage(PipelineStage::InitialPositions);

    progress.begin_stage(PipelineStage::GlobalOptimization, 1);
    optimize(&mut grid, &pairs, &cfg.optimizer);
    progress.finish_stage(PipelineStage::GlobalOptimization);

    progress.begin_stage(PipelineStage::OverlapGeometry, grid.len());
    progress.finish_stage(PipelineStage::OverlapGeometry);

    Ok(PipelineOutput { grid, pairs })
}

fn apply_persisted_positions(grid: &mut TileGrid, positions: &[AbsolutePositionRecord]) {
    for rec in positions {
        if let Some(idx) = grid.index_by_name(&rec.filename) {
            grid.tile_mut(idx).absolute = Some(Absolute {
                xs: rec.xs,
                ys: rec.ys,
                zs: rec.zs,
            });
        }
    }
}

fn persist_output(output: &PipelineOutput, cfg: &StitchConfig, yaml_path: &Path) -> Result<()> {
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
    doc.save(yaml_path)
}

/// Run the pipeline, or short-circuit registration and global optimization
/// entirely if `yaml_path` already carries `absolute_positions`. Always
/// writes (or rewrites) `yaml_path` with the final result.
pub fn run_or_resume(
    dir: &Path,
    cfg: &StitchConfig,
    open: &(dyn Fn(&Path) -> Result<Box<dyn FrameSource>> + Sync),
    yaml_path: &Path,
) -> Result<PipelineOutput> {
    if yaml_path.exists() {
        let doc = PersistedDocument::load(yaml_path)?;
        if let Some(positions) = &doc.absolute_positions {
            let mut grid = ingest(
                dir,
                doc.xcorr_options.ascending_tiles_x,
                doc.xcorr_options.ascending_tiles_y,
                open,
            )?;
            let pairs: Vec<Pair> = doc.xcorr.iter().filter_map(|r| Pair::try_from(r).ok()).collect();
            apply_persisted_positions(&mut grid, positions);
            return Ok(PipelineOutput { grid, pairs });
        }
    }

    let output = run_pipeline(dir, cfg, open)?;
    persist_output(&output, cfg, yaml_path)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFrameSource;
    use ndarray::Array3;
    use tempfile::tempdir;

    fn opener(_: &Path) -> Result<Box<dyn FrameSource>> {
        let mut data = Array3::<f64>::zeros((5, 60, 60));
        for ((z, y, x), v) in data.indexed_iter_mut() {
            *v = ((z * 17 + y * 3 + x * 5) % 13) as f64;
        }
        Ok(Box::new(MemoryFrameSource::new(data)))
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), []).unwrap();
    }

    #[test]
    fn resume_short_circuits_when_positions_present() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "x_0_y_0_z_0.raw");
        touch(dir.path(), "x_100_y_0_z_0.raw");

        let yaml_path = dir.path().join("xcorr.yml");
        let doc = PersistedDocument {
            xcorr_options: XcorrOptions {
                ascending_tiles_x: true,
                ascending_tiles_y: true,
            },
            xcorr: vec![],
            absolute_positions: Some(vec![
                AbsolutePositionRecord {
                    filename: dir.path().join("x_0_y_0_z_0.raw"),
                    xs: 0,
                    ys: 0,
                    zs: 0,
                    xs_end: 60,
                    ys_end: 60,
                    zs_end: 5,
                },
                AbsolutePositionRecord {
                    filename: dir.path().join("x_100_y_0_z_0.raw"),
                    xs: 45,
                    ys: 0,
                    zs: 0,
                    xs_end: 105,
                    ys_end: 60,
                    zs_end: 5,
                },
            ]),
        };
        doc.save(&yaml_path).unwrap();

        let cfg = StitchConfig::default();
        let output = run_or_resume(dir.path(), &cfg, &opener, &yaml_path).unwrap();

        let idx = output.grid.index_by_name(&dir.path().join("x_100_y_0_z_0.raw")).unwrap();
        assert_eq!(output.grid.tile(idx).absolute.unwrap().xs, 45);
    }

    #[test]
    fn run_or_resume_persists_a_fresh_run() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "x_0_y_0_z_0.raw");
        touch(dir.path(), "x_0_y_40_z_0.raw");

        let yaml_path = dir.path().join("xcorr.yml");
        let mut cfg = StitchConfig::default();
        cfg.align.overlap = 20;
        cfg.align.max_shift_x = 8;
        cfg.align.max_shift_z = 1;
        cfg.align.z_frame = 2;
        cfg.optimizer.islands = 1;
        cfg.optimizer.n_t_adj = 2;
        cfg.optimizer.evolution_rounds = 2;

        run_or_resume(dir.path(), &cfg, &opener, &yaml_path).unwrap();
        assert!(yaml_path.exists());

        let doc = PersistedDocument::load(&yaml_path).unwrap();
        assert!(doc.absolute_positions.is_some());
    }
}
