//! Registration and global positioning pipeline for regular-grid tile
//! mosaics acquired by a light-sheet or similar volumetric microscope.
//!
//! Reconstructs, for every tile, an integer absolute position such that
//! neighboring tiles align maximally: pairwise displacement estimation via
//! FFT-based normalized cross-correlation, propagation over the tile
//! adjacency graph, global least-squares refinement, and overlap geometry
//! for downstream fusion.

pub mod align;
pub mod config;
pub mod consts;
pub mod error;
pub mod fft;
pub mod grid;
pub mod initial;
pub mod ncc;
pub mod optimize;
pub mod overlap;
pub mod pair;
pub mod persist;
pub mod pipeline;
pub mod source;
pub mod tile;

pub use config::StitchConfig;
pub use error::{Result, StitchError};
pub use pipeline::{run_or_resume, run_pipeline, run_pipeline_reported, PipelineOutput, PipelineStage, ProgressReporter};
