//! Pipeline configuration: serde-derived structs with defaults matching the
//! reference microscope geometry, the same way `jupiter-core`'s
//! `pipeline::config` module exposes `AlignmentConfig`/`StackingConfig`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BOUND_ALONG_OVERLAP, DEFAULT_BOUND_LATERAL, DEFAULT_BOUND_PZ, DEFAULT_SA_EVOLUTION_ROUNDS,
    DEFAULT_SA_N_T_ADJ, DEFAULT_SA_TF, DEFAULT_SA_TS, SA_ISLAND_COUNT,
};

/// Pair-aligner geometry: Z-slab half-width and overlap/border crop sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub overlap: usize,
    pub max_shift_z: usize,
    pub max_shift_x: usize,
    /// Reference Z frame the search window is centered on.
    pub z_frame: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            overlap: 200,
            max_shift_z: 15,
            max_shift_x: 60,
            z_frame: 0,
        }
    }
}

impl fmt::Display for AlignConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overlap={} max_shift_z={} max_shift_x={} z_frame={}",
            self.overlap, self.max_shift_z, self.max_shift_x, self.z_frame
        )
    }
}

/// Global-optimizer bounds and simulated-annealing parameters. The bound
/// defaults assume a tile pitch near 400-512 px, matching the reference
/// microscope geometry; other rigs must override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub islands: usize,
    pub ts: f64,
    pub tf: f64,
    pub n_t_adj: usize,
    pub evolution_rounds: usize,
    pub seed: u64,
    pub bound_pz: (f64, f64),
    pub bound_along_overlap: (f64, f64),
    pub bound_lateral: (f64, f64),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            islands: SA_ISLAND_COUNT,
            ts: DEFAULT_SA_TS,
            tf: DEFAULT_SA_TF,
            n_t_adj: DEFAULT_SA_N_T_ADJ,
            evolution_rounds: DEFAULT_SA_EVOLUTION_ROUNDS,
            seed: 0,
            bound_pz: DEFAULT_BOUND_PZ,
            bound_along_overlap: DEFAULT_BOUND_ALONG_OVERLAP,
            bound_lateral: DEFAULT_BOUND_LATERAL,
        }
    }
}

impl fmt::Display for OptimizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "islands={} Ts={} Tf={} n_T_adj={} evolution_rounds={}",
            self.islands, self.ts, self.tf, self.n_t_adj, self.evolution_rounds
        )
    }
}

/// Top-level configuration for one stitching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    pub ascending_tiles_x: bool,
    pub ascending_tiles_y: bool,
    pub align: AlignConfig,
    pub optimizer: OptimizerConfig,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            ascending_tiles_x: true,
            ascending_tiles_y: true,
            align: AlignConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl fmt::Display for StitchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ascending_tiles_x: {}", self.ascending_tiles_x)?;
        writeln!(f, "ascending_tiles_y: {}", self.ascending_tiles_y)?;
        writeln!(f, "align: {}", self.align)?;
        write!(f, "optimizer: {}", self.optimizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_geometry() {
        let cfg = StitchConfig::default();
        assert_eq!(cfg.optimizer.islands, 8);
        assert_eq!(cfg.optimizer.bound_along_overlap, (400.0, 512.0));
    }

    #[test]
    fn round_trips_through_yaml() {
        let cfg = StitchConfig::default();
        let text = serde_yaml::to_string(&cfg).unwrap();
        let back: StitchConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back.optimizer.islands, cfg.optimizer.islands);
    }
}
