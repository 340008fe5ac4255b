/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum pair count to use pair-level Rayon parallelism in the alignment pool.
pub const PARALLEL_PAIR_THRESHOLD: usize = 2;

/// Small epsilon to avoid division by zero in NCC denominator comparisons.
pub const EPSILON: f64 = 1e-10;

/// Number of independent simulated-annealing islands run concurrently.
pub const SA_ISLAND_COUNT: usize = 8;

/// Default simulated-annealing starting temperature.
pub const DEFAULT_SA_TS: f64 = 10.0;

/// Default simulated-annealing final temperature.
pub const DEFAULT_SA_TF: f64 = 1e-5;

/// Default number of temperature adjustments per SA run.
pub const DEFAULT_SA_N_T_ADJ: usize = 10;

/// Default number of evolution rounds per island.
pub const DEFAULT_SA_EVOLUTION_ROUNDS: usize = 4;

/// Default bound on the Z component of an incremental displacement, in px.
pub const DEFAULT_BOUND_PZ: (f64, f64) = (-10.0, 10.0);

/// Default bound on the "along-overlap" component (Y for south rows, X for
/// the east row) of an incremental displacement, in px.
pub const DEFAULT_BOUND_ALONG_OVERLAP: (f64, f64) = (400.0, 512.0);

/// Default bound on the "lateral" component (X for south rows, Y for the
/// east row) of an incremental displacement, in px.
pub const DEFAULT_BOUND_LATERAL: (f64, f64) = (-30.0, 30.0);
