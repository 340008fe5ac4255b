use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid tile name {0:?}: matches neither x_/y_/z_ nor <x>_<y>_<z> pattern")]
    InvalidName(std::path::PathBuf),

    #[error("frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("failed to read frame data for {path:?}: {reason}")]
    FrameRead { path: std::path::PathBuf, reason: String },

    #[error("tile grid error: {0}")]
    Grid(String),

    #[error("pipeline error: {0}")]
    Pipeline(String),

    #[error("empty tile table")]
    EmptyTileTable,

    #[error("inconsistent tile size within a slice: {0}")]
    InconsistentTileSize(String),
}

pub type Result<T> = std::result::Result<T, StitchError>;
