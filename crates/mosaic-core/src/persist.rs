//! YAML persistence for pairwise results and absolute positions — the one
//! external interface this crate owns end to end (reading and writing, not
//! just a data contract).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StitchError};
use crate::pair::{Axis, Pair};
use crate::tile::Tile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XcorrOptions {
    pub ascending_tiles_x: bool,
    pub ascending_tiles_y: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XcorrRecord {
    pub aname: PathBuf,
    pub bname: PathBuf,
    pub axis: i64,
    pub dx: i64,
    pub dy: i64,
    pub dz: i64,
    pub score: f64,
}

impl From<&Pair> for XcorrRecord {
    fn from(p: &Pair) -> Self {
        XcorrRecord {
            aname: p.aname.clone(),
            bname: p.bname.clone(),
            axis: p.axis.as_i64(),
            dx: p.dx,
            dy: p.dy,
            dz: p.dz,
            score: p.score,
        }
    }
}

impl TryFrom<&XcorrRecord> for Pair {
    type Error = StitchError;

    fn try_from(r: &XcorrRecord) -> std::result::Result<Self, Self::Error> {
        let axis = Axis::from_i64(r.axis)
            .ok_or_else(|| StitchError::Pipeline(format!("invalid pair axis {}", r.axis)))?;
        Ok(Pair {
            aname: r.aname.clone(),
            bname: r.bname.clone(),
            axis,
            dz: r.dz,
            dy: r.dy,
            dx: r.dx,
            score: r.score,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsolutePositionRecord {
    pub filename: PathBuf,
    #[serde(rename = "Xs")]
    pub xs: i64,
    #[serde(rename = "Ys")]
    pub ys: i64,
    #[serde(rename = "Zs")]
    pub zs: i64,
    #[serde(rename = "Xs_end")]
    pub xs_end: i64,
    #[serde(rename = "Ys_end")]
    pub ys_end: i64,
    #[serde(rename = "Zs_end")]
    pub zs_end: i64,
}

impl AbsolutePositionRecord {
    /// Build a record from a tile whose `absolute` has already been set.
    pub fn from_tile(tile: &Tile) -> Option<Self> {
        let abs = tile.absolute?;
        let end = tile.absolute_end()?;
        Some(AbsolutePositionRecord {
            filename: tile.name.clone(),
            xs: abs.xs,
            ys: abs.ys,
            zs: abs.zs,
            xs_end: end.0,
            ys_end: end.1,
            zs_end: end.2,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDocument {
    #[serde(rename = "xcorr-options")]
    pub xcorr_options: XcorrOptions,
    pub xcorr: Vec<XcorrRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_positions: Option<Vec<AbsolutePositionRecord>>,
}

impl PersistedDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
