pub mod info;
pub mod overlaps;
pub mod stitch;
