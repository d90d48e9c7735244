use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("Volume dimensions must be positive, got {rows}x{cols}x{slices}")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        slices: usize,
    },

    #[error("Buffer length {actual} does not match expected length {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Voxel spacing must be finite and positive: {0:?}")]
    InvalidSpacing([f64; 3]),

    #[error("Direction cosines do not span 3-D space")]
    DegenerateOrientation,

    #[error("Resample target {width}x{height} must be at least 1x1")]
    InvalidResampleSize { width: usize, height: usize },

    #[error("Histogram needs at least one bin")]
    InvalidBinCount,

    #[error("Zoom must be finite and positive, got {0}")]
    InvalidZoom(f64),

    #[error(
        "Crop {height}x{width} at ({start_row}, {start_col}) exceeds slice {slice_height}x{slice_width}"
    )]
    CropOutOfBounds {
        start_row: usize,
        start_col: usize,
        height: usize,
        width: usize,
        slice_height: usize,
        slice_width: usize,
    },

    #[error("Label {label} does not fit the label buffer (max {max})")]
    LabelOutOfRange { label: u32, max: u32 },

    #[error("Slab {start}..{start}+{thickness} is empty or exceeds axis length {len}")]
    InvalidSlab {
        start: usize,
        thickness: usize,
        len: usize,
    },

    #[error("No frames to assemble")]
    NoFrames,

    #[error("Inconsistent frame dimensions")]
    InconsistentDimensions,

    #[error("Unknown VOI preset '{0}'")]
    UnknownPreset(String),
}

pub type Result<T> = std::result::Result<T, VolumeError>;
