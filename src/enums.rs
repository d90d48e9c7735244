use ndarray::Axis;
use serde::{Deserialize, Serialize};

/// Orthogonal plane of a volume. The index passed alongside it selects a
/// slice (axial), a row (coronal) or a column (sagittal).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    /// Array axis held fixed by this plane, for data laid out as
    /// (slices, rows, cols).
    pub(crate) fn normal_axis(self) -> Axis {
        match self {
            Orientation::Axial => Axis(0),
            Orientation::Coronal => Axis(1),
            Orientation::Sagittal => Axis(2),
        }
    }

    pub(crate) fn index_name(self) -> &'static str {
        match self {
            Orientation::Axial => "slice",
            Orientation::Coronal => "row",
            Orientation::Sagittal => "column",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    // TODO:
    // Bicubic,
}

/// Per-ray reduction used by intensity projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// MIP
    Maximum,
    /// MinIP
    Minimum,
    /// AIP
    Average,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Distance of the frame position along the slice normal.
    #[default]
    Position,
    InstanceNumber,
    None,
}
