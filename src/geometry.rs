//! Index <-> physical-world mapping of a volume.
//!
//! A voxel at fractional index `(slice, row, col)` maps to
//!
//! ```text
//! world = origin + row * spacing.row * dir_row
//!                + col * spacing.col * dir_col
//!                + slice * spacing.slice * dir_slice
//! ```
//!
//! The three spacing-scaled directions form the columns of a 3x3 matrix
//! which is inverted once when the [`Geometry`] is built, so both
//! directions of the mapping are plain matrix products.

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VolumeError};

/// Physical size of one voxel along the row, column and slice axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub row: f64,
    pub col: f64,
    pub slice: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl Spacing {
    pub const fn new(row: f64, col: f64, slice: f64) -> Self {
        Self { row, col, slice }
    }

    pub fn in_plane(&self) -> PixelSpacing {
        PixelSpacing {
            row: self.row,
            col: self.col,
        }
    }

    fn validate(&self) -> Result<()> {
        let values = [self.row, self.col, self.slice];
        if values.iter().all(|v| v.is_finite() && *v > 0.0) {
            Ok(())
        } else {
            Err(VolumeError::InvalidSpacing(values))
        }
    }
}

/// In-plane pixel size of a 2-D slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpacing {
    pub row: f64,
    pub col: f64,
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self { row: 1.0, col: 1.0 }
    }
}

/// World directions of the row and column index axes, and optionally of
/// the slice axis. Without an explicit slice direction the right-handed
/// `row x col` is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionCosines {
    pub row: Vector3<f64>,
    pub col: Vector3<f64>,
    #[serde(default)]
    pub slice: Option<Vector3<f64>>,
}

impl Default for DirectionCosines {
    fn default() -> Self {
        Self {
            row: Vector3::x(),
            col: Vector3::y(),
            slice: None,
        }
    }
}

impl DirectionCosines {
    pub fn new(row: Vector3<f64>, col: Vector3<f64>) -> Self {
        Self {
            row,
            col,
            slice: None,
        }
    }

    pub fn with_slice(mut self, slice: Vector3<f64>) -> Self {
        self.slice = Some(slice);
        self
    }

    /// Normalized (row, col, slice) directions.
    pub fn resolve(&self) -> Result<[Vector3<f64>; 3]> {
        let slice = self.slice.unwrap_or_else(|| self.row.cross(&self.col));
        let mut out = [self.row, self.col, slice];
        for dir in &mut out {
            *dir = dir
                .try_normalize(f64::EPSILON)
                .ok_or(VolumeError::DegenerateOrientation)?;
        }
        Ok(out)
    }
}

/// Fractional voxel position, not clamped to the volume bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelCoordinate {
    pub slice: f64,
    pub row: f64,
    pub col: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    spacing: Spacing,
    origin: Point3<f64>,
    directions: DirectionCosines,
    index_to_world: Matrix3<f64>,
    world_to_index: Matrix3<f64>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            spacing: Spacing::default(),
            origin: Point3::origin(),
            directions: DirectionCosines::default(),
            index_to_world: Matrix3::identity(),
            world_to_index: Matrix3::identity(),
        }
    }
}

impl Geometry {
    pub fn new(
        spacing: Spacing,
        origin: Point3<f64>,
        directions: DirectionCosines,
    ) -> Result<Self> {
        spacing.validate()?;
        let [row_dir, col_dir, slice_dir] = directions.resolve()?;

        let index_to_world = Matrix3::from_columns(&[
            row_dir * spacing.row,
            col_dir * spacing.col,
            slice_dir * spacing.slice,
        ]);
        let world_to_index = index_to_world
            .try_inverse()
            .ok_or(VolumeError::DegenerateOrientation)?;

        Ok(Self {
            spacing,
            origin,
            directions,
            index_to_world,
            world_to_index,
        })
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn directions(&self) -> DirectionCosines {
        self.directions
    }

    /// Physical position of a (possibly fractional) voxel index.
    pub fn index_to_world(&self, slice: f64, row: f64, col: f64) -> Point3<f64> {
        self.origin + self.index_to_world * Vector3::new(row, col, slice)
    }

    /// Exact inverse of [`Geometry::index_to_world`].
    pub fn world_to_index(&self, world: &Point3<f64>) -> VoxelCoordinate {
        let index = self.world_to_index * (*world - self.origin);
        VoxelCoordinate {
            row: index.x,
            col: index.y,
            slice: index.z,
        }
    }
}
