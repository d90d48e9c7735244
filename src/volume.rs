use crate::enums::Orientation;
use crate::error::{Result, VolumeError};
use crate::geometry::{DirectionCosines, Geometry, Spacing, VoxelCoordinate};
use crate::slice::Slice2D;

use nalgebra::Point3;
use ndarray::{Array3, ArrayView2, Axis};

/// Scalar volume stored slice-major: `data[[slice, row, col]]`, which in
/// memory is `slice * rows * cols + row * cols + col`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeData {
    data: Array3<f32>,
    geometry: Geometry,
}

impl VolumeData {
    /// Builds a volume from a flat voxel buffer of length `rows * cols * slices`.
    pub fn new(rows: usize, cols: usize, slices: usize, voxels: Vec<f32>) -> Result<Self> {
        check_dimensions(rows, cols, slices)?;
        let actual = voxels.len();
        let data = Array3::from_shape_vec((slices, rows, cols), voxels).map_err(|_| {
            VolumeError::ShapeMismatch {
                expected: rows.saturating_mul(cols).saturating_mul(slices),
                actual,
            }
        })?;
        Ok(Self {
            data,
            geometry: Geometry::default(),
        })
    }

    /// Builds a volume from an array shaped (slices, rows, cols).
    pub fn from_array(data: Array3<f32>) -> Result<Self> {
        let (slices, rows, cols) = data.dim();
        check_dimensions(rows, cols, slices)?;
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self {
            data,
            geometry: Geometry::default(),
        })
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_spacing(self, spacing: Spacing) -> Result<Self> {
        let geometry = Geometry::new(spacing, self.geometry.origin(), self.geometry.directions())?;
        Ok(self.with_geometry(geometry))
    }

    pub fn with_origin(self, origin: Point3<f64>) -> Result<Self> {
        let geometry = Geometry::new(self.geometry.spacing(), origin, self.geometry.directions())?;
        Ok(self.with_geometry(geometry))
    }

    pub fn with_directions(self, directions: DirectionCosines) -> Result<Self> {
        let geometry = Geometry::new(self.geometry.spacing(), self.geometry.origin(), directions)?;
        Ok(self.with_geometry(geometry))
    }

    /// Get the dimensions of the volume (slices, rows, cols)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn rows(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn cols(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn slices(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Voxels in storage order.
    pub fn voxels(&self) -> &[f32] {
        self.data
            .as_slice()
            .expect("volume data is kept in standard layout")
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn spacing(&self) -> Spacing {
        self.geometry.spacing()
    }

    /// Bounds-checked voxel lookup.
    pub fn get_voxel(&self, slice: usize, row: usize, col: usize) -> Result<f32> {
        check_index("slice", slice, self.slices())?;
        check_index("row", row, self.rows())?;
        check_index("column", col, self.cols())?;
        Ok(self.data[[slice, row, col]])
    }

    pub fn index_to_world(&self, slice: f64, row: f64, col: f64) -> Point3<f64> {
        self.geometry.index_to_world(slice, row, col)
    }

    pub fn world_to_index(&self, world: &Point3<f64>) -> VoxelCoordinate {
        self.geometry.world_to_index(world)
    }

    /// Borrowed view of one orthogonal plane, shaped (height, width).
    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Result<ArrayView2<'_, f32>> {
        plane_view(&self.data, index, orientation)
    }

    pub fn extract_slice(&self, orientation: Orientation, index: usize) -> Result<Slice2D<f32>> {
        let plane = self.get_slice_from_axis(index, orientation)?;
        Ok(Slice2D::from_array(plane.to_owned()))
    }

    /// `width = cols`, `height = rows`.
    pub fn extract_axial_slice(&self, slice: usize) -> Result<Slice2D<f32>> {
        self.extract_slice(Orientation::Axial, slice)
    }

    /// `width = slices`, `height = rows`.
    pub fn extract_sagittal_slice(&self, col: usize) -> Result<Slice2D<f32>> {
        self.extract_slice(Orientation::Sagittal, col)
    }

    /// `width = cols`, `height = slices`.
    pub fn extract_coronal_slice(&self, row: usize) -> Result<Slice2D<f32>> {
        self.extract_slice(Orientation::Coronal, row)
    }
}

/// Plane of a (slices, rows, cols) array as a (height, width) view.
///
/// Axial planes are (rows, cols), coronal planes (slices, cols) and
/// sagittal planes (rows, slices).
pub(crate) fn plane_view<T>(
    data: &Array3<T>,
    index: usize,
    orientation: Orientation,
) -> Result<ArrayView2<'_, T>> {
    let axis = orientation.normal_axis();
    check_index(orientation.index_name(), index, data.len_of(axis))?;
    let plane = data.index_axis(axis, index);
    Ok(match orientation {
        Orientation::Sagittal => plane.reversed_axes(),
        Orientation::Axial | Orientation::Coronal => plane,
    })
}

pub(crate) fn check_index(axis: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(VolumeError::IndexOutOfRange { axis, index, len })
    }
}

pub(crate) fn check_dimensions(rows: usize, cols: usize, slices: usize) -> Result<()> {
    if rows == 0 || cols == 0 || slices == 0 {
        return Err(VolumeError::InvalidDimensions { rows, cols, slices });
    }
    Ok(())
}
