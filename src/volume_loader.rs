use crate::{
    enums::SortBy,
    error::{Result, VolumeError},
    geometry::{DirectionCosines, Geometry, Spacing},
    volume::VolumeData,
};

use nalgebra::{Point3, Vector3};
use ndarray::{Array2, Array3, s};
use tracing::{debug, info};

/// One decoded 2-D image of a series, with the metadata needed to place it
/// in the volume. Pixels hold stored values; `rescale_slope` and
/// `rescale_intercept` map them to the output unit (e.g. Hounsfield).
#[derive(Debug, Clone)]
pub struct SliceFrame {
    pub pixels: Array2<f32>,
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
    /// World position of the first pixel.
    pub position: Option<Point3<f64>>,
    pub instance_number: Option<i32>,
    /// (row, col) pixel size.
    pub pixel_spacing: Option<(f64, f64)>,
    pub slice_thickness: Option<f64>,
    pub directions: Option<DirectionCosines>,
}

impl SliceFrame {
    pub fn new(pixels: Array2<f32>) -> Self {
        Self {
            pixels,
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
            position: None,
            instance_number: None,
            pixel_spacing: None,
            slice_thickness: None,
            directions: None,
        }
    }

    pub fn with_rescale(mut self, slope: f64, intercept: f64) -> Self {
        self.rescale_slope = slope;
        self.rescale_intercept = intercept;
        self
    }

    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_instance_number(mut self, instance_number: i32) -> Self {
        self.instance_number = Some(instance_number);
        self
    }

    pub fn with_pixel_spacing(mut self, row: f64, col: f64) -> Self {
        self.pixel_spacing = Some((row, col));
        self
    }

    pub fn with_slice_thickness(mut self, thickness: f64) -> Self {
        self.slice_thickness = Some(thickness);
        self
    }

    pub fn with_directions(mut self, directions: DirectionCosines) -> Self {
        self.directions = Some(directions);
        self
    }
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Stack decoded frames into a volume
    ///
    /// # Arguments
    ///
    /// * `frames` - Frames of one series, in any order
    /// * `sort_by` - Method to sort the slices
    ///
    /// # Errors
    ///
    /// Returns error if there are no frames, frame dimensions differ, or
    /// the derived geometry is invalid
    pub fn from_frames(frames: Vec<SliceFrame>, sort_by: SortBy) -> Result<VolumeData> {
        if frames.is_empty() {
            return Err(VolumeError::NoFrames);
        }

        let directions = frames
            .iter()
            .find_map(|frame| frame.directions)
            .unwrap_or_default();
        let [_, _, normal] = directions.resolve()?;

        let mut frames = frames;
        Self::sort_frames(&mut frames, sort_by, &normal);
        Self::validate_dimensions(&frames)?;

        let volume_array = Self::build_volume_array(&frames);
        let spacing = Self::get_spacing(&frames, &normal);
        let origin = frames[0].position.unwrap_or_else(Point3::origin);
        let geometry = Geometry::new(spacing, origin, directions)?;

        let (slices, rows, cols) = volume_array.dim();
        info!(slices, rows, cols, ?spacing, "Assembled volume from frames");

        Ok(VolumeData::from_array(volume_array)?.with_geometry(geometry))
    }

    fn sort_order(frame: &SliceFrame, sort_by: SortBy, normal: &Vector3<f64>) -> Option<f64> {
        match sort_by {
            SortBy::Position => frame.position.map(|p| p.coords.dot(normal)),
            SortBy::InstanceNumber => frame.instance_number.map(f64::from),
            SortBy::None => Some(0.0),
        }
    }

    fn sort_frames(frames: &mut [SliceFrame], sort_by: SortBy, normal: &Vector3<f64>) {
        if matches!(sort_by, SortBy::None) {
            return;
        }
        // Frames without a sort key keep their relative order after the keyed ones.
        frames.sort_by(|a, b| {
            let a = Self::sort_order(a, sort_by, normal);
            let b = Self::sort_order(b, sort_by, normal);
            match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    fn validate_dimensions(frames: &[SliceFrame]) -> Result<()> {
        let first_dim = frames[0].pixels.dim();
        if frames.iter().any(|frame| frame.pixels.dim() != first_dim) {
            return Err(VolumeError::InconsistentDimensions);
        }
        Ok(())
    }

    fn build_volume_array(frames: &[SliceFrame]) -> Array3<f32> {
        let (height, width) = frames[0].pixels.dim();
        let depth = frames.len();
        let mut volume = Array3::<f32>::zeros((depth, height, width));

        for (i, frame) in frames.iter().enumerate() {
            let (slope, intercept) = (frame.rescale_slope, frame.rescale_intercept);
            volume
                .slice_mut(s![i, .., ..])
                .zip_mut_with(&frame.pixels, |dst, &stored| {
                    *dst = (f64::from(stored) * slope + intercept) as f32;
                });
        }

        volume
    }

    /// In-plane spacing from the first frame that has it. Slice spacing is
    /// the mean distance between consecutive positions along the normal,
    /// falling back to the slice thickness and then to 1.
    fn get_spacing(frames: &[SliceFrame], normal: &Vector3<f64>) -> Spacing {
        let (row, col) = frames
            .iter()
            .find_map(|frame| frame.pixel_spacing)
            .unwrap_or((1.0, 1.0));

        let offsets: Vec<f64> = frames
            .iter()
            .filter_map(|frame| frame.position.map(|p| p.coords.dot(normal)))
            .collect();
        let from_positions = (offsets.len() >= 2)
            .then(|| {
                let total: f64 = offsets.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
                total / (offsets.len() - 1) as f64
            })
            .filter(|spacing| *spacing > 0.0);

        let slice = from_positions
            .or_else(|| frames.iter().find_map(|frame| frame.slice_thickness))
            .unwrap_or(1.0);
        debug!(row, col, slice, "Derived voxel spacing");

        Spacing::new(row, col, slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(value: f32, z: f64) -> SliceFrame {
        SliceFrame::new(Array2::from_elem((2, 3), value))
            .with_position(Point3::new(-10.0, -20.0, z))
            .with_pixel_spacing(0.5, 0.75)
    }

    #[test]
    fn test_frames_sorted_by_position() {
        let frames = vec![frame(2.0, 5.0), frame(0.0, -5.0), frame(1.0, 0.0)];
        let volume = VolumeLoader::from_frames(frames, SortBy::Position).unwrap();

        assert_eq!(volume.dim(), (3, 2, 3));
        assert_eq!(volume.get_voxel(0, 0, 0).unwrap(), 0.0);
        assert_eq!(volume.get_voxel(2, 1, 2).unwrap(), 2.0);
        assert_eq!(volume.spacing(), Spacing::new(0.5, 0.75, 5.0));
        assert_relative_eq!(volume.geometry().origin(), Point3::new(-10.0, -20.0, -5.0));
        assert_relative_eq!(
            volume.index_to_world(2.0, 0.0, 0.0),
            Point3::new(-10.0, -20.0, 5.0)
        );
    }

    #[test]
    fn test_rescale_is_applied() {
        let frames = vec![
            SliceFrame::new(Array2::from_elem((1, 2), 1000.0)).with_rescale(1.0, -1024.0),
            SliceFrame::new(Array2::from_elem((1, 2), 10.0)).with_rescale(2.0, 0.0),
        ];
        let volume = VolumeLoader::from_frames(frames, SortBy::None).unwrap();
        assert_eq!(volume.voxels(), &[-24.0, -24.0, 20.0, 20.0]);
    }

    #[test]
    fn test_sorted_by_instance_number() {
        let frames = vec![
            SliceFrame::new(Array2::from_elem((1, 1), 7.0)).with_instance_number(2),
            SliceFrame::new(Array2::from_elem((1, 1), 3.0)).with_instance_number(1),
        ];
        let volume = VolumeLoader::from_frames(frames, SortBy::InstanceNumber).unwrap();
        assert_eq!(volume.voxels(), &[3.0, 7.0]);
    }

    #[test]
    fn test_slice_thickness_fallback() {
        let frames = vec![
            SliceFrame::new(Array2::zeros((1, 1))).with_slice_thickness(2.5),
            SliceFrame::new(Array2::zeros((1, 1))),
        ];
        let volume = VolumeLoader::from_frames(frames, SortBy::None).unwrap();
        assert_eq!(volume.spacing(), Spacing::new(1.0, 1.0, 2.5));
    }

    #[test]
    fn test_inconsistent_dimensions() {
        let frames = vec![
            SliceFrame::new(Array2::zeros((2, 2))),
            SliceFrame::new(Array2::zeros((2, 3))),
        ];
        assert_eq!(
            VolumeLoader::from_frames(frames, SortBy::None).unwrap_err(),
            VolumeError::InconsistentDimensions
        );
    }

    #[test]
    fn test_no_frames() {
        assert_eq!(
            VolumeLoader::from_frames(vec![], SortBy::Position).unwrap_err(),
            VolumeError::NoFrames
        );
    }
}
