//! Intensity projections (MIP / MinIP / AIP).
//!
//! A projection reduces every ray running along the normal of a plane to a
//! single value. The output has the shape of that plane, i.e. axial
//! projections are `rows x cols` like an axial slice.

use ndarray::{ArrayView1, Slice, Zip};
use tracing::debug;

use crate::enums::{Orientation, Projection};
use crate::error::{Result, VolumeError};
use crate::slice::Slice2D;
use crate::volume::VolumeData;

/// Maximum across all slices, `width = cols`, `height = rows`.
pub fn compute_mip(volume: &VolumeData) -> Slice2D<f32> {
    compute_projection(volume, Orientation::Axial, Projection::Maximum)
}

/// Minimum across all slices.
pub fn compute_min_ip(volume: &VolumeData) -> Slice2D<f32> {
    compute_projection(volume, Orientation::Axial, Projection::Minimum)
}

/// Arithmetic mean across all slices.
pub fn compute_aip(volume: &VolumeData) -> Slice2D<f32> {
    compute_projection(volume, Orientation::Axial, Projection::Average)
}

/// Projects the whole volume onto the plane of `orientation`.
pub fn compute_projection(
    volume: &VolumeData,
    orientation: Orientation,
    projection: Projection,
) -> Slice2D<f32> {
    let len = volume.data().len_of(orientation.normal_axis());
    reduce_slab(volume, orientation, projection, 0, len)
}

/// Projects `thickness` consecutive planes starting at `start`.
///
/// # Errors
///
/// Returns [`VolumeError::InvalidSlab`] if the slab is empty or runs past
/// the end of the axis.
pub fn compute_slab_projection(
    volume: &VolumeData,
    orientation: Orientation,
    projection: Projection,
    start: usize,
    thickness: usize,
) -> Result<Slice2D<f32>> {
    let len = volume.data().len_of(orientation.normal_axis());
    let fits = start.checked_add(thickness).is_some_and(|end| end <= len);
    if thickness == 0 || !fits {
        return Err(VolumeError::InvalidSlab {
            start,
            thickness,
            len,
        });
    }
    Ok(reduce_slab(volume, orientation, projection, start, thickness))
}

fn reduce_slab(
    volume: &VolumeData,
    orientation: Orientation,
    projection: Projection,
    start: usize,
    thickness: usize,
) -> Slice2D<f32> {
    let axis = orientation.normal_axis();
    let slab = volume
        .data()
        .slice_axis(axis, Slice::from(start..start + thickness));

    let reduced = Zip::from(slab.lanes(axis)).par_map_collect(|ray| reduce_ray(ray, projection));
    let reduced = match orientation {
        Orientation::Sagittal => reduced.reversed_axes(),
        Orientation::Axial | Orientation::Coronal => reduced,
    };

    debug!(
        ?projection,
        ?orientation,
        start,
        thickness,
        width = reduced.ncols(),
        height = reduced.nrows(),
        "Computed intensity projection"
    );

    Slice2D::from_array(reduced)
}

#[inline]
fn reduce_ray(ray: ArrayView1<'_, f32>, projection: Projection) -> f32 {
    match projection {
        Projection::Maximum => ray.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v)),
        Projection::Minimum => ray.fold(f32::INFINITY, |acc, &v| acc.min(v)),
        Projection::Average => {
            let sum: f64 = ray.iter().map(|&v| f64::from(v)).sum();
            (sum / ray.len() as f64) as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;
    use proptest::prelude::*;

    fn cube() -> VolumeData {
        VolumeData::new(2, 2, 2, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]).unwrap()
    }

    #[test]
    fn test_mip_of_cube() {
        let mip = compute_mip(&cube());
        assert_eq!(mip.width(), 2);
        assert_eq!(mip.height(), 2);
        assert_eq!(mip.get(0, 0), Some(&40.0));
        assert_eq!(mip.as_slice(), &[40.0, 50.0, 60.0, 70.0]);
    }

    #[test]
    fn test_min_ip_and_aip_of_cube() {
        let volume = cube();
        assert_eq!(compute_min_ip(&volume).as_slice(), &[0.0, 10.0, 20.0, 30.0]);
        assert_eq!(compute_aip(&volume).as_slice(), &[20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_single_slice_projections_equal_the_slice() {
        let volume = VolumeData::new(2, 3, 1, vec![-5.0, 0.5, 2.0, 7.0, 1e3, -1e3]).unwrap();
        let slice = volume.extract_axial_slice(0).unwrap();
        assert_eq!(compute_mip(&volume), slice);
        assert_eq!(compute_min_ip(&volume), slice);
        assert_eq!(compute_aip(&volume), slice);
    }

    #[test]
    fn test_projection_along_other_axes() {
        // value = slice * 100 + row * 10 + col
        let data = Array3::from_shape_fn((3, 2, 4), |(s, r, c)| (100 * s + 10 * r + c) as f32);
        let volume = VolumeData::from_array(data).unwrap();

        let coronal = compute_projection(&volume, Orientation::Coronal, Projection::Maximum);
        assert_eq!((coronal.width(), coronal.height()), (4, 3));
        assert_eq!(coronal.get(2, 3), Some(&213.0));

        let sagittal = compute_projection(&volume, Orientation::Sagittal, Projection::Minimum);
        assert_eq!((sagittal.width(), sagittal.height()), (3, 2));
        assert_eq!(sagittal.get(1, 2), Some(&210.0));
    }

    #[test]
    fn test_slab_projection() {
        let data = Array3::from_shape_fn((4, 1, 1), |(s, _, _)| s as f32);
        let volume = VolumeData::from_array(data).unwrap();

        let slab = compute_slab_projection(&volume, Orientation::Axial, Projection::Average, 1, 2)
            .unwrap();
        assert_relative_eq!(slab.as_slice()[0], 1.5);

        let slab = compute_slab_projection(&volume, Orientation::Axial, Projection::Maximum, 0, 3)
            .unwrap();
        assert_eq!(slab.as_slice(), &[2.0]);
    }

    #[test]
    fn test_invalid_slab() {
        let volume = cube();
        assert!(matches!(
            compute_slab_projection(&volume, Orientation::Axial, Projection::Maximum, 1, 2),
            Err(VolumeError::InvalidSlab { len: 2, .. })
        ));
        assert!(
            compute_slab_projection(&volume, Orientation::Axial, Projection::Maximum, 0, 0).is_err()
        );
    }

    proptest! {
        #[test]
        fn test_projection_ordering(
            voxels in prop::collection::vec(-2000.0f32..3000.0, 24),
        ) {
            let volume = VolumeData::new(2, 3, 4, voxels).unwrap();
            let mip = compute_mip(&volume);
            let min_ip = compute_min_ip(&volume);
            let aip = compute_aip(&volume);

            for r in 0..2 {
                for c in 0..3 {
                    let (lo, mid, hi) = (
                        min_ip.get(r, c).unwrap(),
                        aip.get(r, c).unwrap(),
                        mip.get(r, c).unwrap(),
                    );
                    prop_assert!(lo <= mid && mid <= hi);
                    for s in 0..4 {
                        let v = volume.get_voxel(s, r, c).unwrap();
                        prop_assert!(*lo <= v && v <= *hi);
                    }
                }
            }
        }
    }
}
