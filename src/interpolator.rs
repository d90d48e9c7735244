use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::enums::{Interpolation, Orientation};
use crate::error::{Result, VolumeError};
use crate::geometry::Spacing;
use crate::slice::Slice2D;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Volume dimensions (slices, rows, cols) after scaling every axis to
    /// the finest spacing, so one output voxel is a cube.
    pub(crate) fn get_isotropic_dimensions(
        spacing: Spacing,
        original_dim: (usize, usize, usize),
    ) -> (usize, usize, usize) {
        let min_spacing = spacing.row.min(spacing.col).min(spacing.slice);
        let inv_min_spacing = 1.0 / min_spacing;
        let scale = |len: usize, axis_spacing: f64| {
            ((len as f64 * axis_spacing * inv_min_spacing).round() as usize).max(1)
        };

        (
            scale(original_dim.0, spacing.slice),
            scale(original_dim.1, spacing.row),
            scale(original_dim.2, spacing.col),
        )
    }

    /// (width, height) at which a plane displays with its physical aspect.
    pub(crate) fn display_dimensions(
        spacing: Spacing,
        original_dim: (usize, usize, usize),
        orientation: Orientation,
    ) -> (usize, usize) {
        let (slices, rows, cols) = Self::get_isotropic_dimensions(spacing, original_dim);
        match orientation {
            Orientation::Axial => (cols, rows),
            Orientation::Coronal => (cols, slices),
            Orientation::Sagittal => (slices, rows),
        }
    }

    /// Source coordinate of target pixel `t` when `target_len` pixels span
    /// the same extent as `source_len`, with both end pixels aligned.
    #[inline]
    pub(crate) fn source_coordinate(t: usize, source_len: usize, target_len: usize) -> f64 {
        if target_len <= 1 {
            0.0
        } else {
            t as f64 * (source_len - 1) as f64 / (target_len - 1) as f64
        }
    }

    #[inline]
    pub(crate) fn nearest_interpolate(slice: &ArrayView2<f32>, y: f64, x: f64) -> f32 {
        let (height, width) = slice.dim();
        let row = (y.round() as usize).min(height - 1);
        let col = (x.round() as usize).min(width - 1);
        slice[[row, col]]
    }

    /// Blends the four pixels around (`y`, `x`). The result stays within
    /// the range of those four pixels.
    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<f32>, y: f64, x: f64) -> f32 {
        let (height, width) = slice.dim();

        let y0 = (y.floor() as usize).min(height - 1);
        let x0 = (x.floor() as usize).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f64;
        let dx = x - x0 as f64;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = f64::from(slice[[y0, x0]]);
        let v01 = f64::from(slice[[y0, x1]]);
        let v10 = f64::from(slice[[y1, x0]]);
        let v11 = f64::from(slice[[y1, x1]]);

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);
        let value = v0.mul_add(one_minus_dy, v1 * dy);

        if value.is_nan() {
            return f32::NAN;
        }
        let lo = v00.min(v01).min(v10).min(v11);
        let hi = v00.max(v01).max(v10).max(v11);
        value.max(lo).min(hi) as f32
    }
}

/// Resamples `slice` to `target_width x target_height`.
///
/// Target pixel `(tx, ty)` reads source position
/// `(tx * (w - 1) / (tw - 1), ty * (h - 1) / (th - 1))`, so the corner
/// pixels of source and target coincide. A 1-pixel target axis reads
/// source coordinate 0.
///
/// # Errors
///
/// Returns [`VolumeError::InvalidResampleSize`] for an empty target, or
/// when the source slice itself is empty.
pub fn resample_slice(
    slice: &Slice2D<f32>,
    target_width: usize,
    target_height: usize,
    interpolation: Interpolation,
) -> Result<Slice2D<f32>> {
    if target_width == 0 || target_height == 0 || slice.is_empty() {
        return Err(VolumeError::InvalidResampleSize {
            width: target_width,
            height: target_height,
        });
    }

    let source = slice.view();
    let (src_height, src_width) = source.dim();

    let pixel_data: Vec<f32> = (0..target_height)
        .into_par_iter()
        .flat_map_iter(|ty| {
            let sy = Interpolator::source_coordinate(ty, src_height, target_height);
            let source = &source;
            (0..target_width).map(move |tx| {
                let sx = Interpolator::source_coordinate(tx, src_width, target_width);
                match interpolation {
                    Interpolation::Nearest => Interpolator::nearest_interpolate(source, sy, sx),
                    Interpolation::Bilinear => Interpolator::bilinear_interpolate(source, sy, sx),
                }
            })
        })
        .collect();

    Slice2D::new(target_width, target_height, pixel_data)
}
