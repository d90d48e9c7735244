//! Region statistics and intensity histograms.

use ndarray::Zip;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, VolumeError};
use crate::geometry::PixelSpacing;
use crate::slice::Slice2D;
use crate::volume::VolumeData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RoiStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f32,
    pub max: f32,
    /// `count * spacing.row * spacing.col`
    pub area: f64,
}

/// Summary statistics over every sample of `slice`. An empty slice yields
/// all-zero stats.
pub fn compute_roi_stats(slice: &Slice2D<f32>, spacing: Option<PixelSpacing>) -> RoiStats {
    let values = slice.as_slice();
    if values.is_empty() {
        return RoiStats::default();
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0f64;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += f64::from(v);
    }

    let count = values.len();
    let mean = sum / count as f64;
    let variance_sum: f64 = values
        .iter()
        .map(|&v| {
            let diff = f64::from(v) - mean;
            diff * diff
        })
        .sum();
    let std = (variance_sum / count as f64).sqrt();

    let spacing = spacing.unwrap_or_default();
    RoiStats {
        count,
        mean,
        std,
        min,
        max,
        area: count as f64 * spacing.row * spacing.col,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<u64>,
    /// `bins.len() + 1` edges, `bin_edges[i] = min + i * bin_width`.
    pub bin_edges: Vec<f64>,
    pub min: f32,
    pub max: f32,
    pub bin_width: f64,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }
}

/// Histogram of all finite voxels with `bins` equal-width bins spanning
/// `[min, max]`. Non-finite voxels are skipped, so the total count may be
/// lower than the voxel count. A sample equal to `max` lands in the last
/// bin; a uniform volume puts every voxel in bin 0.
pub fn compute_histogram(volume: &VolumeData, bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(VolumeError::InvalidBinCount);
    }

    let (min, max) = Zip::from(volume.data()).par_fold(
        || (f32::INFINITY, f32::NEG_INFINITY),
        |(lo, hi), &v| {
            if v.is_finite() {
                (lo.min(v), hi.max(v))
            } else {
                (lo, hi)
            }
        },
        |(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)),
    );

    if min > max {
        debug!(voxels = volume.voxels().len(), "No finite voxels to bin");
        return Ok(Histogram {
            bins: vec![0; bins],
            bin_edges: vec![0.0; bins + 1],
            min: 0.0,
            max: 0.0,
            bin_width: 0.0,
        });
    }

    let (lo, hi) = (f64::from(min), f64::from(max));
    let bin_width = (hi - lo) / bins as f64;
    let last = bins - 1;

    let counts = volume
        .voxels()
        .par_iter()
        .fold(
            || vec![0u64; bins],
            |mut counts, &v| {
                if v.is_finite() {
                    let bin = if bin_width > 0.0 {
                        (((f64::from(v) - lo) / bin_width).floor() as usize).min(last)
                    } else {
                        0
                    };
                    counts[bin] += 1;
                }
                counts
            },
        )
        .reduce(
            || vec![0u64; bins],
            |mut a, b| {
                a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
                a
            },
        );

    let mut bin_edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * bin_width).collect();
    bin_edges[bins] = hi;

    let histogram = Histogram {
        bins: counts,
        bin_edges,
        min,
        max,
        bin_width,
    };
    debug!(
        bins,
        min,
        max,
        binned = histogram.total(),
        voxels = volume.voxels().len(),
        "Computed histogram"
    );
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_slice_stats_are_zero() {
        let slice = Slice2D::<f32>::new(0, 0, vec![]).unwrap();
        assert_eq!(compute_roi_stats(&slice, None), RoiStats::default());
    }

    #[test]
    fn test_roi_stats_with_spacing() {
        let slice = Slice2D::new(2, 1, vec![1.0, 2.0]).unwrap();
        let stats = compute_roi_stats(&slice, Some(PixelSpacing { row: 0.5, col: 2.0 }));
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.mean, 1.5);
        assert_relative_eq!(stats.std, 0.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 2.0);
        assert_relative_eq!(stats.area, 2.0);
    }

    #[test]
    fn test_roi_stats_default_spacing() {
        let slice = Slice2D::new(2, 2, vec![-1000.0, 0.0, 40.0, 1000.0]).unwrap();
        let stats = compute_roi_stats(&slice, None);
        assert_relative_eq!(stats.area, 4.0);
        assert_relative_eq!(stats.mean, 10.0);
        assert_eq!(stats.min, -1000.0);
        assert_eq!(stats.max, 1000.0);
    }

    #[test]
    fn test_roi_std_is_stable_for_large_offsets() {
        let slice = Slice2D::new(3, 1, vec![100_000.0, 100_001.0, 100_002.0]).unwrap();
        let stats = compute_roi_stats(&slice, None);
        assert_relative_eq!(stats.std, (2.0f64 / 3.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_histogram_uniform_ramp() {
        let voxels: Vec<f32> = (0..1000).map(|i| (i % 1000) as f32).collect();
        let volume = VolumeData::new(10, 10, 10, voxels).unwrap();
        let histogram = compute_histogram(&volume, 10).unwrap();

        assert_eq!(histogram.min, 0.0);
        assert_eq!(histogram.max, 999.0);
        assert_eq!(histogram.bins.len(), 10);
        assert_eq!(histogram.bin_edges.len(), 11);
        assert_eq!(histogram.bin_edges[0], 0.0);
        assert_eq!(histogram.bin_edges[10], 999.0);
        assert_relative_eq!(histogram.bin_width, 99.9);
        assert_eq!(histogram.total(), 1000);
        for &count in &histogram.bins {
            assert!((99..=101).contains(&count));
        }
    }

    #[test]
    fn test_histogram_max_lands_in_last_bin() {
        let volume = VolumeData::new(1, 2, 1, vec![0.0, 10.0]).unwrap();
        let histogram = compute_histogram(&volume, 4).unwrap();
        assert_eq!(histogram.bins, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_histogram_single_value() {
        let volume = VolumeData::new(5, 5, 5, vec![42.0; 125]).unwrap();
        let histogram = compute_histogram(&volume, 10).unwrap();
        assert_eq!(histogram.min, 42.0);
        assert_eq!(histogram.max, 42.0);
        let non_empty: Vec<_> = histogram.bins.iter().filter(|&&c| c > 0).collect();
        assert_eq!(non_empty, vec![&125]);
        assert!(histogram.bin_edges.iter().all(|&e| e == 42.0));
    }

    #[test]
    fn test_histogram_skips_nan() {
        let volume = VolumeData::new(2, 2, 1, vec![f32::NAN, -5.0, 5.0, 0.0]).unwrap();
        let histogram = compute_histogram(&volume, 2).unwrap();
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.min, -5.0);
        assert_eq!(histogram.bins, vec![1, 2]);
    }

    #[test]
    fn test_histogram_all_nan() {
        let volume = VolumeData::new(1, 2, 1, vec![f32::NAN, f32::NAN]).unwrap();
        let histogram = compute_histogram(&volume, 3).unwrap();
        assert_eq!(histogram.total(), 0);
        assert_eq!(histogram.bins.len(), 3);
    }

    #[test]
    fn test_histogram_zero_bins() {
        let volume = VolumeData::new(1, 1, 1, vec![1.0]).unwrap();
        assert_eq!(compute_histogram(&volume, 0), Err(VolumeError::InvalidBinCount));
    }
}
