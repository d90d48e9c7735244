//! Threshold segmentation into label volumes.
//!
//! Rules are a priority list: for every voxel the first rule whose
//! predicate holds assigns its label, and voxels matching no rule get 0.
//! Order rules from the most specific to the broadest, e.g.
//! `[(2, v >= 300), (1, v > 30)]` for bone over soft tissue.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use ndarray::{Array3, ArrayViewMut3, Zip};
use rayon::prelude::*;
use tracing::debug;

use crate::enums::Orientation;
use crate::error::{Result, VolumeError};
use crate::slice::Slice2D;
use crate::volume::{VolumeData, check_dimensions, plane_view};

/// Unsigned integer type a label buffer can be stored as.
pub trait LabelValue:
    Copy + Default + Eq + Ord + Hash + Send + Sync + Into<u32> + TryFrom<u32> + 'static
{
    const MAX_LABEL: u32;
}

impl LabelValue for u8 {
    const MAX_LABEL: u32 = u8::MAX as u32;
}

impl LabelValue for u16 {
    const MAX_LABEL: u32 = u16::MAX as u32;
}

impl LabelValue for u32 {
    const MAX_LABEL: u32 = u32::MAX;
}

/// Per-voxel labels with the same (slices, rows, cols) layout as the
/// volume they were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume<L = u8> {
    labels: Array3<L>,
}

impl<L: LabelValue> LabelVolume<L> {
    pub fn new(rows: usize, cols: usize, slices: usize, labels: Vec<L>) -> Result<Self> {
        check_dimensions(rows, cols, slices)?;
        let actual = labels.len();
        let labels = Array3::from_shape_vec((slices, rows, cols), labels).map_err(|_| {
            VolumeError::ShapeMismatch {
                expected: rows.saturating_mul(cols).saturating_mul(slices),
                actual,
            }
        })?;
        Ok(Self { labels })
    }

    pub fn rows(&self) -> usize {
        self.labels.dim().1
    }

    pub fn cols(&self) -> usize {
        self.labels.dim().2
    }

    pub fn slices(&self) -> usize {
        self.labels.dim().0
    }

    pub fn labels(&self) -> &Array3<L> {
        &self.labels
    }

    pub fn into_vec(self) -> Vec<L> {
        self.labels.into_raw_vec_and_offset().0
    }
}

pub struct ThresholdRule {
    pub label: u32,
    predicate: Box<dyn Fn(f32) -> bool + Send + Sync>,
}

impl ThresholdRule {
    pub fn new(label: u32, predicate: impl Fn(f32) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label,
            predicate: Box::new(predicate),
        }
    }

    /// `value >= threshold`
    pub fn at_least(label: u32, threshold: f32) -> Self {
        Self::new(label, move |v| v >= threshold)
    }

    /// `value > threshold`
    pub fn above(label: u32, threshold: f32) -> Self {
        Self::new(label, move |v| v > threshold)
    }

    /// `lower <= value < upper`
    pub fn between(label: u32, lower: f32, upper: f32) -> Self {
        Self::new(label, move |v| lower <= v && v < upper)
    }

    #[inline]
    pub fn matches(&self, value: f32) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for ThresholdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThresholdRule")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Labels every voxel of `volume` into a freshly allocated buffer.
pub fn build_threshold_label_map<L: LabelValue>(
    volume: &VolumeData,
    rules: &[ThresholdRule],
) -> Result<LabelVolume<L>> {
    let mut target = vec![L::default(); volume.voxels().len()];
    build_threshold_label_map_into(volume, rules, &mut target)?;
    let (slices, rows, cols) = volume.dim();
    LabelVolume::new(rows, cols, slices, target)
}

/// Labels every voxel of `volume` in place into the caller's `target`
/// buffer, laid out like the volume's voxels.
///
/// # Errors
///
/// Fails with [`VolumeError::ShapeMismatch`] if `target` does not hold
/// exactly one entry per voxel, or [`VolumeError::LabelOutOfRange`] if a
/// rule label does not fit `L`. Both checks run before anything is written,
/// so `target` is untouched on error.
pub fn build_threshold_label_map_into<L: LabelValue>(
    volume: &VolumeData,
    rules: &[ThresholdRule],
    target: &mut [L],
) -> Result<()> {
    let expected = volume.voxels().len();
    let actual = target.len();
    let target = ArrayViewMut3::from_shape(volume.dim(), target)
        .map_err(|_| VolumeError::ShapeMismatch { expected, actual })?;

    let labels: Vec<L> = rules
        .iter()
        .map(|rule| {
            L::try_from(rule.label).map_err(|_| VolumeError::LabelOutOfRange {
                label: rule.label,
                max: L::MAX_LABEL,
            })
        })
        .collect::<Result<_>>()?;

    Zip::from(target)
        .and(volume.data())
        .par_for_each(|label, &value| {
            *label = rules
                .iter()
                .position(|rule| rule.matches(value))
                .map_or_else(L::default, |i| labels[i]);
        });

    debug!(rules = rules.len(), voxels = expected, "Built threshold label map");
    Ok(())
}

/// Number of voxels carrying each label, including 0.
pub fn count_label_voxels<L: LabelValue>(label_volume: &LabelVolume<L>) -> BTreeMap<u32, usize> {
    let labels = label_volume
        .labels
        .as_slice()
        .expect("label data is kept in standard layout");
    labels
        .par_iter()
        .fold(BTreeMap::new, |mut counts, &label| {
            *counts.entry(Into::<u32>::into(label)).or_insert(0usize) += 1;
            counts
        })
        .reduce(BTreeMap::new, |mut a, b| {
            for (label, count) in b {
                *a.entry(label).or_insert(0) += count;
            }
            a
        })
}

/// One orthogonal plane of a label volume, laid out like
/// [`VolumeData::extract_slice`]. Labels above 255 saturate.
pub fn extract_label_slice<L: LabelValue>(
    label_volume: &LabelVolume<L>,
    orientation: Orientation,
    index: usize,
) -> Result<Slice2D<u8>> {
    let plane = plane_view(&label_volume.labels, index, orientation)?;
    let narrowed = plane.mapv(|label| {
        let wide: u32 = label.into();
        u8::try_from(wide).unwrap_or(u8::MAX)
    });
    Ok(Slice2D::from_array(narrowed))
}
