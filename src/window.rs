//! Window/level (VOI) mapping of intensities to the 8-bit display range.

use std::fmt;
use std::str::FromStr;

use ndarray::Zip;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, VolumeError};
use crate::slice::Slice2D;

/// Linear VOI window given by its center and full width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowLevel {
    pub center: f64,
    pub width: f64,
}

impl Default for WindowLevel {
    fn default() -> Self {
        VoiPreset::SoftTissue.window()
    }
}

impl WindowLevel {
    pub const fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    pub fn lower(&self) -> f64 {
        self.center - self.width / 2.0
    }

    pub fn upper(&self) -> f64 {
        self.center + self.width / 2.0
    }

    #[inline]
    pub fn apply(&self, sample: f32) -> u8 {
        apply_window_level(sample, self.center, self.width)
    }
}

/// Standard CT windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiPreset {
    #[serde(rename = "soft")]
    SoftTissue,
    Bone,
    Lung,
}

impl VoiPreset {
    pub const ALL: [VoiPreset; 3] = [VoiPreset::SoftTissue, VoiPreset::Bone, VoiPreset::Lung];

    pub const fn window(self) -> WindowLevel {
        match self {
            VoiPreset::SoftTissue => WindowLevel::new(40.0, 400.0),
            VoiPreset::Bone => WindowLevel::new(300.0, 1500.0),
            VoiPreset::Lung => WindowLevel::new(-600.0, 1600.0),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            VoiPreset::SoftTissue => "soft",
            VoiPreset::Bone => "bone",
            VoiPreset::Lung => "lung",
        }
    }
}

impl fmt::Display for VoiPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VoiPreset {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self> {
        VoiPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| VolumeError::UnknownPreset(s.to_owned()))
    }
}

/// Maps `sample` through the window `[center - width/2, center + width/2]`.
///
/// Samples at or below the lower edge map to 0, at or above the upper edge
/// to 255, everything in between linearly (rounded). A window width that
/// is not positive and finite degrades to a step at `center`. NaN maps
/// to 0.
#[inline]
pub fn apply_window_level(sample: f32, center: f64, width: f64) -> u8 {
    let sample = f64::from(sample);
    if sample.is_nan() {
        return 0;
    }
    if !(width > 0.0) || !width.is_finite() {
        return if sample < center { 0 } else { 255 };
    }

    let lower = center - width / 2.0;
    let upper = center + width / 2.0;
    if sample <= lower {
        0
    } else if sample >= upper {
        255
    } else {
        (((sample - lower) / width) * 255.0).round().clamp(0.0, 255.0) as u8
    }
}

/// Applies [`apply_window_level`] to every sample, keeping the shape.
pub fn window_level_slice(slice: &Slice2D<f32>, center: f64, width: f64) -> Slice2D<u8> {
    if !(width > 0.0) || !width.is_finite() {
        warn!(center, width, "Degenerate window width, using step at center");
    }
    let mapped = Zip::from(slice.view()).par_map_collect(|&v| apply_window_level(v, center, width));
    Slice2D::from_array(mapped)
}
