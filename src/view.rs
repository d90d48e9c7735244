//! One-call rendering of a display-ready view from a volume.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enums::{Interpolation, Orientation, Projection};
use crate::error::Result;
use crate::interpolator::{Interpolator, resample_slice};
use crate::projection::{compute_projection, compute_slab_projection};
use crate::slice::Slice2D;
use crate::viewport::{CameraState, compute_zoomed_crop};
use crate::volume::{VolumeData, check_index};
use crate::window::{VoiPreset, WindowLevel, window_level_slice};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// A single plane.
    #[default]
    Slice,
    /// An intensity projection through a slab around the plane.
    Projection(Projection),
}

/// Everything needed to turn a volume into an 8-bit view.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewParams {
    pub orientation: Orientation,
    /// Plane index along the orientation's normal; the middle plane when
    /// absent.
    pub index: Option<usize>,
    pub mode: RenderMode,
    /// Planes per projection slab, centered on `index`. The whole axis
    /// when absent.
    pub slab_thickness: Option<usize>,
    pub window: WindowLevel,
    pub interpolation: Interpolation,
    /// Resample the plane so anisotropic voxels display with their
    /// physical aspect ratio.
    pub isotropic: bool,
    pub camera: CameraState,
}

impl ViewParams {
    pub fn new(orientation: Orientation, index: usize) -> Self {
        Self {
            orientation,
            index: Some(index),
            ..Default::default()
        }
    }

    pub fn with_preset(mut self, preset: VoiPreset) -> Self {
        self.window = preset.window();
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Extracts (or projects) the plane described by `params`, resamples it to
/// physical aspect if asked, crops it to the camera and maps it through the
/// window.
pub fn render_view(volume: &VolumeData, params: &ViewParams) -> Result<Slice2D<u8>> {
    let orientation = params.orientation;
    let len = volume.data().len_of(orientation.normal_axis());
    let index = params.index.unwrap_or(len / 2);
    check_index(orientation.index_name(), index, len)?;

    let plane = match params.mode {
        RenderMode::Slice => volume.extract_slice(orientation, index)?,
        RenderMode::Projection(projection) => match params.slab_thickness {
            None => compute_projection(volume, orientation, projection),
            Some(thickness) => {
                let thickness = thickness.clamp(1, len);
                let start = index.saturating_sub(thickness / 2).min(len - thickness);
                compute_slab_projection(volume, orientation, projection, start, thickness)?
            }
        },
    };

    let plane = if params.isotropic {
        let (width, height) =
            Interpolator::display_dimensions(volume.spacing(), volume.dim(), orientation);
        if (width, height) == (plane.width(), plane.height()) {
            plane
        } else {
            resample_slice(&plane, width, height, params.interpolation)?
        }
    } else {
        plane
    };

    let mut crop = compute_zoomed_crop(&plane, &params.camera)?;
    crop.view_width = crop.view_width.min(plane.width());
    crop.view_height = crop.view_height.min(plane.height());
    let visible = crop.apply(&plane)?;

    let rendered = window_level_slice(&visible, params.window.center, params.window.width);
    debug!(
        ?orientation,
        index,
        mode = ?params.mode,
        width = rendered.width(),
        height = rendered.height(),
        "Rendered view"
    );
    Ok(rendered)
}

/// [`render_view`] as a grayscale image.
pub fn render_image(volume: &VolumeData, params: &ViewParams) -> Result<GrayImage> {
    render_view(volume, params).map(|view| view.to_image())
}
