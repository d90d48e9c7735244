use serde::{Deserialize, Serialize};

use crate::error::{Result, VolumeError};
use crate::slice::Slice2D;

/// Zoom/pan state of a 2-D view. Pan offsets are in un-zoomed slice pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Not used by crop geometry.
    pub rotation: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            rotation: 0.0,
        }
    }
}

impl CameraState {
    pub fn zoomed(zoom: f64) -> Self {
        Self {
            zoom,
            ..Default::default()
        }
    }

    pub fn with_pan(mut self, pan_x: f64, pan_y: f64) -> Self {
        self.pan_x = pan_x;
        self.pan_y = pan_y;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub start_row: usize,
    pub start_col: usize,
    pub view_width: usize,
    pub view_height: usize,
}

impl CropRegion {
    pub fn apply<T: Clone>(&self, slice: &Slice2D<T>) -> Result<Slice2D<T>> {
        slice.crop(
            self.start_row,
            self.start_col,
            self.view_height,
            self.view_width,
        )
    }
}

/// Visible part of `slice` under `camera`.
///
/// The view is `round(size / zoom)` pixels (at least 1) per axis, centered
/// on the slice and shifted by the pan. Start indices are clamped to
/// `0..=size - view`, so for `zoom >= 1` the region always fits the slice.
pub fn compute_zoomed_crop<T>(slice: &Slice2D<T>, camera: &CameraState) -> Result<CropRegion> {
    if !(camera.zoom.is_finite() && camera.zoom > 0.0) {
        return Err(VolumeError::InvalidZoom(camera.zoom));
    }

    let (width, height) = (slice.width(), slice.height());
    let view_width = view_extent(width, camera.zoom);
    let view_height = view_extent(height, camera.zoom);

    Ok(CropRegion {
        start_row: crop_start(height, view_height, camera.pan_y),
        start_col: crop_start(width, view_width, camera.pan_x),
        view_width,
        view_height,
    })
}

fn view_extent(size: usize, zoom: f64) -> usize {
    ((size as f64 / zoom).round() as usize).max(1)
}

fn crop_start(size: usize, view: usize, pan: f64) -> usize {
    let centered = size as f64 / 2.0 - view as f64 / 2.0 + pan;
    let max_start = size.saturating_sub(view) as f64;
    centered.round().clamp(0.0, max_start) as usize
}
