//! # volume-mpr
//!
//! Slice, projection and window/level engine for scalar 3-D volumes such as
//! a CT series in Hounsfield units.
//!
//! The crate works on in-memory voxel buffers only. Whatever decodes the
//! images hands over a [`VolumeData`] (either directly or through
//! [`VolumeLoader`] from already-decoded frames), and gets back
//! [`Slice2D`] buffers, statistics and label maps. The volume can be sliced
//! in the three medical planes:
//!  - Axial
//!  - Coronal
//!  - Sagittal
//!
//! On top of plain slicing the crate offers
//!  - index <-> world coordinate mapping from spacing, origin and direction
//!    cosines
//!  - maximum, minimum and average intensity projections, full or slab
//!  - window/level to 8-bit, with the usual CT presets
//!  - nearest and bilinear resampling
//!  - ROI statistics and histograms
//!  - ordered threshold segmentation into label volumes
//!  - zoom/pan crop geometry for viewports
//!
//! All operations are synchronous and never mutate their inputs. Whole
//! volume passes use rayon internally.
//!
//! # Examples
//!
//! ## Extracting and windowing a sagittal plane
//!
//! ```
//! # use volume_mpr::{VolumeData, VoiPreset, window_level_slice};
//! let volume = VolumeData::new(2, 2, 2, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0])
//!     .expect("buffer matches dimensions");
//! let plane = volume
//!     .extract_sagittal_slice(1)
//!     .expect("column 1 is inside the volume");
//! let window = VoiPreset::SoftTissue.window();
//! let display = window_level_slice(&plane, window.center, window.width);
//! assert_eq!((display.width(), display.height()), (2, 2));
//! ```
//!
//! ## Tiered segmentation
//!
//! ```
//! # use volume_mpr::{VolumeData, ThresholdRule, LabelVolume};
//! # use volume_mpr::{build_threshold_label_map, count_label_voxels};
//! let volume = VolumeData::new(1, 5, 1, vec![0.0, 10.0, 20.0, 30.0, 300.0]).unwrap();
//! let rules = [ThresholdRule::at_least(2, 300.0), ThresholdRule::at_least(1, 20.0)];
//! let labels: LabelVolume = build_threshold_label_map(&volume, &rules).unwrap();
//! let counts = count_label_voxels(&labels);
//! assert_eq!(counts[&0], 2);
//! assert_eq!(counts[&1], 2);
//! assert_eq!(counts[&2], 1);
//! ```

pub mod analysis;
pub mod enums;
pub mod error;
pub mod geometry;
mod interpolator;
pub mod projection;
pub mod segmentation;
pub mod slice;
pub mod view;
pub mod viewport;
pub mod volume;
pub mod volume_loader;
pub mod window;

pub use analysis::{Histogram, RoiStats, compute_histogram, compute_roi_stats};
pub use enums::{Interpolation, Orientation, Projection, SortBy};
pub use error::{Result, VolumeError};
pub use geometry::{DirectionCosines, Geometry, PixelSpacing, Spacing, VoxelCoordinate};
pub use interpolator::resample_slice;
pub use projection::{
    compute_aip, compute_min_ip, compute_mip, compute_projection, compute_slab_projection,
};
pub use segmentation::{
    LabelValue, LabelVolume, ThresholdRule, build_threshold_label_map,
    build_threshold_label_map_into, count_label_voxels, extract_label_slice,
};
pub use slice::{Slice2D, crop_slice};
pub use view::{RenderMode, ViewParams, render_image, render_view};
pub use viewport::{CameraState, CropRegion, compute_zoomed_crop};
pub use volume::VolumeData;
pub use volume_loader::{SliceFrame, VolumeLoader};
pub use window::{VoiPreset, WindowLevel, apply_window_level, window_level_slice};
