use ndarray::Array3;
use volume_mpr::{
    CameraState, Interpolation, LabelVolume, Orientation, ThresholdRule, VoiPreset, VolumeData,
    apply_window_level, build_threshold_label_map, compute_histogram, compute_roi_stats,
    compute_zoomed_crop, count_label_voxels, extract_label_slice, resample_slice,
    window_level_slice,
};

/// Air background, soft tissue block, bone core.
fn body() -> VolumeData {
    let data = Array3::from_shape_fn((8, 32, 32), |(_, r, c)| {
        let inside = |lo: usize, hi: usize| (lo..hi).contains(&r) && (lo..hi).contains(&c);
        if inside(12, 20) {
            700.0
        } else if inside(4, 28) {
            45.0
        } else {
            -1000.0
        }
    });
    VolumeData::from_array(data).unwrap()
}

#[test]
fn test_window_boundaries_for_presets() {
    for preset in VoiPreset::ALL {
        let window = preset.window();
        assert_eq!(apply_window_level(window.lower() as f32, window.center, window.width), 0);
        assert_eq!(apply_window_level(window.upper() as f32, window.center, window.width), 255);
        let mid = apply_window_level(window.center as f32, window.center, window.width);
        assert!((127..=128).contains(&mid));
    }
}

#[test]
fn test_histogram_covers_every_voxel() {
    let volume = body();
    let histogram = compute_histogram(&volume, 256).unwrap();
    assert_eq!(histogram.total(), volume.voxels().len() as u64);
    assert_eq!(histogram.bin_edges[0], -1000.0);
    assert_eq!(histogram.bin_edges[256], 700.0);
    assert_eq!(histogram.bins[0], 8 * (32 * 32 - 24 * 24));
    assert_eq!(histogram.bins[255], 8 * 8 * 8);
}

#[test]
fn test_zoomed_roi_statistics() {
    let volume = body();
    let slice = volume.extract_axial_slice(4).unwrap();

    let crop = compute_zoomed_crop(&slice, &CameraState::zoomed(4.0)).unwrap();
    let roi = crop.apply(&slice).unwrap();
    let stats = compute_roi_stats(&roi, Some(volume.spacing().in_plane()));

    assert_eq!(stats.count, 64);
    assert_eq!(stats.min, 700.0);
    assert_eq!(stats.max, 700.0);
    assert_eq!(stats.std, 0.0);
    assert_eq!(stats.area, 64.0);
}

#[test]
fn test_bone_and_tissue_segmentation() {
    let volume = body();
    let rules = [
        ThresholdRule::at_least(2, 300.0),
        ThresholdRule::above(1, 30.0),
    ];
    let labels: LabelVolume = build_threshold_label_map(&volume, &rules).unwrap();

    let counts = count_label_voxels(&labels);
    assert_eq!(counts.values().sum::<usize>(), volume.voxels().len());
    assert_eq!(counts[&2], 8 * 8 * 8);
    assert_eq!(counts[&1], 8 * (24 * 24 - 8 * 8));

    let coronal = extract_label_slice(&labels, Orientation::Coronal, 16).unwrap();
    assert_eq!((coronal.width(), coronal.height()), (32, 8));
    assert_eq!(coronal.get(3, 0), Some(&0));
    assert_eq!(coronal.get(3, 5), Some(&1));
    assert_eq!(coronal.get(3, 16), Some(&2));
}

#[test]
fn test_resampled_display_stays_in_window() {
    let volume = body();
    let plane = volume.extract_sagittal_slice(16).unwrap();
    let upsampled = resample_slice(&plane, 64, 64, Interpolation::Bilinear).unwrap();
    for &v in upsampled.as_slice() {
        assert!((-1000.0..=700.0).contains(&v));
    }

    let window = VoiPreset::Bone.window();
    let display = window_level_slice(&upsampled, window.center, window.width);
    assert_eq!((display.width(), display.height()), (64, 64));
    let image = display.to_image();
    assert_eq!(image.dimensions(), (64, 64));
}
