mod common;

use std::sync::Arc;

use image::Rgba;

use postframe_core::compositor::{canvas_transform, Compositor};
use postframe_core::config::OutputFormat;
use postframe_core::error::CompositorError;
use postframe_core::geometry::CompletedCrop;
use postframe_core::raster::{CpuRasterizer, ImageSource, Rasterizer};
use postframe_core::transform::TransformParams;

use common::{coordinate_pixel, coordinate_resource, decode};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn rotated(degrees: f64) -> TransformParams {
    TransformParams {
        rotation_degrees: degrees,
        ..TransformParams::identity()
    }
}

// ---------------------------------------------------------------------------
// Output framing
// ---------------------------------------------------------------------------

#[test]
fn test_identity_render_reproduces_crop() {
    let image = coordinate_resource(64, 48);
    let crop = CompletedCrop::new(10, 5, 20, 30);
    let result = Compositor::cpu(OutputFormat::Png)
        .render(&image, &crop, &TransformParams::identity())
        .unwrap();

    let out = decode(&result.bytes);
    assert_eq!(out.dimensions(), (20, 30));
    for y in 0..30 {
        for x in 0..20 {
            assert_eq!(*out.get_pixel(x, y), coordinate_pixel(x + 10, y + 5));
        }
    }
    assert_eq!(result.crop, crop);
    assert_eq!(result.mime_type, "image/png");
}

#[test]
fn test_identity_render_is_byte_identical_across_runs() {
    let image = coordinate_resource(300, 300);
    let crop = CompletedCrop::new(17, 23, 257, 260);
    let compositor = Compositor::cpu(OutputFormat::Png);
    let a = compositor
        .render(&image, &crop, &TransformParams::identity())
        .unwrap();
    let b = compositor
        .render(&image, &crop, &TransformParams::identity())
        .unwrap();
    assert_eq!(a.bytes, b.bytes);
    assert_ne!(a.handle, b.handle);
}

#[test]
fn test_output_size_ignores_rotation_and_scale() {
    let image = coordinate_resource(100, 60);
    let crop = CompletedCrop::new(0, 0, 80, 40);
    let transform = TransformParams {
        rotation_degrees: 90.0,
        scale: 2.5,
        ..TransformParams::identity()
    };
    let surface = Compositor::cpu(OutputFormat::Png)
        .compose(&image, &crop, &transform)
        .unwrap();
    assert_eq!((surface.width(), surface.height()), (80, 40));
}

// ---------------------------------------------------------------------------
// Rotation / flip contract
// ---------------------------------------------------------------------------

#[test]
fn test_quarter_turn_moves_top_left_to_top_right() {
    let image = coordinate_resource(600, 600);
    let crop = CompletedCrop::new(0, 0, 500, 500);
    let surface = Compositor::cpu(OutputFormat::Png)
        .compose(&image, &crop, &rotated(90.0))
        .unwrap();
    let out = surface.pixels();
    assert_eq!((out.width(), out.height()), (500, 500));
    assert_eq!(*out.get_pixel(499, 0), coordinate_pixel(0, 0));
    // Clockwise: source top-right lands bottom-right, bottom-left lands top-left
    assert_eq!(*out.get_pixel(499, 499), coordinate_pixel(499, 0));
    assert_eq!(*out.get_pixel(0, 0), coordinate_pixel(0, 499));
}

#[test]
fn test_quarter_turn_is_lossless_everywhere() {
    let image = coordinate_resource(40, 40);
    let crop = CompletedCrop::new(4, 4, 32, 32);
    let surface = Compositor::cpu(OutputFormat::Png)
        .compose(&image, &crop, &rotated(-270.0))
        .unwrap();
    let out = surface.pixels();
    for y in 0..32 {
        for x in 0..32 {
            // Output (x, y) samples source (y, 31 - x) under a clockwise turn
            assert_eq!(*out.get_pixel(x, y), coordinate_pixel(4 + y, 4 + 31 - x));
        }
    }
}

#[test]
fn test_flip_applies_to_source_before_rotation() {
    let image = coordinate_resource(50, 50);
    let crop = CompletedCrop::new(0, 0, 50, 50);
    let compositor = Compositor::cpu(OutputFormat::Png);

    let turned_and_flipped = TransformParams {
        rotation_degrees: 90.0,
        flip_horizontal: true,
        ..TransformParams::identity()
    };
    let combined = compositor
        .compose(&image, &crop, &turned_and_flipped)
        .unwrap()
        .into_pixels();

    // Same as flipping the crop and then turning that output a quarter clockwise
    let flipped_only = TransformParams {
        flip_horizontal: true,
        ..TransformParams::identity()
    };
    let flipped = compositor
        .compose(&image, &crop, &flipped_only)
        .unwrap()
        .into_pixels();
    assert_eq!(combined, image::imageops::rotate90(&flipped));

    // Not the same as mirroring the quarter-turned output
    let turned = compositor
        .compose(&image, &crop, &rotated(90.0))
        .unwrap()
        .into_pixels();
    let mirrored_output = image::imageops::flip_horizontal(&turned);
    assert_ne!(combined, mirrored_output);

    // Source top-left ends bottom-right; source top-right stays top-right
    assert_eq!(*combined.get_pixel(49, 49), coordinate_pixel(0, 0));
    assert_eq!(*combined.get_pixel(49, 0), coordinate_pixel(49, 0));
    assert_eq!(*mirrored_output.get_pixel(0, 0), coordinate_pixel(0, 0));
}

#[test]
fn test_half_turn_with_both_flips_is_identity() {
    let image = coordinate_resource(30, 20);
    let crop = CompletedCrop::new(2, 3, 26, 14);
    let compositor = Compositor::cpu(OutputFormat::Png);
    let both = TransformParams {
        rotation_degrees: 180.0,
        flip_horizontal: true,
        flip_vertical: true,
        ..TransformParams::identity()
    };
    let a = compositor.compose(&image, &crop, &both).unwrap().into_pixels();
    let b = compositor
        .compose(&image, &crop, &TransformParams::identity())
        .unwrap()
        .into_pixels();
    assert_eq!(a, b);
}

#[test]
fn test_arbitrary_angle_leaves_transparent_corners() {
    let image = coordinate_resource(100, 100);
    let crop = CompletedCrop::new(0, 0, 100, 100);
    let surface = Compositor::cpu(OutputFormat::Png)
        .compose(&image, &crop, &rotated(45.0))
        .unwrap();
    let out = surface.pixels();
    assert_eq!(*out.get_pixel(0, 0), TRANSPARENT);
    assert_eq!(*out.get_pixel(99, 99), TRANSPARENT);
    assert_eq!(out.get_pixel(50, 50).0[3], 255);
}

#[test]
fn test_downscale_leaves_transparent_border() {
    let image = coordinate_resource(40, 40);
    let crop = CompletedCrop::new(0, 0, 40, 40);
    let transform = TransformParams {
        scale: 0.5,
        ..TransformParams::identity()
    };
    let surface = Compositor::cpu(OutputFormat::Png)
        .compose(&image, &crop, &transform)
        .unwrap();
    let out = surface.pixels();
    assert_eq!(*out.get_pixel(0, 0), TRANSPARENT);
    assert_eq!(*out.get_pixel(9, 20), TRANSPARENT);
    assert_eq!(out.get_pixel(10, 10).0[3], 255);
    assert_eq!(out.get_pixel(29, 29).0[3], 255);
    assert_eq!(*out.get_pixel(30, 30), TRANSPARENT);
}

#[test]
fn test_canvas_transform_maps_centre_to_itself() {
    let params = TransformParams {
        rotation_degrees: 33.0,
        flip_vertical: true,
        scale: 1.7,
        ..TransformParams::identity()
    };
    let m = canvas_transform(200, 100, &params);
    let (x, y) = m.apply(100.0, 50.0);
    assert!((x - 100.0).abs() < 1e-9 && (y - 50.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Parallel path
// ---------------------------------------------------------------------------

#[test]
fn test_large_surface_matches_expected_pixels() {
    // 300x300 crosses the parallel threshold
    let image = coordinate_resource(320, 320);
    let crop = CompletedCrop::new(10, 10, 300, 300);
    let surface = Compositor::cpu(OutputFormat::Png)
        .compose(&image, &crop, &rotated(180.0))
        .unwrap();
    let out = surface.pixels();
    for &(x, y) in &[(0u32, 0u32), (299, 0), (150, 77), (299, 299)] {
        assert_eq!(*out.get_pixel(x, y), coordinate_pixel(10 + 299 - x, 10 + 299 - y));
    }
}

// ---------------------------------------------------------------------------
// Errors and formats
// ---------------------------------------------------------------------------

#[test]
fn test_empty_crop_rejected() {
    let image = coordinate_resource(10, 10);
    let err = Compositor::cpu(OutputFormat::Png)
        .render(&image, &CompletedCrop::new(0, 0, 0, 5), &TransformParams::identity())
        .unwrap_err();
    assert_eq!(err, CompositorError::EmptyCrop);
}

#[test]
fn test_crop_outside_source_rejected() {
    let image = coordinate_resource(10, 10);
    let err = Compositor::cpu(OutputFormat::Png)
        .render(&image, &CompletedCrop::new(5, 5, 6, 5), &TransformParams::identity())
        .unwrap_err();
    assert!(matches!(err, CompositorError::SourceUnavailable(_)));
}

#[test]
fn test_undecodable_source_unavailable() {
    let err = CpuRasterizer
        .load_image(&ImageSource::Encoded(b"not an image".to_vec()))
        .unwrap_err();
    assert!(matches!(err, CompositorError::SourceUnavailable(_)));
}

#[test]
fn test_remote_url_unavailable() {
    let err = CpuRasterizer
        .load_image(&ImageSource::Url("https://example.com/a.png".into()))
        .unwrap_err();
    assert!(matches!(err, CompositorError::SourceUnavailable(_)));
}

#[test]
fn test_file_url_resolves_locally() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.png");
    common::coordinate_image(12, 9).save(&path).unwrap();
    let url = format!("file://{}", path.display());
    let image = CpuRasterizer.load_image(&ImageSource::Url(url)).unwrap();
    assert_eq!((image.natural_width(), image.natural_height()), (12, 9));
}

#[test]
fn test_jpeg_output_reports_mime_and_flattens() {
    let image = coordinate_resource(32, 32);
    let result = Compositor::new(Arc::new(CpuRasterizer), OutputFormat::Jpeg { quality: 80 })
        .render(&image, &CompletedCrop::new(0, 0, 16, 16), &TransformParams::identity())
        .unwrap();
    assert_eq!(result.mime_type, "image/jpeg");
    assert!(result.file_name().ends_with(".jpg"));
    assert_eq!(decode(&result.bytes).dimensions(), (16, 16));
}

#[test]
fn test_jpeg_transparent_corners_become_white() {
    // The top-left 16x16 block lies wholly outside the turned content
    let image = coordinate_resource(128, 128);
    let result = Compositor::cpu(OutputFormat::jpeg())
        .render(&image, &CompletedCrop::new(0, 0, 128, 128), &rotated(45.0))
        .unwrap();
    let out = decode(&result.bytes);
    let corner = out.get_pixel(0, 0).0;
    assert!(corner[..3].iter().all(|&c| c > 240), "{corner:?}");
}
