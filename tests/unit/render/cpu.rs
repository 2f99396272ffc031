use super::*;
use crate::foundation::core::Point;
use crate::shape::model::{ShapeColor, segment_path};

#[test]
fn empty_canvas_finishes_transparent() {
    let canvas = CpuCanvas::new(SurfaceSize::new(8, 6)).unwrap();
    let frame = canvas.finish();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert_eq!(frame.data.len(), 8 * 6 * 4);
    assert!(frame.premultiplied);
    assert!(frame.is_transparent());
}

#[test]
fn stroke_covers_pixels_on_the_segment_only() {
    let mut canvas = CpuCanvas::new(SurfaceSize::new(20, 20)).unwrap();
    canvas.stroke(
        &segment_path(Point::new(2.0, 10.0), Point::new(18.0, 10.0)),
        StrokeStyle::new(ShapeColor::Red, 4.0),
    );
    let frame = canvas.finish();

    let on = frame.pixel(10, 10).unwrap();
    assert!(on[0] > 200 && on[3] > 200, "expected red at centre, got {on:?}");
    assert_eq!(on[2], 0);
    assert_eq!(frame.pixel(10, 1).unwrap()[3], 0);
}

#[test]
fn image_is_drawn_through_transform() {
    let image = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new([0u8, 0, 255, 255].repeat(4)),
    };
    let mut canvas = CpuCanvas::new(SurfaceSize::new(4, 4)).unwrap();
    canvas
        .draw_image(&image, Affine::scale_non_uniform(2.0, 2.0))
        .unwrap();
    let frame = canvas.finish();
    let px = frame.pixel(2, 2).unwrap();
    assert!(px[2] > 200 && px[3] > 200, "expected blue, got {px:?}");
}

#[test]
fn mismatched_image_bytes_are_rejected() {
    let image = PreparedImage {
        width: 3,
        height: 3,
        rgba8_premul: Arc::new(vec![0u8; 4]),
    };
    let mut canvas = CpuCanvas::new(SurfaceSize::new(4, 4)).unwrap();
    assert!(canvas.draw_image(&image, Affine::IDENTITY).is_err());
}

#[test]
fn pixel_out_of_bounds_is_none() {
    let frame = CpuCanvas::new(SurfaceSize::new(2, 2)).unwrap().finish();
    assert!(frame.pixel(2, 0).is_none());
    assert!(frame.pixel(0, 2).is_none());
}
