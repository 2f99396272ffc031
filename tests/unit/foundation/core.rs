use super::*;

#[test]
fn scale_to_is_per_axis() {
    let display = SurfaceSize::new(100, 50);
    let native = SurfaceSize::new(400, 200);
    assert_eq!(display.scale_to(native), (4.0, 4.0));
    assert_eq!(SurfaceSize::new(100, 100).scale_to(SurfaceSize::new(50, 300)), (0.5, 3.0));
}

#[test]
fn empty_sizes_are_rejected() {
    assert!(SurfaceSize::new(0, 10).ensure_non_empty("display").is_err());
    assert!(SurfaceSize::new(10, 0).is_empty());
    assert!(SurfaceSize::new(1, 1).ensure_non_empty("display").is_ok());
}

#[test]
fn u16_overflow_is_a_render_error() {
    let err = SurfaceSize::new(70_000, 10).as_u16().unwrap_err();
    assert!(err.to_string().contains("render error:"));
    assert_eq!(SurfaceSize::new(640, 480).as_u16().unwrap(), (640, 480));
}
