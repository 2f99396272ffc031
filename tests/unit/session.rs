use std::io::Cursor;
use std::sync::Arc;

use super::*;
use crate::composite::compositor::ComposeOptions;
use crate::flow::state::{CaptureResult, FlowState, ReturnDestination};
use crate::foundation::core::Point;
use crate::media::resolver::MemoryMediaResolver;
use crate::publish::publisher::Stored;
use crate::shape::surface::RecordingSurface;
use crate::store::local::MemoryStore;
use crate::store::remote::MemoryObjectStore;

#[test]
fn derivative_maps_back_to_its_original() {
    let shown = MediaRef::persisted("videos/v1/frame_Mark.jpg");
    assert_eq!(
        lookup_original(&shown, None).unwrap(),
        MediaRef::persisted("videos/v1/frame.jpg")
    );
}

#[test]
fn remembered_original_covers_volatile_derivatives() {
    let shown = MediaRef::volatile("frame_Mark.jpg");
    let remembered = MediaRef::persisted("videos/v1/frame.jpg");
    assert_eq!(
        lookup_original(&shown, Some(&remembered)).unwrap(),
        remembered
    );
    assert!(matches!(
        lookup_original(&shown, None),
        Err(FramemarkError::OriginalUnavailable(_))
    ));
}

#[test]
fn remembered_derivative_is_stripped_of_the_marker() {
    let shown = MediaRef::volatile("frame_Mark.png");
    let remembered = MediaRef::persisted("videos/v1/frame_Mark.png");
    assert_eq!(
        lookup_original(&shown, Some(&remembered)).unwrap(),
        MediaRef::persisted("videos/v1/frame.png")
    );
}

#[test]
fn plain_capture_is_its_own_original() {
    let shown = MediaRef::persisted("videos/v1/frame.jpg");
    assert_eq!(lookup_original(&shown, None).unwrap(), shown);
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 90, 90, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn save_publishes_and_attaches_to_the_flow() {
    let local = Arc::new(MemoryStore::new());
    let resolver = Arc::new(MemoryMediaResolver::new());
    resolver.insert("videos/v1/frame.jpg", png(64, 36));
    let objects = Arc::new(MemoryObjectStore::new());

    let compositor = Compositor::new(resolver.clone(), ComposeOptions::default());
    let publisher = ArtifactPublisher::new(objects.clone(), local.clone());
    let flow = FlowCoordinator::new(local.clone(), resolver.clone());
    flow.begin_annotation(
        FlowState {
            capture_result: Some(CaptureResult {
                url: MediaRef::persisted("videos/v1/frame.jpg"),
                sas_url: None,
            }),
            ..FlowState::default()
        },
        ReturnDestination::page("coach"),
    )
    .unwrap();

    let mut session = MarkupSession::open(
        &MediaRef::persisted("videos/v1/frame.jpg"),
        None,
        RecordingSurface::new(SurfaceSize::new(32, 18)),
        3.0,
    )
    .unwrap();
    assert!(matches!(
        session.save(&compositor, &publisher, &flow),
        Err(FramemarkError::Validation(_))
    ));

    session.canvas_mut().pointer_down(Point::new(16.0, 9.0));
    session.canvas_mut().pointer_up(Point::new(20.0, 9.0));
    let out = session.save(&compositor, &publisher, &flow).unwrap();

    assert_eq!(out.name, "frame_Mark.jpg");
    assert_eq!(out.published.stored, Stored::Remote);
    assert!(out.attached_to_flow);
    assert!(objects.get("frame_Mark.jpg").is_some());

    let slot = flow.peek().unwrap().unwrap();
    assert_eq!(
        slot.state.capture_result.unwrap().url,
        MediaRef::persisted("memory://objects/frame_Mark.jpg")
    );
    assert_eq!(
        slot.state.original_image_url,
        Some(MediaRef::persisted("videos/v1/frame.jpg"))
    );
}

#[test]
fn compositing_failure_publishes_nothing() {
    let local = Arc::new(MemoryStore::new());
    let resolver = Arc::new(MemoryMediaResolver::new());
    resolver.insert_foreign("https://cdn.example/frame.jpg", png(8, 8));
    let objects = Arc::new(MemoryObjectStore::new());

    let compositor = Compositor::new(resolver.clone(), ComposeOptions::default());
    let publisher = ArtifactPublisher::new(objects.clone(), local.clone());
    let flow = FlowCoordinator::new(local.clone(), resolver);

    let mut session = MarkupSession::open(
        &MediaRef::persisted("https://cdn.example/frame.jpg"),
        None,
        RecordingSurface::new(SurfaceSize::new(8, 8)),
        3.0,
    )
    .unwrap();
    session.canvas_mut().pointer_down(Point::new(1.0, 1.0));
    session.canvas_mut().pointer_up(Point::new(3.0, 1.0));

    let err = session.save(&compositor, &publisher, &flow).unwrap_err();
    assert!(matches!(err, FramemarkError::SameOriginLoad(_)));
    assert!(objects.is_empty());
    assert!(local.keys().is_empty());
}

#[test]
fn offline_remarkup_of_a_derivative_remembers_the_clean_original() {
    let local = Arc::new(MemoryStore::new());
    let resolver = Arc::new(MemoryMediaResolver::new());
    resolver.insert("videos/v1/frame.png", png(40, 40));
    resolver.insert("videos/v1/frame_Mark.png", png(40, 40));
    let objects = Arc::new(MemoryObjectStore::new());
    objects.set_offline(true);

    let compositor = Compositor::new(resolver.clone(), ComposeOptions::default());
    let publisher = ArtifactPublisher::new(objects.clone(), local.clone());
    let flow = FlowCoordinator::new(local.clone(), resolver.clone());
    let shown = MediaRef::persisted("videos/v1/frame_Mark.png");
    flow.begin_annotation(
        FlowState {
            capture_result: Some(CaptureResult {
                url: shown.clone(),
                sas_url: None,
            }),
            ..FlowState::default()
        },
        ReturnDestination::page("coach"),
    )
    .unwrap();

    let mut session = MarkupSession::open(
        &shown,
        None,
        RecordingSurface::new(SurfaceSize::new(20, 20)),
        3.0,
    )
    .unwrap();
    assert_eq!(session.original(), &MediaRef::persisted("videos/v1/frame.png"));
    session.canvas_mut().pointer_down(Point::new(10.0, 10.0));
    session.canvas_mut().pointer_up(Point::new(14.0, 10.0));
    let out = session.save(&compositor, &publisher, &flow).unwrap();
    assert_eq!(out.published.stored, Stored::Local);

    let resumed = flow.resume_if_pending().unwrap().unwrap();
    let remembered = resumed.state.original_image_url.unwrap();
    assert_eq!(remembered, MediaRef::persisted("videos/v1/frame.png"));

    let capture = resumed.state.capture_result.unwrap().url;
    assert!(capture.is_volatile());
    assert_eq!(
        lookup_original(&capture, Some(&remembered)).unwrap(),
        MediaRef::persisted("videos/v1/frame.png")
    );
}
