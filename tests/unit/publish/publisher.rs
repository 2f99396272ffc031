use super::*;
use crate::composite::codec::JPEG_MIME;
use crate::media::resolver::resolve_volatile;
use crate::store::artifact::load_artifact;
use crate::store::local::MemoryStore;
use crate::store::remote::MemoryObjectStore;

fn image() -> EncodedImage {
    EncodedImage {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
        width: 2,
        height: 2,
        mime: JPEG_MIME,
    }
}

#[test]
fn upload_success_returns_persisted_reference() {
    let objects = Arc::new(MemoryObjectStore::new());
    let local = Arc::new(MemoryStore::new());
    let publisher = ArtifactPublisher::new(objects.clone(), local.clone());

    let out = publisher.publish(&image(), "frame_Mark.jpg", &MediaRef::persisted("frame.jpg"));
    assert_eq!(out.stored, Stored::Remote);
    assert_eq!(out.reference, MediaRef::persisted("memory://objects/frame_Mark.jpg"));
    assert!(local.keys().is_empty());
}

#[test]
fn outage_falls_back_to_a_volatile_local_artifact() {
    let objects = Arc::new(MemoryObjectStore::new());
    objects.set_offline(true);
    let local = Arc::new(MemoryStore::new());
    let publisher = ArtifactPublisher::new(objects, local.clone());

    let out = publisher.publish(&image(), "frame_Mark.jpg", &MediaRef::persisted("v/frame.jpg"));
    assert_eq!(out.stored, Stored::Local);
    assert_eq!(out.reference.to_string(), "local-pending:frame_Mark.jpg");

    let artifact = load_artifact(local.as_ref(), "frame_Mark.jpg").unwrap().unwrap();
    assert_eq!(artifact.original_url, "v/frame.jpg");
    assert!(artifact.image_data.starts_with("data:image/jpeg;base64,"));
    assert_eq!(local.keys(), vec!["markup_image:frame_Mark.jpg".to_owned()]);

    let url = resolve_volatile(local.as_ref(), "frame_Mark.jpg").unwrap();
    assert_eq!(url.url, artifact.image_data);
}

#[test]
fn full_local_store_still_yields_a_reference() {
    let objects = Arc::new(MemoryObjectStore::new());
    objects.set_offline(true);
    let publisher = ArtifactPublisher::new(objects, Arc::new(MemoryStore::with_quota(8)));

    let out = publisher.publish(&image(), "frame_Mark.jpg", &MediaRef::persisted("frame.jpg"));
    assert_eq!(out.stored, Stored::Unsaved);
    assert_eq!(out.reference, MediaRef::volatile("frame_Mark.jpg"));
}
