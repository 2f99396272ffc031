use super::*;
use crate::advice::model::SwingPhase;
use crate::media::resolver::MemoryMediaResolver;
use crate::store::local::MemoryStore;
use crate::store::remote::MemoryAdviceStore;

struct Fixture {
    remote: Arc<MemoryAdviceStore>,
    local: Arc<MemoryStore>,
    manager: AdviceManager,
}

fn fixture() -> Fixture {
    let remote = Arc::new(MemoryAdviceStore::new());
    let local = Arc::new(MemoryStore::new());
    let manager = AdviceManager::new("v1", remote.clone(), local.clone());
    Fixture {
        remote,
        local,
        manager,
    }
}

fn draft(comment: &str) -> NewAdvice {
    NewAdvice {
        phase: Some(SwingPhase::Address),
        capture: Some(MediaRef::persisted("videos/v1/frame.jpg")),
        capture_sas_url: None,
        comment: comment.into(),
        timestamp: 1.0,
    }
}

fn mirror(f: &Fixture) -> LocalMirror {
    let raw = f.local.get(&mirror_key("v1")).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn create_persists_remotely_and_mirrors() {
    let f = fixture();
    let saved = f.manager.create(draft("stable base")).unwrap();
    assert_eq!(saved.persistence, Persistence::Remote);
    assert_eq!(f.remote.snapshot("v1"), vec![saved.value.clone()]);
    let m = mirror(&f);
    assert_eq!(m.advices, vec![saved.value]);
    assert!(!m.pending_sync);
}

#[test]
fn empty_comment_fails_validation_and_changes_nothing() {
    let f = fixture();
    f.manager.create(draft("first")).unwrap();
    let before = f.manager.list().unwrap();
    let writes = f.remote.write_count();

    let err = f.manager.create(draft("   ")).unwrap_err();
    assert!(matches!(err, FramemarkError::Validation(_)));
    assert_eq!(f.manager.list().unwrap(), before);
    assert_eq!(f.remote.write_count(), writes);
}

#[test]
fn outage_saves_locally_and_lists_from_mirror() {
    let f = fixture();
    f.remote.set_offline(true);
    let saved = f.manager.create(draft("offline note")).unwrap();
    assert_eq!(saved.persistence, Persistence::LocalOnly);

    let m = mirror(&f);
    assert!(m.pending_sync);
    assert_eq!(m.advices.len(), 1);
    assert_eq!(f.manager.list().unwrap(), vec![saved.value]);
}

#[test]
fn pending_mirror_is_pushed_on_next_contact() {
    let f = fixture();
    f.remote.set_offline(true);
    let saved = f.manager.create(draft("offline note")).unwrap();
    f.remote.set_offline(false);

    let listed = f.manager.list().unwrap();
    assert_eq!(listed, vec![saved.value.clone()]);
    assert_eq!(f.remote.snapshot("v1"), vec![saved.value]);
    assert!(!mirror(&f).pending_sync);
}

#[test]
fn offline_edits_build_on_the_mirror() {
    let f = fixture();
    let first = f.manager.create(draft("one")).unwrap().value;
    f.remote.set_offline(true);
    f.manager.create(draft("two")).unwrap();
    f.manager.confirm(&first.id).unwrap();
    let listed = f.manager.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].is_confirmed);
}

#[test]
fn confirm_update_and_delete() {
    let f = fixture();
    let a = f.manager.create(draft("one")).unwrap().value;
    let b = f.manager.create(draft("two")).unwrap().value;

    let confirmed = f.manager.confirm(&a.id).unwrap().value;
    assert!(confirmed.is_confirmed);
    assert!(confirmed.last_updated.is_none());

    let patched = f
        .manager
        .update(
            &b.id,
            AdvicePatch {
                phase: Some(SwingPhase::Finish2),
                ..AdvicePatch::default()
            },
        )
        .unwrap()
        .value;
    assert_eq!(patched.phase, "フィニッシュ2");

    let removed = f.manager.delete(&a.id).unwrap().value;
    assert_eq!(removed.id, a.id);
    let ids: Vec<_> = f.manager.list().unwrap().into_iter().map(|x| x.id).collect();
    assert_eq!(ids, vec![b.id]);
}

#[test]
fn unknown_ids_are_not_found() {
    let f = fixture();
    let missing = AdviceId::from("nope");
    assert!(matches!(
        f.manager.confirm(&missing),
        Err(FramemarkError::NotFound(_))
    ));
    assert!(matches!(
        f.manager.delete(&missing),
        Err(FramemarkError::NotFound(_))
    ));
}

#[test]
fn remarkup_replaces_capture_and_stamps_update() {
    let f = fixture();
    let a = f.manager.create(draft("one")).unwrap().value;
    let marked = MediaRef::volatile("frame_Mark.jpg");
    let updated = f
        .manager
        .apply_remarkup(&a.id, &marked, Some("data:image/jpeg;base64,AA==".into()))
        .unwrap()
        .value;
    assert_eq!(updated.capture_url, "local-pending:frame_Mark.jpg");
    assert_eq!(updated.capture_ref().unwrap(), marked);
    assert!(updated.last_updated.is_some());
}

#[test]
fn legacy_bare_array_mirror_is_read() {
    let f = fixture();
    let a = f.manager.create(draft("one")).unwrap().value;
    f.local
        .set(&mirror_key("v1"), &serde_json::to_string(&vec![a.clone()]).unwrap())
        .unwrap();
    f.remote.set_offline(true);
    assert_eq!(f.manager.list().unwrap(), vec![a]);
}

#[test]
fn losing_both_stores_is_a_local_error() {
    let remote = Arc::new(MemoryAdviceStore::new());
    remote.set_offline(true);
    let manager = AdviceManager::new("v1", remote, Arc::new(MemoryStore::with_quota(4)));
    let err = manager.create(draft("nowhere to go")).unwrap_err();
    assert!(matches!(err, FramemarkError::Local(_)));
}

#[test]
fn status_and_refresh() {
    let f = fixture();
    assert_eq!(f.manager.status(true).unwrap(), VideoStatus::Pending);
    f.manager.create(draft("one")).unwrap();
    assert_eq!(f.manager.status(false).unwrap(), VideoStatus::InProgress);
    assert_eq!(f.manager.status(true).unwrap(), VideoStatus::Completed);

    let resolver = MemoryMediaResolver::new();
    resolver.insert("videos/v1/frame.jpg", vec![1]);
    let refreshed = f.manager.refresh_capture_urls(&resolver).unwrap();
    assert_eq!(
        refreshed[0].capture_sas_url.as_deref(),
        Some("videos/v1/frame.jpg")
    );
    // Refresh is display-only.
    assert!(f.remote.snapshot("v1")[0].capture_sas_url.is_none());
}
