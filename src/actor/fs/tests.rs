use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use super::debouncer::{DEBOUNCE_MS, Debouncer};
use super::{FsActor, resolve};
use crate::actor::messages::{PreviewMsg, SessionId};

fn make_event(path: &str, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: vec![PathBuf::from(path)],
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(PathBuf::from("/tmp/notes.em"));
    assert!(!debouncer.is_ready());
    assert!(debouncer.sleep_duration() >= Duration::from_secs(60));
}

#[test]
fn test_debouncer_filters_events() {
    let mut debouncer = Debouncer::new(PathBuf::from("/tmp/notes.em"));

    debouncer.add_event(&make_event("/tmp/other.em", modify_kind()));
    debouncer.add_event(&make_event("/tmp/notes.em", remove_kind()));
    debouncer.add_event(&make_event("/tmp/notes.em", metadata_kind()));
    assert!(!debouncer.pending);

    debouncer.add_event(&make_event("/tmp/notes.em", create_kind()));
    assert!(debouncer.pending);
}

#[test]
fn test_debouncer_waits_for_window() {
    let mut debouncer = Debouncer::new(PathBuf::from("/tmp/notes.em"));
    debouncer.add_event(&make_event("/tmp/notes.em", modify_kind()));

    assert!(!debouncer.take_if_ready());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));

    std::thread::sleep(Duration::from_millis(DEBOUNCE_MS + 10));
    assert!(debouncer.take_if_ready());
    // taken once
    assert!(!debouncer.take_if_ready());
}

#[test]
fn test_debouncer_merges_burst_but_not_separate_saves() {
    let mut debouncer = Debouncer::new(PathBuf::from("/tmp/notes.em"));
    let window = Duration::from_millis(DEBOUNCE_MS + 10);

    // one save: truncate + write + recreate
    debouncer.add_event(&make_event("/tmp/notes.em", modify_kind()));
    debouncer.add_event(&make_event("/tmp/notes.em", modify_kind()));
    debouncer.add_event(&make_event("/tmp/notes.em", create_kind()));
    std::thread::sleep(window);
    assert!(debouncer.take_if_ready());
    assert!(!debouncer.take_if_ready());

    // the next save right after is its own edit
    debouncer.add_event(&make_event("/tmp/notes.em", modify_kind()));
    std::thread::sleep(window);
    assert!(debouncer.take_if_ready());
}

#[test]
fn test_resolve_requires_directory() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.em");
    let resolved = resolve(&file).unwrap();
    assert_eq!(resolved.file_name().unwrap(), "notes.em");
    assert!(resolved.is_absolute());

    assert!(resolve(&dir.path().join("missing/notes.em")).is_err());
}

#[tokio::test]
async fn test_initial_snapshot_then_change() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.em");
    std::fs::write(&file, "first").unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let actor = FsActor::new(&file, SessionId(0), tx).unwrap();
    let handle = tokio::spawn(actor.run());

    match rx.recv().await {
        Some(PreviewMsg::ContentChanged { session, text }) => {
            assert_eq!(session, SessionId(0));
            assert_eq!(text, "first");
        }
        other => panic!("expected snapshot, got {other:?}"),
    }

    std::fs::write(&file, "second").unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no change notification");
    assert!(matches!(
        next,
        Some(PreviewMsg::ContentChanged { text, .. }) if text == "second"
    ));

    drop(rx);
    handle.abort();
}
