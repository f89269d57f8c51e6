use assert_matches::assert_matches;
use pollster::block_on;
use serde_json::json;

use crate::editor::{Editor, EditorEvent};
use crate::keybindings::{KeyCode, Modifiers};
use crate::model::{
    AnnotationId, AnnotationKey, BoundingBox, Geometry, ImageInfo, Label, Point, User,
};
use crate::sync::{
    BroadcastRoom, MemoryBackend, MemoryRoom, Request, SyncAdapter, SyncError, SyncIntent,
    ValidationError,
};
use crate::tools::ToolKind;

type Adapter = SyncAdapter<MemoryBackend, MemoryRoom>;

fn labels() -> Vec<Label> {
    vec![
        Label::new("car", "Car", "#ff0000"),
        Label::new("person", "Person", "#00ff00"),
    ]
}

fn editor(user: &str) -> Editor {
    let mut editor = Editor::default();
    editor.set_user(Some(User::new(user, user)));
    editor.set_labels(labels());
    editor.set_image(ImageInfo::new("img1", "img1.png", 640, 480));
    editor
}

fn adapter() -> Adapter {
    SyncAdapter::new(MemoryBackend::with_labels(labels()), MemoryRoom::new())
}

fn intents(events: Vec<EditorEvent>) -> Vec<SyncIntent> {
    events
        .into_iter()
        .filter_map(|event| match event {
            EditorEvent::Sync(intent) => Some(intent),
            EditorEvent::AdvanceLabel => None,
        })
        .collect()
}

fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) -> Vec<SyncIntent> {
    let mut events = editor.pointer_down(Point::new(from.0, from.1));
    events.extend(editor.pointer_move(Point::new(to.0, to.1)));
    events.extend(editor.pointer_up(Point::new(to.0, to.1)));
    intents(events)
}

/// Draw a 40x40 rectangle at (x, y) and return its key and create intent.
fn draw(editor: &mut Editor, x: f64, y: f64) -> (AnnotationKey, SyncIntent) {
    editor.set_tool(ToolKind::Rectangle);
    let mut created = drag(editor, (x, y), (x + 40.0, y + 40.0));
    assert_eq!(created.len(), 1);
    let intent = created.remove(0);
    let SyncIntent::Create(key) = intent else {
        panic!("expected create, got {:?}", intent);
    };
    (key, intent)
}

/// Select the shape under (x, y) with the move tool.
fn select_at(editor: &mut Editor, x: f64, y: f64) {
    editor.set_tool(ToolKind::Move);
    drag(editor, (x, y), (x, y));
}

fn run(adapter: &mut Adapter, editor: &mut Editor, intents: Vec<SyncIntent>) {
    let errors = block_on(adapter.dispatch_all(editor, intents));
    assert!(errors.is_empty(), "unexpected sync errors: {:?}", errors);
}

#[test]
fn test_create_swaps_id_in_place() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);
    let temp = editor.store().get(key).unwrap().id.clone();
    assert!(temp.is_temporary());

    run(&mut adapter, &mut editor, vec![intent]);

    let ann = editor.store().get(key).unwrap();
    assert!(ann.id.is_canonical());
    assert_eq!(ann.id.as_str(), "000000000000000000000001");
    assert_eq!(ann.label_name.as_deref(), Some("Car"));
    assert_eq!(editor.annotations().len(), 1);
    assert_eq!(adapter.room().ids(), vec!["000000000000000000000001"]);

    let stored = adapter.backend().records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["createdBy"], "u1");
    assert_eq!(stored[0]["imageId"], "img1");
    assert_eq!(stored[0]["shape"]["type"], "rectangle");
}

#[test]
fn test_failed_create_rolls_back() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);

    adapter.backend().fail_next(1);
    let result = block_on(adapter.dispatch(&mut editor, intent));

    assert_matches!(result, Err(SyncError::Network { .. }));
    assert!(!editor.store().contains(key));
    assert!(adapter.backend().is_empty());
    assert!(!adapter.is_creating(key));
}

#[test]
fn test_create_without_user_is_rejected() {
    let mut editor = editor("u1");
    editor.set_user(None);
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);

    assert_eq!(
        adapter.request(&mut editor, intent),
        Err(ValidationError::MissingUser)
    );
    assert!(!editor.store().contains(key));
    assert!(adapter.backend().is_empty());
}

#[test]
fn test_create_without_label_is_rejected() {
    let mut editor = Editor::default();
    editor.set_user(Some(User::new("u1", "alice")));
    editor.set_image(ImageInfo::new("img1", "img1.png", 640, 480));
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);

    let result = block_on(adapter.dispatch(&mut editor, intent));
    assert_matches!(
        result,
        Err(SyncError::Validation(ValidationError::MissingLabel))
    );
    assert!(!editor.store().contains(key));
}

#[test]
fn test_update_of_unsaved_annotation_creates_it() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, _) = draw(&mut editor, 10.0, 10.0);

    assert_matches!(
        adapter.request(&mut editor, SyncIntent::Update(key)),
        Ok(Some(Request::Create { key: k, .. })) if k == key
    );
    assert!(adapter.is_creating(key));
}

#[test]
fn test_edit_during_create_is_sent_afterwards() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);

    let create = adapter.request(&mut editor, intent).unwrap().unwrap();

    // Move the shape while the create is in flight
    select_at(&mut editor, 30.0, 30.0);
    let moved = drag(&mut editor, (30.0, 30.0), (130.0, 30.0));
    assert_eq!(moved, vec![SyncIntent::Update(key)]);
    assert_eq!(adapter.request(&mut editor, moved[0].clone()), Ok(None));

    let completion = block_on(adapter.send(create));
    let follow_ups = adapter.complete(&mut editor, completion).unwrap();
    assert_matches!(
        follow_ups.as_slice(),
        [Request::Update { id, .. }] if id == "000000000000000000000001"
    );

    for request in follow_ups {
        let completion = block_on(adapter.send(request));
        assert!(adapter.complete(&mut editor, completion).unwrap().is_empty());
    }
    let stored = adapter.backend().records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["shape"]["coordinates"]["x"], 110.0);
}

#[test]
fn test_delete_during_create_removes_orphan() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);
    let create = adapter.request(&mut editor, intent).unwrap().unwrap();

    select_at(&mut editor, 30.0, 30.0);
    let deleted = intents(editor.key_down(KeyCode::Delete, Modifiers::NONE));
    assert_matches!(deleted.as_slice(), [SyncIntent::Delete(id)] if id.is_temporary());
    // Never stored, so nothing to send yet
    assert_eq!(adapter.request(&mut editor, deleted[0].clone()), Ok(None));

    let completion = block_on(adapter.send(create));
    let follow_ups = adapter.complete(&mut editor, completion).unwrap();
    assert_eq!(
        follow_ups,
        vec![Request::Delete {
            id: "000000000000000000000001".into()
        }]
    );
    assert_eq!(adapter.backend().len(), 1);

    let completion = block_on(adapter.send(follow_ups[0].clone()));
    adapter.complete(&mut editor, completion).unwrap();
    assert!(adapter.backend().is_empty());
    assert!(!editor.store().contains(key));
}

#[test]
fn test_create_answer_after_image_switch() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (_, intent) = draw(&mut editor, 10.0, 10.0);
    let create = adapter.request(&mut editor, intent).unwrap().unwrap();

    editor.set_image(ImageInfo::new("img2", "img2.png", 640, 480));
    let completion = block_on(adapter.send(create));

    assert!(adapter.complete(&mut editor, completion).unwrap().is_empty());
    assert!(editor.annotations().is_empty());
    // The record belongs to the first image
    assert_eq!(adapter.backend().records()[0]["imageId"], "img1");
}

#[test]
fn test_failed_update_keeps_local_edit() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);
    run(&mut adapter, &mut editor, vec![intent]);

    select_at(&mut editor, 30.0, 30.0);
    let moved = drag(&mut editor, (30.0, 30.0), (30.0, 130.0));
    adapter.backend().fail_next(1);
    let errors = block_on(adapter.dispatch_all(&mut editor, moved));

    assert_eq!(errors.len(), 1);
    assert_eq!(
        editor.store().get(key).unwrap().geometry,
        Geometry::rectangle(BoundingBox::new(10.0, 110.0, 40.0, 40.0))
    );
    assert_eq!(
        adapter.backend().records()[0]["shape"]["coordinates"]["y"],
        10.0
    );
}

#[test]
fn test_undo_redo_round_trip_through_backend() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (key, intent) = draw(&mut editor, 10.0, 10.0);
    run(&mut adapter, &mut editor, vec![intent]);

    // Undo the create: the stored record goes away
    let undone = intents(editor.undo());
    assert_matches!(undone.as_slice(), [SyncIntent::Delete(id)] if id.is_canonical());
    run(&mut adapter, &mut editor, undone);
    assert!(adapter.backend().is_empty());

    // Redo stores it again under a fresh id, same key
    let redone = intents(editor.redo());
    assert_eq!(redone, vec![SyncIntent::Create(key)]);
    run(&mut adapter, &mut editor, redone);
    assert_eq!(adapter.backend().len(), 1);
    assert_eq!(
        editor.store().get(key).unwrap().id.as_str(),
        "000000000000000000000002"
    );
}

#[test]
fn test_peer_sees_new_annotation() {
    let backend = MemoryBackend::with_labels(labels());
    let room = MemoryRoom::new();
    let mut alice = editor("alice");
    let mut bob = editor("bob");
    let mut alice_sync = SyncAdapter::new(backend.clone(), room.clone());
    let mut bob_sync = SyncAdapter::new(backend.clone(), room.clone());

    assert!(!bob_sync.needs_reload());
    let (key, intent) = draw(&mut alice, 10.0, 10.0);
    run(&mut alice_sync, &mut alice, vec![intent]);

    assert!(bob_sync.needs_reload());
    assert!(block_on(bob_sync.poll_peers(&mut bob)).unwrap());
    assert_eq!(bob.annotations().len(), 1);
    assert_eq!(bob.annotations()[0].created_by(), Some("alice"));
    assert!(!block_on(bob_sync.poll_peers(&mut bob)).unwrap());

    // The author reloads too; its annotation keeps its key
    assert!(block_on(alice_sync.poll_peers(&mut alice)).unwrap());
    assert_eq!(alice.annotations().len(), 1);
    assert_eq!(alice.annotations()[0].key, key);
    assert_eq!(room.len(), 1);
}

#[test]
fn test_load_skips_malformed_records() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let backend = adapter.backend().clone();
    backend.insert_raw(json!({
        "id": "65a1f0c2e4b0a1b2c3d4e5f6",
        "imageId": "img1",
        "labelId": "car",
        "createdBy": "u2",
        "shape": {"type": "point", "coordinates": {"x": 3, "y": 4}},
    }));
    backend.insert_raw(json!({
        "id": "65a1f0c2e4b0a1b2c3d4e5f7",
        "imageId": "img1",
        "labelId": "car",
        "createdBy": "u2",
        "shape": {"type": "polygon", "coordinates": [[0, 0]]},
    }));
    backend.insert_raw(json!({
        "id": "65a1f0c2e4b0a1b2c3d4e5f8",
        "imageId": "other",
        "labelId": "car",
        "createdBy": "u2",
        "shape": {"type": "point", "coordinates": {"x": 0, "y": 0}},
    }));

    assert_eq!(block_on(adapter.load_for_image(&mut editor)).unwrap(), 1);
    assert_eq!(
        editor.annotations()[0].geometry,
        Geometry::Point {
            position: Point::new(3.0, 4.0),
            text: None
        }
    );
}

#[test]
fn test_stale_load_is_dropped() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (_, intent) = draw(&mut editor, 10.0, 10.0);
    run(&mut adapter, &mut editor, vec![intent]);

    let records = block_on(adapter.fetch("img1")).unwrap();
    assert_eq!(records.len(), 1);

    editor.set_image(ImageInfo::new("img2", "img2.png", 640, 480));
    assert_eq!(adapter.apply_loaded(&mut editor, "img1", records), 0);
    assert!(editor.annotations().is_empty());
}

#[test]
fn test_load_keeps_pending_creates() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (stored_key, intent) = draw(&mut editor, 10.0, 10.0);
    run(&mut adapter, &mut editor, vec![intent]);
    let (pending_key, _) = draw(&mut editor, 100.0, 100.0);

    assert_eq!(block_on(adapter.load_for_image(&mut editor)).unwrap(), 1);
    assert_eq!(editor.annotations().len(), 2);
    assert!(editor.store().contains(stored_key));
    assert!(editor.store().contains(pending_key));
}

#[test]
fn test_refresh_labels() {
    let mut editor = Editor::default();
    let adapter = adapter();
    assert!(editor.palette().is_empty());

    assert_eq!(
        block_on(adapter.refresh_labels(&mut editor, "project1")).unwrap(),
        2
    );
    assert_eq!(editor.current_label().map(|l| l.id.as_str()), Some("car"));
    assert_eq!(editor.palette().get("person").unwrap().name, "Person");
}

#[test]
fn test_undo_after_reload_keeps_peer_work() {
    let backend = MemoryBackend::with_labels(labels());
    let room = MemoryRoom::new();
    let mut alice = editor("alice");
    let mut bob = editor("bob");
    let mut alice_sync = SyncAdapter::new(backend.clone(), room.clone());
    let mut bob_sync = SyncAdapter::new(backend.clone(), room.clone());

    let (_, mine) = draw(&mut alice, 10.0, 10.0);
    run(&mut alice_sync, &mut alice, vec![mine]);
    let (_, theirs) = draw(&mut bob, 200.0, 200.0);
    run(&mut bob_sync, &mut bob, vec![theirs]);

    assert!(block_on(alice_sync.poll_peers(&mut alice)).unwrap());
    assert_eq!(alice.annotations().len(), 2);

    let undone = intents(alice.undo());
    assert_eq!(
        undone,
        vec![SyncIntent::Delete(AnnotationId::from_raw(
            "000000000000000000000001"
        ))]
    );
    run(&mut alice_sync, &mut alice, undone);

    let stored = backend.records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["createdBy"], "bob");
    assert_eq!(alice.annotations().len(), 1);

    // Redo brings back only Alice's shape
    let redone = intents(alice.redo());
    assert_matches!(redone.as_slice(), [SyncIntent::Create(_)]);
}

#[test]
fn test_rolled_back_create_stays_gone_after_undo() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (failed_key, failed) = draw(&mut editor, 10.0, 10.0);
    let (stored_key, stored) = draw(&mut editor, 100.0, 100.0);
    run(&mut adapter, &mut editor, vec![stored]);

    adapter.backend().fail_next(1);
    assert!(block_on(adapter.dispatch(&mut editor, failed)).is_err());
    assert!(!editor.store().contains(failed_key));

    let undone = intents(editor.undo());
    assert_matches!(undone.as_slice(), [SyncIntent::Delete(id)] if id.is_canonical());
    assert!(!editor.store().contains(failed_key));
    assert!(!editor.store().contains(stored_key));
    run(&mut adapter, &mut editor, undone);

    while editor.can_undo() {
        assert!(intents(editor.undo()).is_empty());
    }
    assert!(editor.annotations().is_empty());
    assert!(adapter.backend().is_empty());
}

#[test]
fn test_requests_in_flight_do_not_block_edits() {
    let mut editor = editor("u1");
    let mut adapter = adapter();
    let (first_key, first) = draw(&mut editor, 10.0, 10.0);
    let (second_key, second) = draw(&mut editor, 100.0, 100.0);

    let first = adapter.request(&mut editor, first).unwrap().unwrap();
    let second = adapter.request(&mut editor, second).unwrap().unwrap();
    let first_call = adapter.send(first);
    let second_call = adapter.send(second);

    // Edit the first shape while both calls are pending
    select_at(&mut editor, 30.0, 30.0);
    let moved = drag(&mut editor, (30.0, 30.0), (30.0, 230.0));
    assert_eq!(moved, vec![SyncIntent::Update(first_key)]);
    assert_eq!(adapter.request(&mut editor, moved[0].clone()), Ok(None));

    // Answers arrive out of order
    let completion = block_on(second_call);
    assert!(adapter.complete(&mut editor, completion).unwrap().is_empty());
    let completion = block_on(first_call);
    let follow_ups = adapter.complete(&mut editor, completion).unwrap();
    assert_eq!(follow_ups.len(), 1);
    for request in follow_ups {
        let completion = block_on(adapter.send(request));
        assert!(adapter.complete(&mut editor, completion).unwrap().is_empty());
    }

    assert_eq!(
        editor.store().get(second_key).unwrap().id.as_str(),
        "000000000000000000000001"
    );
    assert_eq!(
        editor.store().get(first_key).unwrap().id.as_str(),
        "000000000000000000000002"
    );
    let records = adapter.backend().records();
    let first_record = records
        .iter()
        .find(|r| r["id"] == "000000000000000000000002")
        .unwrap();
    assert_eq!(first_record["shape"]["coordinates"]["y"], 210.0);
}
