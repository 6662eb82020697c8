//! Full save/load lifecycle against `MemoryStore`.
//!
//! # Design
//! Drives `TodoStorage` the way an application does: load on start, mutate
//! the list, save, load again. Also checks the round-trip and idempotence
//! laws over generated todo lists.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use todo_store::{
    DueDate, KeyValueStore, LoadError, MemoryStore, SaveError, StorageConfig, StoreError, Todo,
    TodoStorage, TODO_STORAGE_KEY,
};

fn storage() -> TodoStorage {
    TodoStorage::new(StorageConfig::default().with_diagnostics(true))
}

#[test]
fn application_lifecycle() {
    let s = storage();
    let mut store = MemoryStore::new();

    // Step 1: first start, nothing stored.
    let mut todos = s.load_all(&store);
    assert!(todos.is_empty(), "expected empty list");

    // Step 2: add two todos and save.
    todos.push(Todo::new("Buy milk"));
    todos.push(
        Todo::new("File taxes")
            .with_description("before the deadline")
            .with_due_date(DueDate::parse("2025-04-15").unwrap()),
    );
    s.save_all(&mut store, &todos);

    // Step 3: reload, same list up to millisecond precision.
    let loaded = s.load_all(&store);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, todos[0].id);
    assert_eq!(loaded[1].due_date, todos[1].due_date);
    assert_eq!(loaded[1].description, "before the deadline");
    assert_eq!(
        loaded[0].created_at.timestamp_millis(),
        todos[0].created_at.timestamp_millis()
    );

    // Step 4: complete the first, drop the second, save.
    let mut updated = loaded;
    updated[0].completed = true;
    updated.truncate(1);
    s.save_all(&mut store, &updated);

    // Step 5: reload reflects the full overwrite.
    let loaded = s.load_all(&store);
    assert_eq!(loaded, updated);
    assert!(loaded[0].completed);
}

#[test]
fn hand_edited_store_is_cleaned_on_next_save() {
    let s = storage();
    let mut store = MemoryStore::new();
    store
        .set(
            TODO_STORAGE_KEY,
            r#"[
                {"id":"1","title":"Keep","completed":false,"createdAt":"2024-01-01T00:00:00.000Z","dueDate":"tomorrow"},
                {"id":"","title":"No id","completed":false,"createdAt":"2024-01-01T00:00:00.000Z"},
                {"id":"3","title":"Keep too","completed":true,"createdAt":"2024-01-01T00:00:00.000Z","extra":1}
            ]"#,
        )
        .unwrap();

    let todos = s.load_all(&store);
    assert_eq!(todos.len(), 2);
    assert!(s.normalizer().has_reported_malformed());

    s.save_all(&mut store, &todos);
    assert_eq!(
        store.get(TODO_STORAGE_KEY).unwrap().as_deref(),
        Some(
            r#"[{"id":"1","title":"Keep","description":"","completed":false,"createdAt":"2024-01-01T00:00:00.000Z"},{"id":"3","title":"Keep too","description":"","completed":true,"createdAt":"2024-01-01T00:00:00.000Z"}]"#
        )
    );
}

#[test]
fn far_years_survive_save_and_load() {
    let s = storage();
    let mut store = MemoryStore::new();
    let mut future = Todo::new("Far future");
    future.created_at = Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap();
    let mut past = Todo::new("Before year zero");
    past.created_at = Utc.with_ymd_and_hms(-1, 12, 31, 23, 59, 59).unwrap();
    let todos = vec![future, past];

    s.save_all(&mut store, &todos);
    let text = store.get(TODO_STORAGE_KEY).unwrap().unwrap();
    assert!(text.contains(r#""createdAt":"+010000-01-01T00:00:00.000Z""#));
    assert!(text.contains(r#""createdAt":"-000001-12-31T23:59:59.000Z""#));

    assert_eq!(s.load_all(&store), todos);
}

#[test]
fn failing_store_never_surfaces_errors() {
    let s = storage();
    let mut store = MemoryStore::with_quota(16);
    s.save_all(&mut store, &[Todo::new("too big for the quota")]);
    assert_eq!(store.raw(TODO_STORAGE_KEY), None);
    assert!(s.load_all(&store).is_empty());

    store.set_unreadable(true);
    assert!(s.load_all(&store).is_empty());
    assert!(matches!(
        s.try_load_all(&store),
        Err(LoadError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        s.try_save_all(&mut store, &[Todo::new("x")]),
        Err(SaveError::Store(StoreError::QuotaExceeded { limit: 16, .. }))
    ));
}

// ---------------------------------------------------------------------------
// Laws
// ---------------------------------------------------------------------------

fn arb_due_date() -> impl Strategy<Value = Option<DueDate>> {
    proptest::option::of((1000i32..=9999, 1u32..=12, 1u32..=28))
        .prop_map(|ymd| ymd.and_then(|(y, m, d)| DueDate::from_ymd(y, m, d)))
}

fn arb_todo() -> impl Strategy<Value = Todo> {
    (
        "[a-z0-9-]{1,16}",
        "[A-Za-z0-9 ]{1,24}",
        ".{0,24}",
        any::<bool>(),
        prop_oneof![
            0i64..4_102_444_800_000,
            // Roughly years -188000 to +192000, inside chrono's range.
            -6_000_000_000_000_000i64..6_000_000_000_000_000,
        ],
        arb_due_date(),
    )
        .prop_map(|(id, title, description, completed, millis, due_date)| Todo {
            id,
            title,
            description,
            completed,
            created_at: DateTime::<Utc>::from_timestamp_millis(millis).unwrap(),
            due_date,
        })
}

proptest! {
    #[test]
    fn save_then_load_is_identity(todos in proptest::collection::vec(arb_todo(), 0..8)) {
        let s = TodoStorage::new(StorageConfig::default().with_diagnostics(false));
        let mut store = MemoryStore::new();
        s.save_all(&mut store, &todos);
        prop_assert_eq!(s.load_all(&store), todos);
    }

    #[test]
    fn saving_twice_writes_same_text(todos in proptest::collection::vec(arb_todo(), 0..8)) {
        let s = TodoStorage::new(StorageConfig::default().with_diagnostics(false));
        let mut store = MemoryStore::new();
        s.save_all(&mut store, &todos);
        let first = store.raw(TODO_STORAGE_KEY).map(str::to_string);
        s.save_all(&mut store, &todos);
        prop_assert_eq!(store.raw(TODO_STORAGE_KEY).map(str::to_string), first);
    }
}
