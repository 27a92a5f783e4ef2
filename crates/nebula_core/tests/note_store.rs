use chrono::{DateTime, Duration, TimeZone, Utc};
use nebula_core::db::{DbError, DbResult};
use nebula_core::{
    derive_view, Clock, CreateOutcome, KeyValueStore, KvNoteRepository, MemoryKeyValueStore,
    MutationOutcome, Note, NoteRepository, NoteStore, RepoResult, SqliteKeyValueStore,
    StoreError,
};
use std::cell::Cell;
use std::rc::Rc;

/// Returns a fixed start time and advances one minute per call.
struct StepClock {
    next: Cell<DateTime<Utc>>,
}

impl StepClock {
    fn new() -> Self {
        Self {
            next: Cell::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.next.get();
        self.next.set(now + Duration::minutes(1));
        now
    }
}

/// Counts writes while delegating to an in-memory repository.
struct CountingRepo {
    inner: KvNoteRepository<MemoryKeyValueStore>,
    saves: Rc<Cell<usize>>,
}

impl NoteRepository for CountingRepo {
    fn load(&mut self) -> Vec<Note> {
        self.inner.load()
    }

    fn save(&mut self, notes: &[Note]) -> RepoResult<()> {
        self.saves.set(self.saves.get() + 1);
        self.inner.save(notes)
    }
}

struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> DbResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> DbResult<()> {
        Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }
}

/// Store whose backend cannot be read at all.
struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> DbResult<Option<String>> {
        Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    fn set(&mut self, _key: &str, _value: &str) -> DbResult<()> {
        Ok(())
    }
}

fn counting_store() -> (NoteStore<CountingRepo, StepClock>, Rc<Cell<usize>>) {
    let saves = Rc::new(Cell::new(0));
    let repo = CountingRepo {
        inner: KvNoteRepository::new(MemoryKeyValueStore::new()),
        saves: Rc::clone(&saves),
    };
    (NoteStore::with_clock(repo, StepClock::new()), saves)
}

fn created(outcome: CreateOutcome) -> Note {
    outcome.into_note().expect("note should be created")
}

#[test]
fn groceries_and_trip_scenario() {
    let (mut store, _) = counting_store();

    let groceries = created(store.create("Groceries", "Milk, eggs").unwrap());
    assert_eq!(store.len(), 1);
    assert!(!groceries.is_pinned);
    let t0 = groceries.created_at;

    let trip = created(store.create("Trip", "Pack bags").unwrap());
    assert_eq!(store.len(), 2);
    assert_eq!(store.notes()[0].id, trip.id);

    assert!(store.toggle_pin(groceries.id).unwrap().is_applied());
    let view = derive_view(store.notes(), "");
    assert_eq!(view[0].id, groceries.id);

    assert_eq!(
        store
            .update(trip.id, "Trip", "Pack bags and passport")
            .unwrap(),
        MutationOutcome::Applied
    );
    let updated_trip = store.get(trip.id).unwrap();
    assert_eq!(updated_trip.content, "Pack bags and passport");
    assert!(updated_trip.created_at > t0);
    let view = derive_view(store.notes(), "");
    assert_eq!(view[0].id, groceries.id);
    assert_eq!(view[1].id, trip.id);

    let hits = derive_view(store.notes(), "pack");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, trip.id);

    assert!(store.delete(groceries.id).unwrap().is_applied());
    assert_eq!(store.len(), 1);
    assert_eq!(store.notes()[0].id, trip.id);
}

#[test]
fn blank_fields_never_reach_the_collection() {
    let (mut store, saves) = counting_store();

    for (title, content) in [("", "x"), ("x", ""), ("  ", "  ")] {
        let outcome = store.create(title, content).unwrap();
        assert!(matches!(outcome, CreateOutcome::Invalid(_)));
    }

    assert!(store.is_empty());
    assert_eq!(saves.get(), 0);
}

#[test]
fn invalid_update_leaves_note_and_storage_untouched() {
    let (mut store, saves) = counting_store();
    let note = created(store.create("keep", "me").unwrap());
    let writes_before = saves.get();

    let outcome = store.update(note.id, "keep", " ").unwrap();
    assert!(matches!(outcome, MutationOutcome::Invalid(_)));
    assert_eq!(store.get(note.id).unwrap(), &note);
    assert_eq!(saves.get(), writes_before);
}

#[test]
fn double_toggle_restores_the_exact_note() {
    let (mut store, _) = counting_store();
    let note = created(store.create("pin", "me").unwrap());

    store.toggle_pin(note.id).unwrap();
    assert!(store.get(note.id).unwrap().is_pinned);
    store.toggle_pin(note.id).unwrap();

    assert_eq!(store.get(note.id).unwrap(), &note);
}

#[test]
fn update_keeps_position_and_pin_state() {
    let (mut store, _) = counting_store();
    let older = created(store.create("older", "a").unwrap());
    created(store.create("newer", "b").unwrap());
    store.toggle_pin(older.id).unwrap();

    store.update(older.id, "older", "edited").unwrap();

    assert_eq!(store.notes()[1].id, older.id);
    assert!(store.notes()[1].is_pinned);
}

#[test]
fn every_applied_mutation_writes_once() {
    let (mut store, saves) = counting_store();
    let note = created(store.create("a", "b").unwrap());
    assert_eq!(saves.get(), 1);

    store.update(note.id, "a", "c").unwrap();
    store.toggle_pin(note.id).unwrap();
    store.delete(note.id).unwrap();
    assert_eq!(saves.get(), 4);

    store.delete(note.id).unwrap();
    store.toggle_pin(note.id).unwrap();
    assert_eq!(saves.get(), 4);
}

#[test]
fn notes_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let expected = {
        let repo = KvNoteRepository::new(SqliteKeyValueStore::open(&path).unwrap());
        let mut store = NoteStore::open(repo);
        let first = created(store.create("first", "one").unwrap());
        created(store.create("second", "two").unwrap());
        store.toggle_pin(first.id).unwrap();
        store.notes().to_vec()
    };

    let repo = KvNoteRepository::new(SqliteKeyValueStore::open(&path).unwrap());
    let reopened = NoteStore::open(repo);
    assert_eq!(reopened.notes(), expected.as_slice());
}

#[test]
fn save_then_load_round_trips_collection() {
    let mut repo = KvNoteRepository::new(MemoryKeyValueStore::new());
    let base = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
    let mut notes = (0..5)
        .map(|idx| {
            Note::new(
                format!("title {idx}"),
                format!("content {idx}"),
                base + Duration::milliseconds(idx * 137),
            )
            .unwrap()
        })
        .collect::<Vec<_>>();
    notes[2].is_pinned = true;

    repo.save(&notes).unwrap();
    assert_eq!(repo.load(), notes);
    assert_eq!(repo.load_strict().unwrap(), notes);
}

#[test]
fn loads_notes_written_by_the_web_client() {
    let mut kv = MemoryKeyValueStore::new();
    kv.set(
        "notes",
        r#"[{"id":"11111111-2222-4333-8444-555555555555","title":"Trip","content":"Pack bags","createdAt":"2024-02-03T04:05:06.789Z","isPinned":true}]"#,
    )
    .unwrap();

    let store = NoteStore::open(KvNoteRepository::new(kv));
    let note = &store.notes()[0];
    assert_eq!(note.title, "Trip");
    assert!(note.is_pinned);
    assert_eq!(
        note.created_at,
        Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap() + Duration::milliseconds(789)
    );
}

#[test]
fn sub_millisecond_timestamps_are_stable_across_resave() {
    let mut kv = MemoryKeyValueStore::new();
    kv.set(
        "notes",
        r#"[{"id":"11111111-2222-4333-8444-555555555555","title":"Trip","content":"Pack bags","createdAt":"2024-02-03T04:05:06.789123Z","isPinned":false}]"#,
    )
    .unwrap();
    let mut repo = KvNoteRepository::new(kv);

    let first = repo.load();
    assert_eq!(
        first[0].created_at,
        Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap() + Duration::milliseconds(789)
    );
    repo.save(&first).unwrap();
    let second = repo.load();

    assert_eq!(first, second);
    let raw = repo.store().get("notes").unwrap().unwrap();
    assert!(raw.contains(r#""createdAt":"2024-02-03T04:05:06.789Z""#));
}

#[test]
fn unavailable_storage_starts_empty() {
    let mut store = NoteStore::open(KvNoteRepository::new(UnavailableStore));
    assert!(store.is_empty());

    created(store.create("still", "works").unwrap());
    assert_eq!(store.len(), 1);
}

#[test]
fn corrupt_storage_starts_empty_and_keeps_backup() {
    let mut kv = MemoryKeyValueStore::new();
    kv.set("notes", "not-json").unwrap();

    let mut store = NoteStore::open(KvNoteRepository::new(kv));
    assert!(store.is_empty());
    created(store.create("fresh", "start").unwrap());

    let backup = store
        .repository()
        .store()
        .get("notes.corrupt")
        .unwrap();
    assert_eq!(backup.as_deref(), Some("not-json"));
}

#[test]
fn failed_write_is_reported_and_mutation_kept_in_memory() {
    let mut store = NoteStore::open(KvNoteRepository::new(ReadOnlyStore));

    let err = store.create("title", "content").unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(store.len(), 1);
}
