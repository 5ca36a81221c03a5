mod common;

use common::{at, Note, NoteV1};
use sqlite_manager_core::db::open_shared_in_memory;
use sqlite_manager_core::{
    Clock, FailSoftRepository, FixedClock, Record, RecordMeta, RecordRepository, RepoError,
    SqliteRecordRepository,
};
use std::sync::Arc;

fn note_repo() -> SqliteRecordRepository<Note> {
    let conn = open_shared_in_memory().unwrap();
    let repo = SqliteRecordRepository::try_new(conn).unwrap();
    repo.create_table().unwrap();
    repo
}

fn fixed_repo(clock: FixedClock) -> SqliteRecordRepository<Note> {
    let conn = open_shared_in_memory().unwrap();
    let repo = SqliteRecordRepository::with_clock(conn, Arc::new(clock)).unwrap();
    repo.create_table().unwrap();
    repo
}

#[test]
fn insert_then_select_by_id_roundtrip() {
    let repo = note_repo();

    let mut note = Note::new("first note");
    note.body = Some("body text".to_string());
    note.priority = 3;
    assert_eq!(repo.insert(&mut note).unwrap(), 1);

    let loaded = repo.select_by_id(note.meta.id()).unwrap().unwrap();
    assert_eq!(loaded, note);
    assert!(!loaded.meta.is_deleted);
}

#[test]
fn select_by_id_returns_none_for_unknown_id() {
    let repo = note_repo();
    let stranger = Note::new("never stored");
    assert!(repo.select_by_id(stranger.id()).unwrap().is_none());
}

#[test]
fn insert_stamps_insert_and_update_with_clock() {
    let repo = fixed_repo(FixedClock(at(15, 9)));

    let mut note = Note::new("stamped");
    note.meta = RecordMeta::new_at(at(1, 0));
    repo.insert(&mut note).unwrap();

    assert_eq!(note.meta.insert_timestamp, at(15, 9));
    assert_eq!(note.meta.update_timestamp, at(15, 9));
    let loaded = repo.select_by_id(note.id()).unwrap().unwrap();
    assert_eq!(loaded.meta.insert_timestamp, at(15, 9));
}

#[test]
fn insert_batch_shares_one_timestamp() {
    let repo = note_repo();

    let mut notes = vec![Note::new("a"), Note::new("b"), Note::new("c")];
    assert_eq!(repo.insert_batch(&mut notes).unwrap(), 3);

    let stamp = notes[0].meta.insert_timestamp;
    for note in &notes {
        assert_eq!(note.meta.insert_timestamp, stamp);
        assert_eq!(note.meta.update_timestamp, stamp);
        let loaded = repo.select_by_id(note.id()).unwrap().unwrap();
        assert_eq!(loaded.meta.insert_timestamp, stamp);
    }
}

#[test]
fn empty_batches_write_nothing() {
    let repo = note_repo();
    let mut none: Vec<Note> = Vec::new();
    assert_eq!(repo.insert_batch(&mut none).unwrap(), 0);
    assert_eq!(repo.update_batch(&mut none).unwrap(), 0);
    assert_eq!(repo.delete_batch(&mut none).unwrap(), 0);
}

#[test]
fn update_persists_fields_and_refreshes_update_timestamp() {
    let conn = open_shared_in_memory().unwrap();
    let insert_repo =
        SqliteRecordRepository::<Note>::with_clock(conn.clone(), Arc::new(FixedClock(at(1, 8))))
            .unwrap();
    insert_repo.create_table().unwrap();
    let update_repo =
        SqliteRecordRepository::<Note>::with_clock(conn, Arc::new(FixedClock(at(2, 8)))).unwrap();

    let mut note = Note::new("draft");
    insert_repo.insert(&mut note).unwrap();

    note.title = "final".to_string();
    assert_eq!(update_repo.update(&mut note).unwrap(), 1);

    let loaded = update_repo.select_by_id(note.id()).unwrap().unwrap();
    assert_eq!(loaded.title, "final");
    assert_eq!(loaded.meta.insert_timestamp, at(1, 8));
    assert_eq!(loaded.meta.update_timestamp, at(2, 8));
}

#[test]
fn update_unknown_record_returns_not_found() {
    let repo = note_repo();
    let mut note = Note::new("missing");
    let err = repo.update(&mut note).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == note.id()));
}

#[test]
fn inserting_same_id_twice_returns_already_exists() {
    let repo = note_repo();
    let mut note = Note::new("once");
    repo.insert(&mut note).unwrap();

    let err = repo.insert(&mut note).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(id) if id == note.id()));
}

#[test]
fn update_batch_is_all_or_nothing() {
    let repo = note_repo();
    let mut stored = Note::new("stored");
    repo.insert(&mut stored).unwrap();

    stored.title = "changed".to_string();
    let mut batch = vec![stored.clone(), Note::new("never inserted")];
    let err = repo.update_batch(&mut batch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let loaded = repo.select_by_id(stored.id()).unwrap().unwrap();
    assert_eq!(loaded.title, "stored");
}

#[test]
fn update_batch_shares_one_timestamp() {
    let repo = note_repo();
    let mut notes = vec![Note::new("x"), Note::new("y")];
    repo.insert_batch(&mut notes).unwrap();

    assert_eq!(repo.update_batch(&mut notes).unwrap(), 2);
    assert_eq!(
        notes[0].meta.update_timestamp,
        notes[1].meta.update_timestamp
    );
}

#[test]
fn delete_is_soft_and_hidden_from_select_all() {
    let repo = note_repo();
    let mut keep = Note::new("keep");
    let mut gone = Note::new("gone");
    repo.insert(&mut keep).unwrap();
    repo.insert(&mut gone).unwrap();

    assert_eq!(repo.delete(&mut gone).unwrap(), 1);

    let visible = repo.select_all().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id(), keep.id());
    assert!(visible.iter().all(|note| !note.meta.is_deleted));

    let deleted = repo.select_by_id(gone.id()).unwrap().unwrap();
    assert!(deleted.meta.is_deleted);
    let deleted_at = deleted.meta.deleted_timestamp.expect("deletion timestamp");
    assert!(deleted_at >= deleted.meta.update_timestamp);
}

#[test]
fn delete_timestamp_never_precedes_update_even_if_clock_goes_back() {
    let conn = open_shared_in_memory().unwrap();
    let later =
        SqliteRecordRepository::<Note>::with_clock(conn.clone(), Arc::new(FixedClock(at(10, 12))))
            .unwrap();
    later.create_table().unwrap();
    let earlier =
        SqliteRecordRepository::<Note>::with_clock(conn, Arc::new(FixedClock(at(9, 12)))).unwrap();

    let mut note = Note::new("skewed");
    later.insert(&mut note).unwrap();
    earlier.delete(&mut note).unwrap();

    let loaded = earlier.select_by_id(note.id()).unwrap().unwrap();
    assert_eq!(loaded.meta.deleted_timestamp, Some(at(10, 12)));
}

#[test]
fn delete_batch_tombstones_every_record() {
    let clock = FixedClock(at(20, 18));
    let repo = fixed_repo(clock);
    let mut notes = vec![Note::new("a"), Note::new("b"), Note::new("c")];
    repo.insert_batch(&mut notes).unwrap();

    assert_eq!(repo.delete_batch(&mut notes[..2]).unwrap(), 2);

    let visible = repo.select_all().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id(), notes[2].id());
    for note in &notes[..2] {
        let loaded = repo.select_by_id(note.id()).unwrap().unwrap();
        assert!(loaded.meta.is_deleted);
        assert_eq!(loaded.meta.deleted_timestamp, Some(clock.now()));
    }
}

#[test]
fn create_table_is_idempotent_and_keeps_rows() {
    let repo = note_repo();
    let mut note = Note::new("survivor");
    repo.insert(&mut note).unwrap();

    repo.create_table().unwrap();
    repo.create_table().unwrap();

    assert_eq!(repo.select_all().unwrap(), vec![note]);
}

#[test]
fn create_table_adds_columns_declared_later() {
    let conn = open_shared_in_memory().unwrap();
    let old = SqliteRecordRepository::<NoteV1>::try_new(conn.clone()).unwrap();
    old.create_table().unwrap();
    let mut legacy = NoteV1 {
        meta: RecordMeta::new(),
        title: "legacy".to_string(),
    };
    old.insert(&mut legacy).unwrap();

    let new = SqliteRecordRepository::<Note>::try_new(conn).unwrap();
    new.create_table().unwrap();

    let loaded = new.select_by_id(legacy.meta.id()).unwrap().unwrap();
    assert_eq!(loaded.title, "legacy");
    assert_eq!(loaded.body, None);

    let mut fresh = Note::new("fresh");
    fresh.priority = 7;
    new.insert(&mut fresh).unwrap();
    assert_eq!(new.select_all().unwrap().len(), 2);
}

#[test]
fn drop_table_is_idempotent_and_reads_then_fail() {
    let repo = note_repo();
    repo.drop_table().unwrap();
    repo.drop_table().unwrap();

    let err = repo.select_all().unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn select_where_supports_custom_lookups() {
    let repo = note_repo();
    let mut notes = vec![Note::new("alpha"), Note::new("beta"), Note::new("gamma")];
    notes[1].priority = 5;
    notes[2].priority = 9;
    repo.insert_batch(&mut notes).unwrap();

    let urgent = repo
        .select_where("\"priority\" >= ?1 ORDER BY \"priority\" DESC", [5])
        .unwrap();
    let titles = urgent.iter().map(|note| note.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["gamma", "beta"]);
}

#[test]
fn corrupted_rows_surface_as_invalid_data() {
    let repo = note_repo();
    let mut note = Note::new("soon broken");
    repo.insert(&mut note).unwrap();

    repo.connection()
        .lock()
        .unwrap()
        .execute(
            "UPDATE notes SET insert_timestamp = 'not a time' WHERE id = ?1",
            [note.id().to_string()],
        )
        .unwrap();

    let err = repo.select_by_id(note.id()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn fail_soft_absorbs_errors_into_defaults() {
    let repo = FailSoftRepository::new(note_repo());
    assert!(repo.create_table());

    let mut note = Note::new("soft");
    assert_eq!(repo.insert(&mut note), 1);
    assert_eq!(repo.select_all().len(), 1);
    assert_eq!(repo.insert(&mut note), 0);

    assert!(repo.drop_table());
    assert!(repo.select_all().is_empty());
    assert!(repo.select_by_id(note.id()).is_none());
    assert_eq!(repo.update(&mut note), 0);
    assert_eq!(repo.delete(&mut note), 0);
    let mut batch = vec![Note::new("lost")];
    assert_eq!(repo.insert_batch(&mut batch), 0);
    assert_eq!(repo.update_batch(&mut batch), 0);
    assert_eq!(repo.delete_batch(&mut batch), 0);
}

#[test]
fn repositories_share_one_connection_across_threads() {
    let repo = note_repo();
    let handles = (0..4)
        .map(|index| {
            let repo = repo.clone();
            std::thread::spawn(move || {
                let mut notes = (0..5)
                    .map(|n| Note::new(&format!("t{index}-{n}")))
                    .collect::<Vec<_>>();
                repo.insert_batch(&mut notes).unwrap()
            })
        })
        .collect::<Vec<_>>();

    let written: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(written, 20);
    assert_eq!(repo.select_all().unwrap().len(), 20);
}

#[test]
fn updating_deleted_record_keeps_deletion_after_update() {
    let conn = open_shared_in_memory().unwrap();
    let day_one =
        SqliteRecordRepository::<Note>::with_clock(conn.clone(), Arc::new(FixedClock(at(1, 8))))
            .unwrap();
    day_one.create_table().unwrap();
    let day_two =
        SqliteRecordRepository::<Note>::with_clock(conn, Arc::new(FixedClock(at(2, 8)))).unwrap();

    let mut note = Note::new("archived");
    day_one.insert(&mut note).unwrap();
    day_one.delete(&mut note).unwrap();

    let mut loaded = day_two.select_by_id(note.id()).unwrap().unwrap();
    loaded.title = "edited after delete".to_string();
    assert_eq!(day_two.update(&mut loaded).unwrap(), 1);

    let stored = day_two.select_by_id(note.id()).unwrap().unwrap();
    assert!(stored.meta.is_deleted);
    assert_eq!(stored.meta.update_timestamp, at(2, 8));
    let deleted_at = stored.meta.deleted_timestamp.expect("deletion timestamp");
    assert!(deleted_at >= stored.meta.update_timestamp);
    assert!(day_two.select_all().unwrap().is_empty());
}

#[test]
fn fail_soft_table_operations_report_failure() {
    let fresh = open_shared_in_memory().unwrap();
    fresh
        .lock()
        .unwrap()
        .execute_batch("PRAGMA query_only = 1;")
        .unwrap();
    let repo =
        FailSoftRepository::<Note, _>::new(SqliteRecordRepository::try_new(fresh).unwrap());
    assert!(!repo.create_table());

    let existing = note_repo();
    existing
        .connection()
        .lock()
        .unwrap()
        .execute_batch("PRAGMA query_only = 1;")
        .unwrap();
    let repo = FailSoftRepository::<Note, _>::new(existing);
    assert!(!repo.drop_table());
    assert!(repo.select_all().is_empty());
    assert!(repo.strict().select_all().is_ok());
}

#[test]
fn mistyped_business_column_surfaces_as_invalid_data() {
    let repo = note_repo();
    let mut note = Note::new("typed");
    repo.insert(&mut note).unwrap();

    repo.connection()
        .lock()
        .unwrap()
        .execute(
            "UPDATE notes SET priority = 'not a number' WHERE id = ?1",
            [note.id().to_string()],
        )
        .unwrap();

    let err = repo.select_by_id(note.id()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
