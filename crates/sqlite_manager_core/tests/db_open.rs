use sqlite_manager_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(pragma_i64(&conn, "foreign_keys"), 1);
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("app.db3");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("CREATE TABLE probe (id INTEGER);").unwrap();
    drop(conn);

    assert!(path.is_file());
}

#[test]
fn reopening_keeps_data_and_rollback_journal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db3");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("CREATE TABLE probe (id INTEGER); INSERT INTO probe VALUES (42);")
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let value: i64 = conn
        .query_row("SELECT id FROM probe;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(value, 42);
    let mode: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode, "delete");
}

#[test]
fn open_db_reports_directory_errors_as_io() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let err = open_db(blocker.join("app.db3")).unwrap_err();
    assert!(matches!(err, DbError::Io { .. }));
}

fn pragma_i64(conn: &Connection, name: &str) -> i64 {
    conn.query_row(&format!("PRAGMA {name};"), [], |row| row.get(0))
        .unwrap()
}
