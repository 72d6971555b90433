#![forbid(unsafe_code)]

use cc_core::model::{CodedStatement, EditableDocument};
use cc_storage::{
    AddDocumentsEvent, AddStatementsEvent, ConnectionProfile, EventBatch, HistoryStack,
    PersistenceError, SqliteGateway,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("cc_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_gateway(dir: &Path) -> SqliteGateway {
    let profile = ConnectionProfile::embedded_file(dir.join("coding.db"));
    SqliteGateway::open(&profile).expect("open gateway")
}

fn audit_conn(dir: &Path) -> Connection {
    Connection::open(dir.join("coding.db")).expect("open audit connection")
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(1) FROM {table}"), [], |row| row.get(0))
        .expect("count rows")
}

fn document(title: &str) -> EditableDocument {
    EditableDocument::new(
        title.to_string(),
        "body text".to_string(),
        1,
        "author".to_string(),
        "source".to_string(),
        "section".to_string(),
        String::new(),
        "article".to_string(),
        0,
    )
}

fn add_batch(title: &str) -> EventBatch {
    EventBatch::with_event(title, AddDocumentsEvent::new(vec![document(title)]))
}

#[test]
fn new_edit_truncates_the_redo_branch() {
    let dir = temp_dir("new_edit_truncates_the_redo_branch");
    let mut gateway = open_gateway(&dir);
    let mut stack = HistoryStack::new();

    for title in ["A", "B", "C"] {
        stack.add(add_batch(title), &mut gateway).expect("add");
    }
    assert_eq!(stack.cursor(), 3);

    assert!(stack.undo(&mut gateway).expect("undo C"));
    assert!(stack.undo(&mut gateway).expect("undo B"));
    assert_eq!(stack.cursor(), 1);
    assert!(stack.can_redo());

    stack.add(add_batch("D"), &mut gateway).expect("add D");

    assert_eq!(stack.len(), 2);
    assert_eq!(stack.cursor(), 2);
    assert_eq!(stack.latest().expect("latest").label(), "D");
    assert!(!stack.can_redo());
    assert!(!stack.redo(&mut gateway).expect("redo past the end"));

    let audit = audit_conn(&dir);
    assert_eq!(count(&audit, "DOCUMENTS"), 2);
    let pruned: i64 = audit
        .query_row(
            "SELECT COUNT(1) FROM DOCUMENTS WHERE Title IN ('B', 'C')",
            [],
            |row| row.get(0),
        )
        .expect("pruned titles");
    assert_eq!(pruned, 0);
}

#[test]
fn undo_and_redo_at_the_boundaries_are_no_ops() {
    let dir = temp_dir("undo_and_redo_at_the_boundaries_are_no_ops");
    let mut gateway = open_gateway(&dir);
    let mut stack = HistoryStack::new();

    assert!(!stack.undo(&mut gateway).expect("undo on empty stack"));
    assert!(!stack.redo(&mut gateway).expect("redo on empty stack"));
    assert_eq!(stack.cursor(), 0);
    assert!(stack.latest().is_none());

    stack.add(add_batch("only"), &mut gateway).expect("add");
    assert!(!stack.redo(&mut gateway).expect("redo at the top"));
    assert_eq!(stack.cursor(), 1);

    assert!(stack.undo(&mut gateway).expect("undo"));
    assert!(!stack.undo(&mut gateway).expect("undo at the bottom"));
    assert_eq!(stack.cursor(), 0);

    let audit = audit_conn(&dir);
    assert_eq!(count(&audit, "DOCUMENTS"), 0);
}

#[test]
fn memory_backend_runs_the_same_flow() {
    let mut gateway = SqliteGateway::open(&ConnectionProfile::in_memory()).expect("open gateway");
    let mut stack = HistoryStack::new();

    stack.add(add_batch("volatile"), &mut gateway).expect("add");
    assert!(stack.can_undo());
    assert!(stack.undo(&mut gateway).expect("undo"));
    assert!(stack.redo(&mut gateway).expect("redo"));
    assert_eq!(stack.cursor(), 1);
}

#[test]
fn failed_add_leaves_history_untouched() {
    let dir = temp_dir("failed_add_leaves_history_untouched");
    let mut gateway = open_gateway(&dir);
    gateway.close();

    let mut stack = HistoryStack::new();
    let err = stack
        .add(add_batch("never"), &mut gateway)
        .expect_err("closed gateway must fail");
    match err {
        PersistenceError::ConnectionUnavailable => {}
        other => panic!("expected ConnectionUnavailable, got {other:?}"),
    }
    assert!(stack.is_empty());
    assert_eq!(stack.cursor(), 0);

    // A fresh gateway over the same profile picks the work back up.
    let mut gateway = open_gateway(&dir);
    stack.add(add_batch("recovered"), &mut gateway).expect("add");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.cursor(), 1);
}

#[test]
fn failed_event_in_a_batch_unwinds_the_committed_prefix() {
    let dir = temp_dir("failed_event_in_a_batch_unwinds_the_committed_prefix");
    let mut gateway = open_gateway(&dir);
    let mut stack = HistoryStack::new();

    let mut batch = EventBatch::new("add document and code it");
    batch.push(AddDocumentsEvent::new(vec![document("stray")]));
    let statement = CodedStatement::try_new(1, 0, 4, 999, Vec::new()).expect("statement");
    // DocumentId 777 does not exist, so the second event violates the
    // foreign key and the first event's committed insert must be unwound.
    batch.push(AddStatementsEvent::new(777, vec![statement]));

    let err = stack
        .add(batch, &mut gateway)
        .expect_err("statement insert must fail");
    match err {
        PersistenceError::InsertFailed {
            table: "STATEMENTS",
            ..
        } => {}
        other => panic!("expected InsertFailed on STATEMENTS, got {other:?}"),
    }

    assert!(stack.is_empty());
    assert_eq!(stack.cursor(), 0);

    let audit = audit_conn(&dir);
    assert_eq!(count(&audit, "DOCUMENTS"), 0);
    assert_eq!(count(&audit, "STATEMENTS"), 0);
}
