#![forbid(unsafe_code)]

use cc_core::model::{CodedStatement, EditableDocument};
use cc_core::values::{DataType, Value, VariableValue};
use cc_storage::{
    AddDocumentsEvent, AddStatementsEvent, ConnectionProfile, EventBatch, HistoryStack,
    RemoveDocumentsEvent, RemoveStatementsEvent, ReversibleEvent, SqliteGateway,
    define_statement_type, define_variable,
};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

const VALUE_TABLES: [&str; 4] = [
    "DATABOOLEAN",
    "DATAINTEGER",
    "DATASHORTTEXT",
    "DATALONGTEXT",
];

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

/// One persisted document with three statements, each coded with one value in
/// every value table.
fn seeded_document(gateway: &mut SqliteGateway) -> EditableDocument {
    let type_id = define_statement_type(gateway, "claim").expect("statement type");
    define_variable(gateway, type_id, "agree", DataType::Boolean).expect("agree");
    define_variable(gateway, type_id, "rank", DataType::Integer).expect("rank");
    define_variable(gateway, type_id, "actor", DataType::ShortText).expect("actor");
    define_variable(gateway, type_id, "quote", DataType::LongText).expect("quote");

    let mut add_document = AddDocumentsEvent::new(vec![EditableDocument::new(
        "speech".to_string(),
        "a long enough body of text for three coded spans".to_string(),
        1,
        "author".to_string(),
        "source".to_string(),
        "section".to_string(),
        String::new(),
        "speech".to_string(),
        1_700_000_000_000,
    )]);
    add_document.apply(gateway).expect("insert document");
    let mut document = add_document.into_documents().remove(0);

    let statements: Vec<CodedStatement> = (0..3i64)
        .map(|index| {
            let start = index * 5;
            CodedStatement::try_new(
                1,
                start,
                start + 4,
                type_id,
                vec![
                    Value::new("agree", VariableValue::Boolean(index % 2 == 0)),
                    Value::new("rank", VariableValue::Integer(index)),
                    Value::new("actor", VariableValue::ShortText(format!("actor {index}"))),
                    Value::new("quote", VariableValue::LongText(format!("quote {index}"))),
                ],
            )
            .expect("statement")
        })
        .collect();

    let mut add_statements = AddStatementsEvent::new(document.id(), statements);
    add_statements.apply(gateway).expect("insert statements");
    for statement in add_statements.into_statements() {
        document.add_statement(statement).expect("attach statement");
    }
    document
}

#[test]
fn removing_a_document_deletes_every_owned_row_and_restore_rebuilds_them() {
    let dir = temp_dir("removing_a_document_deletes_every_owned_row");
    let mut gateway = open_gateway(&dir);
    let document = seeded_document(&mut gateway);
    let original_document_id = document.id();

    let audit = audit_conn(&dir);
    assert_eq!(count(&audit, "DOCUMENTS"), 1);
    assert_eq!(count(&audit, "STATEMENTS"), 3);
    for table in VALUE_TABLES {
        assert_eq!(count(&audit, table), 3, "{table} before removal");
    }

    let mut stack = HistoryStack::new();
    stack
        .add(
            EventBatch::with_event("remove document", RemoveDocumentsEvent::new(vec![document])),
            &mut gateway,
        )
        .expect("remove document");

    assert_eq!(count(&audit, "DOCUMENTS"), 0);
    assert_eq!(count(&audit, "STATEMENTS"), 0);
    for table in VALUE_TABLES {
        assert_eq!(count(&audit, table), 0, "{table} after removal");
    }

    assert!(stack.undo(&mut gateway).expect("restore document"));

    assert_eq!(count(&audit, "DOCUMENTS"), 1);
    assert_eq!(count(&audit, "STATEMENTS"), 3);
    for table in VALUE_TABLES {
        assert_eq!(count(&audit, table), 3, "{table} after restore");
    }

    let restored_document_id: i64 = audit
        .query_row("SELECT ID FROM DOCUMENTS", [], |row| row.get(0))
        .expect("restored document id");
    assert_ne!(restored_document_id, original_document_id);

    let title: String = audit
        .query_row("SELECT Title FROM DOCUMENTS", [], |row| row.get(0))
        .expect("restored title");
    assert_eq!(title, "speech");

    let detached: i64 = audit
        .query_row(
            "SELECT COUNT(1) FROM STATEMENTS WHERE DocumentId <> ?1",
            params![restored_document_id],
            |row| row.get(0),
        )
        .expect("statement ownership");
    assert_eq!(detached, 0);

    for table in VALUE_TABLES {
        let orphans: i64 = audit
            .query_row(
                &format!(
                    "SELECT COUNT(1) FROM {table} \
                     WHERE StatementId NOT IN (SELECT ID FROM STATEMENTS)"
                ),
                [],
                |row| row.get(0),
            )
            .expect("orphan scan");
        assert_eq!(orphans, 0, "{table} has orphaned rows");

        let unresolved: i64 = audit
            .query_row(
                &format!(
                    "SELECT COUNT(1) FROM {table} \
                     WHERE VariableId NOT IN (SELECT ID FROM VARIABLES)"
                ),
                [],
                |row| row.get(0),
            )
            .expect("variable scan");
        assert_eq!(unresolved, 0, "{table} has unresolved variables");
    }
}

#[test]
fn removed_statements_restore_their_values_through_the_catalog() {
    let dir = temp_dir("removed_statements_restore_their_values");
    let mut gateway = open_gateway(&dir);
    let document = seeded_document(&mut gateway);

    let removed = document.statements()[0].clone();
    let removed_id = removed.id();

    let mut stack = HistoryStack::new();
    stack
        .add(
            EventBatch::with_event(
                "remove statement",
                RemoveStatementsEvent::new(document.id(), vec![removed]),
            ),
            &mut gateway,
        )
        .expect("remove statement");

    let audit = audit_conn(&dir);
    assert_eq!(count(&audit, "STATEMENTS"), 2);
    for table in VALUE_TABLES {
        assert_eq!(count(&audit, table), 2, "{table} after removal");
    }

    assert!(stack.undo(&mut gateway).expect("restore statement"));

    assert_eq!(count(&audit, "STATEMENTS"), 3);
    for table in VALUE_TABLES {
        assert_eq!(count(&audit, table), 3, "{table} after restore");
    }

    // AUTOINCREMENT never hands the old id out again.
    let reused: i64 = audit
        .query_row(
            "SELECT COUNT(1) FROM STATEMENTS WHERE ID = ?1",
            params![removed_id],
            |row| row.get(0),
        )
        .expect("reuse scan");
    assert_eq!(reused, 0);
}
