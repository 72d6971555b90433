#![forbid(unsafe_code)]

mod add_documents;
mod add_statements;
mod remove_documents;
mod remove_statements;

pub use add_documents::AddDocumentsEvent;
pub use add_statements::AddStatementsEvent;
pub use remove_documents::RemoveDocumentsEvent;
pub use remove_statements::RemoveStatementsEvent;

use cc_core::model::{CodedStatement, EditableDocument};
use cc_core::values::{Value, VariableValue};

use crate::error::PersistenceError;
use crate::gateway::{GatewayTransaction, PersistenceGateway, SqlParam};

/// One forward/backward persistence action.
///
/// `apply` performs the forward action and writes backend-generated ids into
/// the owned snapshot; `reverse` performs the inverse and returns those ids
/// to the unsaved sentinel. Each call runs inside exactly one transaction:
/// on failure the database is left untouched and no id assigned during the
/// failed call survives on the snapshot.
pub trait ReversibleEvent {
    /// Diagnostic tag.
    fn kind(&self) -> &'static str;

    fn apply(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError>;

    fn reverse(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError>;
}

/// Ordered group of events making up one user-visible undoable action.
pub struct EventBatch {
    label: String,
    events: Vec<Box<dyn ReversibleEvent>>,
}

impl EventBatch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            events: Vec::new(),
        }
    }

    pub fn with_event(label: impl Into<String>, event: impl ReversibleEvent + 'static) -> Self {
        let mut batch = Self::new(label);
        batch.push(event);
        batch
    }

    pub fn push(&mut self, event: impl ReversibleEvent + 'static) {
        self.events.push(Box::new(event));
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Box<dyn ReversibleEvent>] {
        &self.events
    }

    /// Applies events in submission order. Each event commits its own
    /// transaction, so when one fails the already-committed prefix is
    /// reversed again to bring the database back to the pre-batch state.
    pub(crate) fn apply(
        &mut self,
        gateway: &mut dyn PersistenceGateway,
    ) -> Result<(), PersistenceError> {
        for index in 0..self.events.len() {
            if let Err(err) = self.events[index].apply(gateway) {
                for event in self.events[..index].iter_mut().rev() {
                    if let Err(unwind_err) = event.reverse(gateway) {
                        tracing::error!(
                            "could not unwind {} after failed batch '{}': {unwind_err}",
                            event.kind(),
                            self.label
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Reverses events in the opposite order. When one fails, the
    /// already-reversed suffix is re-applied so the batch stays either fully
    /// done or fully undone.
    pub(crate) fn reverse(
        &mut self,
        gateway: &mut dyn PersistenceGateway,
    ) -> Result<(), PersistenceError> {
        for index in (0..self.events.len()).rev() {
            if let Err(err) = self.events[index].reverse(gateway) {
                for event in self.events[index + 1..].iter_mut() {
                    if let Err(replay_err) = event.apply(gateway) {
                        tracing::error!(
                            "could not replay {} after failed undo of '{}': {replay_err}",
                            event.kind(),
                            self.label
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// The four value tables in the fixed delete order.
pub(crate) const VALUE_TABLES: [&str; 4] = [
    "DATABOOLEAN",
    "DATAINTEGER",
    "DATASHORTTEXT",
    "DATALONGTEXT",
];

pub(crate) fn insert_document_tx(
    tx: &mut dyn GatewayTransaction,
    document: &EditableDocument,
) -> Result<i64, PersistenceError> {
    tx.insert(
        "INSERT INTO DOCUMENTS (Title, Text, Coder, Author, Source, Section, Notes, Type, Date) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        &[
            SqlParam::Text(document.title().to_string()),
            SqlParam::Text(document.text().to_string()),
            SqlParam::Integer(document.coder()),
            SqlParam::Text(document.author().to_string()),
            SqlParam::Text(document.source().to_string()),
            SqlParam::Text(document.section().to_string()),
            SqlParam::Text(document.notes().to_string()),
            SqlParam::Text(document.doc_type().to_string()),
            SqlParam::Integer(document.date_ms()),
        ],
    )
    .map_err(|err| PersistenceError::insert_failed("DOCUMENTS", err))
}

pub(crate) fn insert_statement_tx(
    tx: &mut dyn GatewayTransaction,
    document_id: i64,
    statement: &CodedStatement,
) -> Result<i64, PersistenceError> {
    tx.insert(
        "INSERT INTO STATEMENTS (StatementTypeId, DocumentId, Start, Stop, Coder) \
         VALUES (?, ?, ?, ?, ?)",
        &[
            SqlParam::Integer(statement.statement_type_id()),
            SqlParam::Integer(document_id),
            SqlParam::Integer(statement.start()),
            SqlParam::Integer(statement.stop()),
            SqlParam::Integer(statement.coder()),
        ],
    )
    .map_err(|err| PersistenceError::insert_failed("STATEMENTS", err))
}

// The owning variable is resolved by (statement type, name) at insert time,
// never from a cached id: the snapshot does not carry variable ids. If the
// variable was renamed or deleted since the snapshot was taken, this attaches
// to whatever row now carries the name, or fails the transaction when none
// does.
pub(crate) fn insert_value_tx(
    tx: &mut dyn GatewayTransaction,
    statement_id: i64,
    statement_type_id: i64,
    value: &Value,
) -> Result<i64, PersistenceError> {
    let table = value.data_type().table();
    let sql = format!(
        "INSERT INTO {table} (StatementId, VariableId, StatementType, Value) \
         VALUES (?, (SELECT ID FROM VARIABLES WHERE StatementType = ? AND Variable = ?), ?, ?)"
    );
    let bound = match &value.value {
        VariableValue::Boolean(flag) => SqlParam::Integer(i64::from(*flag)),
        VariableValue::Integer(number) => SqlParam::Integer(*number),
        VariableValue::ShortText(text) | VariableValue::LongText(text) => {
            SqlParam::Text(text.clone())
        }
    };
    tx.insert(
        &sql,
        &[
            SqlParam::Integer(statement_id),
            SqlParam::Integer(statement_type_id),
            SqlParam::Text(value.key.clone()),
            SqlParam::Integer(statement_type_id),
            bound,
        ],
    )
    .map_err(|err| PersistenceError::insert_failed(table, err))
}

/// Deletes one statement's value rows and then the statement row.
pub(crate) fn delete_statement_rows_tx(
    tx: &mut dyn GatewayTransaction,
    statement_id: i64,
) -> Result<(), PersistenceError> {
    for table in VALUE_TABLES {
        tx.execute(
            &format!("DELETE FROM {table} WHERE StatementId = ?"),
            &[SqlParam::Integer(statement_id)],
        )
        .map_err(|err| PersistenceError::delete_failed(table, err))?;
    }
    tx.execute(
        "DELETE FROM STATEMENTS WHERE ID = ?",
        &[SqlParam::Integer(statement_id)],
    )
    .map_err(|err| PersistenceError::delete_failed("STATEMENTS", err))?;
    Ok(())
}

pub(crate) fn delete_document_row_tx(
    tx: &mut dyn GatewayTransaction,
    document_id: i64,
) -> Result<(), PersistenceError> {
    tx.execute(
        "DELETE FROM DOCUMENTS WHERE ID = ?",
        &[SqlParam::Integer(document_id)],
    )
    .map_err(|err| PersistenceError::delete_failed("DOCUMENTS", err))?;
    Ok(())
}

/// Cascade delete of everything coded under a document plus the document row
/// itself, value tables scoped through the document's statements.
pub(crate) fn delete_document_cascade_tx(
    tx: &mut dyn GatewayTransaction,
    document_id: i64,
) -> Result<(), PersistenceError> {
    for table in VALUE_TABLES {
        tx.execute(
            &format!(
                "DELETE FROM {table} WHERE StatementId IN \
                 (SELECT ID FROM STATEMENTS WHERE DocumentId = ?)"
            ),
            &[SqlParam::Integer(document_id)],
        )
        .map_err(|err| PersistenceError::delete_failed(table, err))?;
    }
    tx.execute(
        "DELETE FROM STATEMENTS WHERE DocumentId = ?",
        &[SqlParam::Integer(document_id)],
    )
    .map_err(|err| PersistenceError::delete_failed("STATEMENTS", err))?;
    delete_document_row_tx(tx, document_id)
}
