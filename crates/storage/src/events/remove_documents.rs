#![forbid(unsafe_code)]

use cc_core::model::EditableDocument;

use super::{
    ReversibleEvent, delete_document_row_tx, delete_statement_rows_tx, insert_document_tx,
    insert_statement_tx, insert_value_tx,
};
use crate::error::PersistenceError;
use crate::gateway::{PersistenceGateway, run_in_transaction};

/// Removes documents that already exist, together with every owned statement
/// and coded value, and restores them verbatim on reversal.
pub struct RemoveDocumentsEvent {
    documents: Vec<EditableDocument>,
}

impl RemoveDocumentsEvent {
    pub fn new(documents: Vec<EditableDocument>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[EditableDocument] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<EditableDocument> {
        self.documents
    }
}

impl ReversibleEvent for RemoveDocumentsEvent {
    fn kind(&self) -> &'static str {
        "remove documents"
    }

    fn apply(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let documents = &self.documents;
        run_in_transaction(gateway, "remove documents", |tx| {
            for document in documents.iter() {
                for statement in document
                    .statements()
                    .iter()
                    .filter(|statement| statement.is_persisted())
                {
                    delete_statement_rows_tx(tx, statement.id())?;
                }
                if document.is_persisted() {
                    delete_document_row_tx(tx, document.id())?;
                }
            }
            Ok(())
        })?;
        for document in self.documents.iter_mut() {
            for statement in document.statements_mut() {
                statement.clear_id();
            }
            document.clear_id();
        }
        tracing::debug!("removed {} document(s)", self.documents.len());
        Ok(())
    }

    // Restore order is document, then statements, then values: the only order
    // the foreign-key chain accepts. Generated ids are captured anew and may
    // differ from the ones the rows carried before removal.
    fn reverse(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let documents = &mut self.documents;
        let result = run_in_transaction(gateway, "restore documents", |tx| {
            for document in documents.iter_mut() {
                let document_id = insert_document_tx(tx, document)?;
                document.set_id(document_id);
                for statement in document.statements_mut() {
                    let statement_id = insert_statement_tx(tx, document_id, statement)?;
                    statement.set_id(statement_id);
                    for value in statement.values() {
                        insert_value_tx(tx, statement_id, statement.statement_type_id(), value)?;
                    }
                }
            }
            Ok(())
        });
        if result.is_err() {
            for document in self.documents.iter_mut() {
                for statement in document.statements_mut() {
                    statement.clear_id();
                }
                document.clear_id();
            }
        }
        result
    }
}
