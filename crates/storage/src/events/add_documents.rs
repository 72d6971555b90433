#![forbid(unsafe_code)]

use cc_core::model::EditableDocument;

use super::{ReversibleEvent, delete_document_cascade_tx, insert_document_tx};
use crate::error::PersistenceError;
use crate::gateway::{PersistenceGateway, run_in_transaction};

/// Inserts a batch of new documents. New documents carry no statements yet;
/// the reversal still cascades over anything coded under them after insertion.
pub struct AddDocumentsEvent {
    documents: Vec<EditableDocument>,
}

impl AddDocumentsEvent {
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

impl ReversibleEvent for AddDocumentsEvent {
    fn kind(&self) -> &'static str {
        "add documents"
    }

    fn apply(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let documents = &mut self.documents;
        let result = run_in_transaction(gateway, "add documents", |tx| {
            for document in documents.iter_mut() {
                let id = insert_document_tx(tx, document)?;
                document.set_id(id);
            }
            Ok(())
        });
        if result.is_err() {
            for document in self.documents.iter_mut() {
                document.clear_id();
            }
        } else {
            tracing::debug!("inserted {} document(s)", self.documents.len());
        }
        result
    }

    fn reverse(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let documents = &self.documents;
        run_in_transaction(gateway, "remove added documents", |tx| {
            for document in documents.iter().filter(|document| document.is_persisted()) {
                delete_document_cascade_tx(tx, document.id())?;
            }
            Ok(())
        })?;
        for document in self.documents.iter_mut() {
            document.clear_id();
        }
        Ok(())
    }
}
