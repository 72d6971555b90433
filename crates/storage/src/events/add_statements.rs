#![forbid(unsafe_code)]

use cc_core::model::CodedStatement;

use super::{ReversibleEvent, delete_statement_rows_tx, insert_statement_tx, insert_value_tx};
use crate::error::PersistenceError;
use crate::gateway::{PersistenceGateway, run_in_transaction};

/// Inserts newly coded statements, with their values, under a document that
/// is already persisted.
pub struct AddStatementsEvent {
    document_id: i64,
    statements: Vec<CodedStatement>,
}

impl AddStatementsEvent {
    pub fn new(document_id: i64, statements: Vec<CodedStatement>) -> Self {
        Self {
            document_id,
            statements,
        }
    }

    pub fn document_id(&self) -> i64 {
        self.document_id
    }

    pub fn statements(&self) -> &[CodedStatement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<CodedStatement> {
        self.statements
    }
}

impl ReversibleEvent for AddStatementsEvent {
    fn kind(&self) -> &'static str {
        "add statements"
    }

    fn apply(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let document_id = self.document_id;
        let statements = &mut self.statements;
        let result = run_in_transaction(gateway, "add statements", |tx| {
            for statement in statements.iter_mut() {
                let statement_id = insert_statement_tx(tx, document_id, statement)?;
                statement.set_id(statement_id);
                for value in statement.values() {
                    insert_value_tx(tx, statement_id, statement.statement_type_id(), value)?;
                }
            }
            Ok(())
        });
        if result.is_err() {
            for statement in self.statements.iter_mut() {
                statement.clear_id();
            }
        }
        result
    }

    fn reverse(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let statements = &self.statements;
        run_in_transaction(gateway, "remove added statements", |tx| {
            for statement in statements
                .iter()
                .filter(|statement| statement.is_persisted())
            {
                delete_statement_rows_tx(tx, statement.id())?;
            }
            Ok(())
        })?;
        for statement in self.statements.iter_mut() {
            statement.clear_id();
        }
        Ok(())
    }
}
