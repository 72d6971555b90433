#![forbid(unsafe_code)]

use cc_core::values::DataType;

use crate::error::PersistenceError;
use crate::gateway::{PersistenceGateway, SqlParam, run_in_transaction};

/// Registers a statement type and returns its generated id.
pub fn define_statement_type(
    gateway: &mut dyn PersistenceGateway,
    label: &str,
) -> Result<i64, PersistenceError> {
    let label = label.to_string();
    run_in_transaction(gateway, "define statement type", move |tx| {
        tx.insert(
            "INSERT INTO STATEMENTTYPES (Label) VALUES (?)",
            &[SqlParam::Text(label)],
        )
        .map_err(|err| PersistenceError::insert_failed("STATEMENTTYPES", err))
    })
}

/// Registers a coded variable under a statement type. Value restoration finds
/// variables through this catalog by (statement type, name).
pub fn define_variable(
    gateway: &mut dyn PersistenceGateway,
    statement_type_id: i64,
    name: &str,
    data_type: DataType,
) -> Result<i64, PersistenceError> {
    let name = name.to_string();
    run_in_transaction(gateway, "define variable", move |tx| {
        tx.insert(
            "INSERT INTO VARIABLES (Variable, DataType, StatementType) VALUES (?, ?, ?)",
            &[
                SqlParam::Text(name),
                SqlParam::Text(data_type.as_str().to_string()),
                SqlParam::Integer(statement_type_id),
            ],
        )
        .map_err(|err| PersistenceError::insert_failed("VARIABLES", err))
    })
}
