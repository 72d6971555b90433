#![forbid(unsafe_code)]

use rusqlite::Connection;

use crate::error::PersistenceError;

/// Installs the coding schema. Idempotent; runs on every gateway open.
///
/// Child rows are always deleted explicitly in dependency order; the cascade
/// clauses mirror the same ownership chain at the schema level.
pub(crate) fn install_schema(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS STATEMENTTYPES (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          Label TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS DOCUMENTS (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          Title TEXT NOT NULL,
          Text TEXT NOT NULL,
          Coder INTEGER NOT NULL,
          Author TEXT NOT NULL,
          Source TEXT NOT NULL,
          Section TEXT NOT NULL,
          Notes TEXT NOT NULL,
          Type TEXT NOT NULL,
          Date INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS STATEMENTS (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          StatementTypeId INTEGER NOT NULL,
          DocumentId INTEGER NOT NULL,
          Start INTEGER NOT NULL,
          Stop INTEGER NOT NULL,
          Coder INTEGER NOT NULL,
          FOREIGN KEY(StatementTypeId) REFERENCES STATEMENTTYPES(ID),
          FOREIGN KEY(DocumentId) REFERENCES DOCUMENTS(ID) ON DELETE CASCADE,
          CHECK(Start < Stop)
        );

        CREATE INDEX IF NOT EXISTS idx_statements_document ON STATEMENTS(DocumentId);

        CREATE TABLE IF NOT EXISTS VARIABLES (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          Variable TEXT NOT NULL,
          DataType TEXT NOT NULL,
          StatementType INTEGER NOT NULL,
          FOREIGN KEY(StatementType) REFERENCES STATEMENTTYPES(ID),
          UNIQUE(StatementType, Variable)
        );

        CREATE TABLE IF NOT EXISTS DATABOOLEAN (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          StatementId INTEGER NOT NULL,
          VariableId INTEGER NOT NULL,
          StatementType INTEGER NOT NULL,
          Value INTEGER NOT NULL,
          FOREIGN KEY(StatementId) REFERENCES STATEMENTS(ID) ON DELETE CASCADE,
          FOREIGN KEY(VariableId) REFERENCES VARIABLES(ID)
        );

        CREATE TABLE IF NOT EXISTS DATAINTEGER (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          StatementId INTEGER NOT NULL,
          VariableId INTEGER NOT NULL,
          StatementType INTEGER NOT NULL,
          Value INTEGER NOT NULL,
          FOREIGN KEY(StatementId) REFERENCES STATEMENTS(ID) ON DELETE CASCADE,
          FOREIGN KEY(VariableId) REFERENCES VARIABLES(ID)
        );

        CREATE TABLE IF NOT EXISTS DATASHORTTEXT (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          StatementId INTEGER NOT NULL,
          VariableId INTEGER NOT NULL,
          StatementType INTEGER NOT NULL,
          Value TEXT NOT NULL,
          FOREIGN KEY(StatementId) REFERENCES STATEMENTS(ID) ON DELETE CASCADE,
          FOREIGN KEY(VariableId) REFERENCES VARIABLES(ID)
        );

        CREATE TABLE IF NOT EXISTS DATALONGTEXT (
          ID INTEGER PRIMARY KEY AUTOINCREMENT,
          StatementId INTEGER NOT NULL,
          VariableId INTEGER NOT NULL,
          StatementType INTEGER NOT NULL,
          Value TEXT NOT NULL,
          FOREIGN KEY(StatementId) REFERENCES STATEMENTS(ID) ON DELETE CASCADE,
          FOREIGN KEY(VariableId) REFERENCES VARIABLES(ID)
        );

        CREATE INDEX IF NOT EXISTS idx_databoolean_statement ON DATABOOLEAN(StatementId);
        CREATE INDEX IF NOT EXISTS idx_datainteger_statement ON DATAINTEGER(StatementId);
        CREATE INDEX IF NOT EXISTS idx_datashorttext_statement ON DATASHORTTEXT(StatementId);
        CREATE INDEX IF NOT EXISTS idx_datalongtext_statement ON DATALONGTEXT(StatementId);
        "#,
    )?;
    Ok(())
}
