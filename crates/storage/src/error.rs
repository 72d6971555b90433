#![forbid(unsafe_code)]

#[derive(Debug)]
pub enum PersistenceError {
    ConnectionUnavailable,
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InsertFailed { table: &'static str, detail: String },
    DeleteFailed { table: &'static str, detail: String },
    UnrecognizedBackend(String),
    RollbackFailed(String),
    InvalidProfile(String),
    InvalidInput(&'static str),
}

impl PersistenceError {
    pub(crate) fn insert_failed(table: &'static str, source: PersistenceError) -> Self {
        Self::InsertFailed {
            table,
            detail: source.to_string(),
        }
    }

    pub(crate) fn delete_failed(table: &'static str, source: PersistenceError) -> Self {
        Self::DeleteFailed {
            table,
            detail: source.to_string(),
        }
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionUnavailable => write!(f, "no active database connection"),
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sql: {err}"),
            Self::InsertFailed { table, detail } => {
                write!(f, "insert into {table} failed: {detail}")
            }
            Self::DeleteFailed { table, detail } => {
                write!(f, "delete from {table} failed: {detail}")
            }
            Self::UnrecognizedBackend(kind) => write!(f, "unrecognized backend kind: {kind}"),
            Self::RollbackFailed(detail) => write!(f, "transaction rollback failed: {detail}"),
            Self::InvalidProfile(detail) => write!(f, "invalid connection profile: {detail}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<std::io::Error> for PersistenceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
