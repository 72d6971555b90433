#![forbid(unsafe_code)]

use rusqlite::{Connection, params_from_iter};
use std::time::Duration;

use crate::error::PersistenceError;
use crate::profile::{BackendKind, ConnectionProfile};
use crate::schema::install_schema;

/// Parameter bound into a backend-neutral SQL statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlParam {
    Integer(i64),
    Text(String),
    Null,
}

impl rusqlite::ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, Value, ValueRef};
        Ok(match self {
            Self::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            Self::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

/// One open database transaction. Every statement of one logical operation
/// runs through the same handle; committing or rolling back consumes it, and
/// a handle dropped without either must roll back.
pub trait GatewayTransaction {
    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> Result<usize, PersistenceError>;

    /// Runs an INSERT and returns the backend-generated row id.
    fn insert(&mut self, sql: &str, params: &[SqlParam]) -> Result<i64, PersistenceError>;

    fn commit(self: Box<Self>) -> Result<(), PersistenceError>;

    fn rollback(self: Box<Self>) -> Result<(), PersistenceError>;
}

/// Hands out transactions against one live database connection. Event logic
/// is written only against this trait, so embedded and client/server engines
/// can differ in how they acquire connections without changing behavior.
pub trait PersistenceGateway {
    fn backend(&self) -> BackendKind;

    fn begin_transaction(
        &mut self,
    ) -> Result<Box<dyn GatewayTransaction + '_>, PersistenceError>;
}

/// Embedded backend over a single-file or in-memory SQLite database.
#[derive(Debug)]
pub struct SqliteGateway {
    conn: Option<Connection>,
    backend: BackendKind,
}

impl SqliteGateway {
    pub fn open(profile: &ConnectionProfile) -> Result<Self, PersistenceError> {
        let conn = match profile.backend {
            BackendKind::EmbeddedFile => {
                let Some(path) = profile.path.as_deref() else {
                    return Err(PersistenceError::InvalidProfile(
                        "file backend requires a path".to_string(),
                    ));
                };
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let conn = Connection::open(path)?;
                conn.busy_timeout(Duration::from_secs(5))?;
                conn.execute_batch(
                    "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
                )?;
                conn
            }
            BackendKind::EmbeddedMemory => {
                let conn = Connection::open_in_memory()?;
                conn.execute_batch("PRAGMA foreign_keys=ON;")?;
                conn
            }
        };

        install_schema(&conn)?;

        Ok(Self {
            conn: Some(conn),
            backend: profile.backend,
        })
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Drops the connection. Later transactions report `ConnectionUnavailable`
    /// until a fresh gateway is opened.
    pub fn close(&mut self) {
        self.conn = None;
    }
}

impl PersistenceGateway for SqliteGateway {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn begin_transaction(
        &mut self,
    ) -> Result<Box<dyn GatewayTransaction + '_>, PersistenceError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or(PersistenceError::ConnectionUnavailable)?;
        let tx = conn.transaction()?;
        Ok(Box::new(SqliteTransaction { tx: Some(tx) }))
    }
}

struct SqliteTransaction<'conn> {
    tx: Option<rusqlite::Transaction<'conn>>,
}

impl<'conn> SqliteTransaction<'conn> {
    fn live(&self) -> Result<&rusqlite::Transaction<'conn>, PersistenceError> {
        self.tx
            .as_ref()
            .ok_or(PersistenceError::InvalidInput("transaction already finished"))
    }
}

impl GatewayTransaction for SqliteTransaction<'_> {
    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> Result<usize, PersistenceError> {
        Ok(self.live()?.execute(sql, params_from_iter(params.iter()))?)
    }

    fn insert(&mut self, sql: &str, params: &[SqlParam]) -> Result<i64, PersistenceError> {
        let tx = self.live()?;
        tx.execute(sql, params_from_iter(params.iter()))?;
        Ok(tx.last_insert_rowid())
    }

    fn commit(mut self: Box<Self>) -> Result<(), PersistenceError> {
        let tx = self
            .tx
            .take()
            .ok_or(PersistenceError::InvalidInput("transaction already finished"))?;
        Ok(tx.commit()?)
    }

    fn rollback(mut self: Box<Self>) -> Result<(), PersistenceError> {
        let tx = self
            .tx
            .take()
            .ok_or(PersistenceError::InvalidInput("transaction already finished"))?;
        tx.rollback()
            .map_err(|err| PersistenceError::RollbackFailed(err.to_string()))
    }
}

/// Runs one logical operation inside a single transaction: commit when the
/// body succeeds, explicit rollback when it fails. A rollback that itself
/// fails is escalated to `RollbackFailed`, since the persisted state can no
/// longer be trusted.
pub fn run_in_transaction<R, F>(
    gateway: &mut dyn PersistenceGateway,
    operation: &'static str,
    body: F,
) -> Result<R, PersistenceError>
where
    F: FnOnce(&mut dyn GatewayTransaction) -> Result<R, PersistenceError>,
{
    let mut tx = gateway.begin_transaction()?;
    match body(tx.as_mut()) {
        Ok(result) => {
            tx.commit()?;
            Ok(result)
        }
        Err(err) => {
            tracing::error!("{operation} failed, rolling back: {err}");
            match tx.rollback() {
                Ok(()) => Err(err),
                Err(rollback_err) => {
                    tracing::error!(
                        "rollback after failed {operation} did not complete: {rollback_err}"
                    );
                    Err(rollback_err)
                }
            }
        }
    }
}
