#![forbid(unsafe_code)]

mod catalog;
mod error;
mod events;
mod gateway;
mod history;
mod profile;
mod schema;

pub use catalog::{define_statement_type, define_variable};
pub use error::PersistenceError;
pub use events::{
    AddDocumentsEvent, AddStatementsEvent, EventBatch, RemoveDocumentsEvent,
    RemoveStatementsEvent, ReversibleEvent,
};
pub use gateway::{
    GatewayTransaction, PersistenceGateway, SqlParam, SqliteGateway, run_in_transaction,
};
pub use history::HistoryStack;
pub use profile::{BackendKind, ConnectionProfile};
