use thiserror::Error;

use crate::store::Requirement;
use crate::txn::Mode;

#[derive(Error, Debug)]
pub enum LexgraphError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("Data corruption: {message}")]
    DataCorruption { message: String },
    #[error("Write outside a transaction on a store whose requirement is {requirement:?}")]
    TransactionCapabilityMismatch { requirement: Requirement },
    #[error("Cannot open a {requested:?} transaction inside an open {open:?} transaction")]
    TransactionModeConflict { open: Mode, requested: Mode },
    #[error("Store does not support transactions")]
    TransactionUnsupported,
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, LexgraphError>;

// Helper conversions
impl From<rusqlite::Error> for LexgraphError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}

impl From<config::ConfigError> for LexgraphError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl<T> From<std::sync::PoisonError<T>> for LexgraphError {
    fn from(e: std::sync::PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}
