use thiserror::Error;

/// Why one poll of the status endpoint produced no snapshot.
/// Every variant is handled the same way: log, keep the last-known view, wait for the next tick.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("status endpoint answered HTTP {0}")]
    Status(u16),
    #[error("malformed status payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure to apply one instruction to the view container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("row {0} is not in the table")]
    UnknownRow(String),
    #[error("cell {0} is not in the table")]
    UnknownCell(String),
    #[error("row {0} already exists")]
    DuplicateRow(String),
}
