use thiserror::Error;
use tokio::task::JoinError;

use crate::client::ClientError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Export task did not complete: {0}")]
    Task(#[from] JoinError)
}
