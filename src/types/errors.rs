use thiserror::Error;

#[derive(Debug, Error)]
pub enum DateError {
    #[error("Date error: Value is an empty string")]
    Empty,
    #[error("Date error: Unrecognized date format [{0}]")]
    InvalidFormat(String)
}
