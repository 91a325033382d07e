//! Error types for classdav operations.

use thiserror::Error;

/// Errors that can occur while converting and syncing schedules.
#[derive(Error, Debug)]
pub enum ClassdavError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No calendar collection found for document '{0}'")]
    NoCollection(String),

    #[error("CalDAV error: {0}")]
    Caldav(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for classdav operations.
pub type ClassdavResult<T> = Result<T, ClassdavError>;
