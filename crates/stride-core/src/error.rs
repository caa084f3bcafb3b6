//! Error types for Stride

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input row or request (bad date, negative or fractional steps)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation needs more observations than are available
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the system
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Import(_))
    }

    /// True when the operation lacked data rather than failed
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Error::InsufficientData(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
