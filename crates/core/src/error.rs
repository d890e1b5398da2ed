//! Error types for opening-trainer-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid or unsupported backup version: {0}")]
    UnsupportedBackupVersion(String),

    #[error("Unknown opening: {0}")]
    UnknownOpening(String),

    #[error("Opening {opening} has an illegal move {san} at ply {ply}")]
    InvalidLine {
        opening: String,
        ply: usize,
        san: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
