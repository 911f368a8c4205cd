//! Unified application error type.
//! Every layer (db, gateway, capture, cli) returns AppError so the binary
//! has a single place where failures are reported.

use crate::gateway::GatewayError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Local database
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Storage backends
    // ---------------------------
    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    // ---------------------------
    // Host page / watcher
    // ---------------------------
    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Host document error: {0}")]
    Host(String),

    #[error("Page script error at line {line}: {message}")]
    Script { line: usize, message: String },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Already shown to the user; only the exit status is left to set
    // ---------------------------
    #[error("operation failed")]
    Reported,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
