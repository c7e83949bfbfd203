//! Error types for editor commands.

use crate::elements::ElementId;
use thiserror::Error;

/// Errors reported by document, history and session operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("No history entry to restore")]
    HistoryEmpty,
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("Invalid color: {0}")]
    Color(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;
