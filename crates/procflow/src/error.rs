//! Error types for procflow operations.
//!
//! This module provides the main error type [`FlowError`] which wraps the
//! failures that can surface while loading, laying out or exporting process
//! documents. Layout, routing and diffing themselves are total; malformed
//! entries are filtered rather than reported.

use std::io;

use thiserror::Error;

use procflow_core::identifier::Id;

/// The main error type for procflow operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the `serde_json` error, which carries the line
/// and column of the problem, together with the input text so callers can
/// point into it.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid process document: {err}")]
    Parse { err: serde_json::Error, src: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("unknown process `{0}`")]
    UnknownDocument(Id),
}

impl FlowError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
