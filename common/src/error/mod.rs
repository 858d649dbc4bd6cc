//! Error types for the exchange core
//!
//! This module provides a unified error handling system for the workspace
//! crates. Recoverable submission failures and broken engine invariants are
//! kept as distinct variants so that callers and monitoring can tell a
//! rejected order apart from an engine bug.

use std::fmt::Display;

use thiserror::Error;

/// Exchange core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Order rejected before any book mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lookup against an instrument that has no book yet
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Broken engine invariant; processing for the affected instrument halts
    #[error("Engine fault: {0}")]
    EngineFault(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    Decimal(#[from] rust_decimal::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::Validation(msg) => Error::Validation(format!("{}: {}", context, msg)),
                Error::UnknownInstrument(msg) => {
                    Error::UnknownInstrument(format!("{}: {}", context, msg))
                }
                Error::EngineFault(msg) => Error::EngineFault(format!("{}: {}", context, msg)),
                Error::Serialization(e) => Error::Serialization(e),
                Error::Decimal(e) => Error::Decimal(e),
            }
        })
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::EngineFault(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::EngineFault(message.to_string())
    }
}
