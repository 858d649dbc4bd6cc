//! Common types and utilities for the exchange core
//!
//! This library contains the shared types used across the workspace crates.
//! It provides a unified approach to error handling, numeric precision, and
//! domain models.

pub mod decimal;
pub mod error;
pub mod model;

/// Re-export important types
pub use decimal::*;
pub use error::{Error, ErrorExt, Result};
