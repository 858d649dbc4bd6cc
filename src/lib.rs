//! Test metapackage for the workspace
//!
//! The root package exists to host the workspace-level integration tests
//! under `tests/`; the engine itself lives in the member crates.

pub use common;
pub use matching_engine;
