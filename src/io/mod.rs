//! Input helpers for the startup assets.
//!
//! - dataset CSV ingest + row validation (`ingest`)
//! - label encoder artifact (`encoders`)
//!
//! Model artifacts are loaded by `crate::models`.

pub mod encoders;
pub mod ingest;

pub use encoders::*;
pub use ingest::*;
