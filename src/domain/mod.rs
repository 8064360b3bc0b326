//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the categorical form fields (`Field`) and deployment variants (`Variant`)
//! - historical observations (`PriceRecord`)
//! - user state (`Selection`) and model input (`FeatureVector`)

pub mod types;

pub use types::*;
