//! Reporting utilities: prediction formatting and diagnostics lookup.
//!
//! We keep formatting code in one place so every front-end renders the same
//! text and output changes stay localized.

pub mod format;
pub mod insights;

pub use format::*;
pub use insights::*;
