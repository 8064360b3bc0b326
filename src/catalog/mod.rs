//! Dataset-derived lookup tables and the option resolver built on them.

pub mod builder;
pub mod resolver;

pub use builder::*;
pub use resolver::*;
