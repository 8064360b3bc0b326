//! Feature encoding: categorical label encoders and the selection -> feature
//! vector mapping the trained model consumes.

pub mod features;
pub mod label;

pub use features::*;
pub use label::*;
