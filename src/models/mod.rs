//! Price predictors.
//!
//! The rest of the crate only sees the `Predictor` trait; the concrete model is
//! either a local JSON artifact or a remote service.

use crate::domain::FeatureVector;
use crate::error::PredictError;

pub mod model;
pub mod remote;

pub use model::*;
pub use remote::*;

/// `predict(features) -> price`.
pub trait Predictor: Send + Sync {
    /// Short description for logs and the catalog summary.
    fn describe(&self) -> String;

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError>;
}
