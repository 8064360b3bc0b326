//! Local model artifacts.
//!
//! The trained regressor is shipped as JSON in one of two shapes:
//! - `trees`: an additive ensemble of regression trees (gradient boosting)
//! - `linear`: intercept + coefficients
//!
//! Both carry `feature_names`, which must match the configured feature schema
//! exactly (names and order). That check happens once at load time.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, FeatureVector};
use crate::error::{AppError, PredictError};
use crate::models::Predictor;

/// A deserialized model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelArtifact {
    Trees(TreeEnsemble),
    Linear(LinearModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root.
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Leaf {
        leaf: f64,
    },
    /// Go `left` when `x[feature] < threshold`, else `right`. NaN inputs follow
    /// `missing` (default: left).
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

/// Load a model artifact and check it against the served feature schema.
pub fn load_model(path: &Path, schema: FeatureSchema) -> Result<ModelArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::asset_missing(format!("Failed to open model '{}': {e}", path.display())))?;
    let model: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::asset_invalid(format!("Invalid model JSON '{}': {e}", path.display())))?;
    model
        .validate(schema)
        .map_err(|e| AppError::asset_invalid(format!("Model '{}' is unusable: {e}", path.display())))?;
    Ok(model)
}

impl ModelArtifact {
    pub fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::Trees(m) => &m.feature_names,
            ModelArtifact::Linear(m) => &m.feature_names,
        }
    }

    /// Structural checks + feature schema contract.
    pub fn validate(&self, schema: FeatureSchema) -> Result<(), String> {
        let expected = schema.feature_names();
        if self.feature_names().iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(format!(
                "feature names {:?} do not match the {:?} schema {:?}",
                self.feature_names(),
                schema,
                expected
            ));
        }

        let n_features = expected.len();
        match self {
            ModelArtifact::Trees(m) => {
                if m.trees.is_empty() {
                    return Err("tree ensemble has no trees".to_string());
                }
                for (t_idx, tree) in m.trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| format!("tree {t_idx}: {e}"))?;
                }
            }
            ModelArtifact::Linear(m) => {
                if m.coefficients.len() != n_features {
                    return Err(format!(
                        "expected {n_features} coefficients, got {}",
                        m.coefficients.len()
                    ));
                }
            }
        }
        Ok(())
    }

    fn raw_predict(&self, x: &[f64]) -> f64 {
        match self {
            ModelArtifact::Trees(m) => m.base_score + m.trees.iter().map(|t| t.eval(x)).sum::<f64>(),
            ModelArtifact::Linear(m) => {
                m.intercept + m.coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>()
            }
        }
    }
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        let n = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                missing,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!("node {idx} splits on unknown feature {feature}"));
                }
                let children = [Some(*left), Some(*right), *missing];
                if children.into_iter().flatten().any(|c| c >= n || c == idx) {
                    return Err(format!("node {idx} has an out-of-range child"));
                }
            }
        }
        Ok(())
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut idx = 0usize;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match &self.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing,
                } => {
                    let v = x[*feature];
                    idx = if v.is_nan() {
                        missing.unwrap_or(*left)
                    } else if v < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        f64::NAN
    }
}

impl Predictor for ModelArtifact {
    fn describe(&self) -> String {
        match self {
            ModelArtifact::Trees(m) => format!("tree ensemble ({} trees)", m.trees.len()),
            ModelArtifact::Linear(_) => "linear model".to_string(),
        }
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let x = features.values();
        if x.len() != self.feature_names().len() {
            return Err(PredictError::Prediction(format!(
                "feature vector has {} values, model expects {}",
                x.len(),
                self.feature_names().len()
            )));
        }
        let y = self.raw_predict(&x);
        if !y.is_finite() {
            return Err(PredictError::Prediction("model produced a non-finite price".to_string()));
        }
        Ok(y)
    }
}
