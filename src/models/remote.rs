//! Remote prediction service client.
//!
//! Posts the encoded feature vector as JSON and reads back a scalar price.
//! Blocking, single attempt, no retries: a failure surfaces immediately to the
//! predict action that triggered it.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;
use crate::error::{AppError, PredictError};
use crate::models::Predictor;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    features: BTreeMap<&'a str, f64>,
    order: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    price: f64,
}

pub struct HttpPredictor {
    client: Client,
    url: String,
}

impl HttpPredictor {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::asset_invalid(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Predictor for HttpPredictor {
    fn describe(&self) -> String {
        format!("remote service at {}", self.url)
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let names = features.names();
        let values = features.values();
        let body = PredictRequest {
            features: names.iter().copied().zip(values).collect(),
            order: names,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| PredictError::Prediction(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictError::Prediction(format!("service returned HTTP {status}")));
        }

        let parsed: PredictResponse = resp
            .json()
            .map_err(|e| PredictError::Prediction(format!("invalid response: {e}")))?;

        if !parsed.price.is_finite() {
            return Err(PredictError::Prediction("service returned a non-finite price".to_string()));
        }
        Ok(parsed.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_names_and_order() {
        let v = FeatureVector {
            year: 2026,
            month: 2,
            coords: None,
            admin1_enc: 1,
            market_enc: 2,
            category_enc: 3,
            commodity_enc: 4,
            unit_enc: 5,
        };
        let names = v.names();
        let body = PredictRequest {
            features: names.iter().copied().zip(v.values()).collect(),
            order: names,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["features"]["month"], 2.0);
        assert_eq!(json["features"]["unit_enc"], 5.0);
        assert_eq!(json["order"][0], "year");
        assert_eq!(json["order"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn unreachable_service_is_a_prediction_error() {
        let predictor = HttpPredictor::new("http://127.0.0.1:9/predict", Duration::from_millis(200)).unwrap();
        let v = FeatureVector {
            year: 2026,
            month: 1,
            coords: Some((0.0, 0.0)),
            admin1_enc: 0,
            market_enc: 0,
            category_enc: 0,
            commodity_enc: 0,
            unit_enc: 0,
        };
        assert!(matches!(predictor.predict(&v), Err(PredictError::Prediction(_))));
    }
}
