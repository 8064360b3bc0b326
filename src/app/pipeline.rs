//! Shared startup + predict logic used by every front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> catalog, encoders, model (once) and then
//! selection -> feature vector -> price (per predict action).

use crate::catalog::{Catalog, OptionResolver, build};
use crate::config::AppConfig;
use crate::domain::{FeatureVector, Selection, Variant};
use crate::encode::{EncoderSet, encode};
use crate::error::{AppError, PredictError};
use crate::io::{load_encoders, load_price_records};
use crate::models::{HttpPredictor, Predictor, load_model};

/// Immutable process-wide state, built once and passed by reference.
pub struct Assets {
    pub config: AppConfig,
    pub catalog: Catalog,
    pub encoders: EncoderSet,
    pub predictor: Box<dyn Predictor>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Output of one successful predict action.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub selection: Selection,
    pub features: FeatureVector,
    pub price: f64,
}

impl Assets {
    /// Load every startup asset. Any failure here is fatal for the program.
    pub fn load(config: AppConfig) -> Result<Self, AppError> {
        let schema = config.variant.schema;

        let encoders = load_encoders(&config.encoders_path)?;

        let predictor: Box<dyn Predictor> = match &config.predict_url {
            Some(url) => Box::new(HttpPredictor::new(url.clone(), config.predict_timeout)?),
            None => Box::new(load_model(&config.model_path, schema)?),
        };

        let ingest = load_price_records(&config.data_path, schema.uses_coords())?;
        let catalog = build(&ingest.records);
        if catalog.is_empty() {
            return Err(AppError::asset_invalid(format!(
                "Dataset '{}' produced an empty catalog",
                config.data_path.display()
            )));
        }

        tracing::info!(
            rows_used = ingest.rows_used(),
            rows_dropped = ingest.row_errors.len(),
            provinces = catalog.province_count(),
            markets = catalog.market_count(),
            commodities = catalog.commodity_count(),
            model = %predictor.describe(),
            "assets loaded"
        );

        Ok(Self {
            rows_read: ingest.rows_read,
            rows_dropped: ingest.row_errors.len(),
            config,
            catalog,
            encoders,
            predictor,
        })
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    pub fn resolver(&self) -> OptionResolver<'_> {
        OptionResolver::new(&self.catalog, &self.encoders)
    }

    /// Encode the selection and ask the predictor for a price.
    pub fn predict(&self, selection: &Selection) -> Result<Prediction, PredictError> {
        let features = encode(selection, &self.encoders, &self.catalog, self.config.variant.schema)?;
        let price = self.predictor.predict(&features)?;
        tracing::debug!(
            market = %selection.market,
            commodity = %selection.commodity,
            month = selection.month,
            price,
            "prediction"
        );
        Ok(Prediction {
            selection: selection.clone(),
            features,
            price,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small on-disk asset set shared by pipeline/app tests.

    use std::path::Path;

    pub const DATASET: &str = "\
date,admin1,admin2,market,latitude,longitude,category,commodity,unit,priceflag,pricetype,currency,price
#date,#adm1+name,#adm2+name,#loc+market+name,#geo+lat,#geo+lon,#item+type,#item+name,#item+unit,#item+price+flag,#item+price+type,#currency,#value
2024-01-15,Western,Colombo,Colombo,6.93,79.85,cereals and tubers,Rice (red),KG,actual,Retail,LKR,220
2024-01-15,Western,Colombo,Colombo,6.93,79.85,oil and fats,Coconut oil,L,actual,Retail,LKR,900
2024-01-15,Western,Gampaha,Gampaha,7.09,80.00,vegetables and fruits,Onions (red),KG,actual,Retail,LKR,400
2024-01-15,Central,Kandy,Kandy,7.29,80.63,cereals and tubers,Rice (red),KG,actual,Retail,LKR,230
2024-01-15,Central,Kandy,Kandy,7.29,80.63,miscellaneous food,Eggs,Unit,actual,Retail,LKR,45
";

    pub const ENCODERS: &str = r#"{
        "admin1": ["Central", "Western"],
        "market": ["Colombo", "Gampaha", "Kandy", "Trincomalee"],
        "category": ["cereals and tubers", "miscellaneous food", "oil and fats", "vegetables and fruits"],
        "commodity": ["Coconut oil", "Eggs", "Onions (red)", "Rice (red)"],
        "unit": ["KG", "L", "Unit"]
    }"#;

    /// month < 6.5 -> 1000, else 1200.
    pub const MODEL: &str = r#"{
        "kind": "trees",
        "feature_names": ["year","month","latitude","longitude","admin1_enc","market_enc","category_enc","commodity_enc","unit_enc"],
        "base_score": 0.0,
        "trees": [{"nodes": [
            {"feature": 1, "threshold": 6.5, "left": 1, "right": 2},
            {"leaf": 1000.0},
            {"leaf": 1200.0}
        ]}]
    }"#;

    pub fn write_assets(dir: &Path) -> crate::config::AppConfig {
        std::fs::write(dir.join("prices.csv"), DATASET).unwrap();
        std::fs::write(dir.join("encoders.json"), ENCODERS).unwrap();
        std::fs::write(dir.join("model.json"), MODEL).unwrap();
        crate::config::AppConfig {
            data_path: dir.join("prices.csv"),
            model_path: dir.join("model.json"),
            encoders_path: dir.join("encoders.json"),
            outputs_dir: dir.join("outputs"),
            ..crate::config::AppConfig::default()
        }
    }
}
