//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be shared by the
//! catalog, the encoder, the predictors and every front-end.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The only year the model is asked about.
pub const PREDICTION_YEAR: i32 = 2026;

/// Valid month range for a selection.
pub const MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// A categorical field of the form.
///
/// Each field has its own label encoder; the serialized name matches the
/// dataset column and the encoder artifact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// Province (`admin1` in the dataset).
    #[value(name = "province", alias = "admin1")]
    #[serde(rename = "admin1")]
    Admin1,
    Market,
    Category,
    Commodity,
    Unit,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Admin1,
        Field::Market,
        Field::Category,
        Field::Commodity,
        Field::Unit,
    ];

    /// Dataset column and encoder artifact key.
    pub fn column(self) -> &'static str {
        match self {
            Field::Admin1 => "admin1",
            Field::Market => "market",
            Field::Category => "category",
            Field::Commodity => "commodity",
            Field::Unit => "unit",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Admin1 => "Province",
            Field::Market => "Market",
            Field::Category => "Category",
            Field::Commodity => "Commodity",
            Field::Unit => "Unit",
        }
    }

    /// Name of the encoded model feature.
    pub fn feature_name(self) -> &'static str {
        match self {
            Field::Admin1 => "admin1_enc",
            Field::Market => "market_enc",
            Field::Category => "category_enc",
            Field::Commodity => "commodity_enc",
            Field::Unit => "unit_enc",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Which feature layout the served model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureSchema {
    /// `year, month, latitude, longitude, admin1_enc, ..., unit_enc`
    WithCoords,
    /// `year, month, admin1_enc, ..., unit_enc`
    WithoutCoords,
}

const NAMES_WITH_COORDS: [&str; 9] = [
    "year",
    "month",
    "latitude",
    "longitude",
    "admin1_enc",
    "market_enc",
    "category_enc",
    "commodity_enc",
    "unit_enc",
];

const NAMES_WITHOUT_COORDS: [&str; 7] = [
    "year",
    "month",
    "admin1_enc",
    "market_enc",
    "category_enc",
    "commodity_enc",
    "unit_enc",
];

impl FeatureSchema {
    /// Ordered feature names the model expects.
    pub fn feature_names(self) -> &'static [&'static str] {
        match self {
            FeatureSchema::WithCoords => &NAMES_WITH_COORDS,
            FeatureSchema::WithoutCoords => &NAMES_WITHOUT_COORDS,
        }
    }

    pub fn uses_coords(self) -> bool {
        matches!(self, FeatureSchema::WithCoords)
    }
}

/// How the category/commodity dropdowns are narrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOrder {
    /// Categories come from the market; commodities from (market, category).
    MarketFirst,
    /// Categories are unfiltered; commodities come from the category alone.
    CategoryFirst,
}

/// A deployment flavour of the form: which features the model wants and how
/// options cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub schema: FeatureSchema,
    pub filter_order: FilterOrder,
}

impl Default for Variant {
    fn default() -> Self {
        Self {
            schema: FeatureSchema::WithCoords,
            filter_order: FilterOrder::MarketFirst,
        }
    }
}

/// One historical price observation (only the columns the form needs).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub province: String,
    pub market: String,
    pub category: String,
    pub commodity: String,
    pub unit: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PriceRecord {
    pub fn label(&self, field: Field) -> &str {
        match field {
            Field::Admin1 => &self.province,
            Field::Market => &self.market,
            Field::Category => &self.category,
            Field::Commodity => &self.commodity,
            Field::Unit => &self.unit,
        }
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// True when every categorical field carries a value.
    pub fn is_complete(&self) -> bool {
        Field::ALL.iter().all(|f| !self.label(*f).trim().is_empty())
    }
}

/// The user's current choices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub province: String,
    pub market: String,
    pub category: String,
    pub commodity: String,
    pub unit: String,
    pub month: u32,
}

impl Selection {
    /// Year is not user-selectable.
    pub fn year(&self) -> i32 {
        PREDICTION_YEAR
    }

    pub fn label(&self, field: Field) -> &str {
        match field {
            Field::Admin1 => &self.province,
            Field::Market => &self.market,
            Field::Category => &self.category,
            Field::Commodity => &self.commodity,
            Field::Unit => &self.unit,
        }
    }

    pub fn set_label(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Admin1 => self.province = value,
            Field::Market => self.market = value,
            Field::Category => self.category = value,
            Field::Commodity => self.commodity = value,
            Field::Unit => self.unit = value,
        }
    }
}

/// Encoded model input for one prediction request.
///
/// `coords` is `Some` exactly when the vector was built for
/// `FeatureSchema::WithCoords`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub year: i32,
    pub month: u32,
    pub coords: Option<(f64, f64)>,
    pub admin1_enc: u32,
    pub market_enc: u32,
    pub category_enc: u32,
    pub commodity_enc: u32,
    pub unit_enc: u32,
}

impl FeatureVector {
    pub fn schema(&self) -> FeatureSchema {
        if self.coords.is_some() {
            FeatureSchema::WithCoords
        } else {
            FeatureSchema::WithoutCoords
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.schema().feature_names()
    }

    /// Values in the exact order of `names()`.
    pub fn values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(9);
        out.push(self.year as f64);
        out.push(self.month as f64);
        if let Some((lat, lon)) = self.coords {
            out.push(lat);
            out.push(lon);
        }
        out.push(self.admin1_enc as f64);
        out.push(self.market_enc as f64);
        out.push(self.category_enc as f64);
        out.push(self.commodity_enc as f64);
        out.push(self.unit_enc as f64);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(coords: Option<(f64, f64)>) -> FeatureVector {
        FeatureVector {
            year: 2026,
            month: 3,
            coords,
            admin1_enc: 1,
            market_enc: 2,
            category_enc: 3,
            commodity_enc: 4,
            unit_enc: 5,
        }
    }

    #[test]
    fn values_follow_schema_order() {
        let v = vector(Some((6.9, 79.8)));
        assert_eq!(v.names(), FeatureSchema::WithCoords.feature_names());
        assert_eq!(v.values(), vec![2026.0, 3.0, 6.9, 79.8, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let v = vector(None);
        assert_eq!(v.names().len(), 7);
        assert_eq!(v.values(), vec![2026.0, 3.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn incomplete_record_is_detected() {
        let rec = PriceRecord {
            province: "Western".to_string(),
            market: "Colombo".to_string(),
            category: " ".to_string(),
            commodity: "Rice".to_string(),
            unit: "KG".to_string(),
            latitude: None,
            longitude: None,
        };
        assert!(!rec.is_complete());
        assert_eq!(rec.coords(), None);
    }
}
