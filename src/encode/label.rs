//! Categorical label encoders.
//!
//! One `LabelEncoder` per form field, all with the same semantics: the label
//! universe is the sorted, deduplicated set of labels seen at training time,
//! and a label's code is its index in that set.

use std::collections::BTreeMap;

use crate::domain::Field;
use crate::error::PredictError;

/// Fixed label -> code bijection for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    field: Field,
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(field: Field, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { field, classes }
    }

    /// The full label universe, sorted.
    pub fn labels(&self) -> &[String] {
        &self.classes
    }

    pub fn code(&self, label: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
            .map(|idx| idx as u32)
    }

    pub fn encode(&self, label: &str) -> Result<u32, PredictError> {
        self.code(label)
            .ok_or_else(|| PredictError::unknown(self.field, label))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// One encoder per `Field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    admin1: LabelEncoder,
    market: LabelEncoder,
    category: LabelEncoder,
    commodity: LabelEncoder,
    unit: LabelEncoder,
}

impl EncoderSet {
    /// Build from per-field label lists. Every field must be present.
    pub fn from_classes(mut classes: BTreeMap<Field, Vec<String>>) -> Result<Self, String> {
        let mut take = |field: Field| {
            classes
                .remove(&field)
                .map(|labels| LabelEncoder::new(field, labels))
                .ok_or_else(|| format!("missing encoder for `{}`", field.column()))
        };
        Ok(Self {
            admin1: take(Field::Admin1)?,
            market: take(Field::Market)?,
            category: take(Field::Category)?,
            commodity: take(Field::Commodity)?,
            unit: take(Field::Unit)?,
        })
    }

    pub fn get(&self, field: Field) -> &LabelEncoder {
        match field {
            Field::Admin1 => &self.admin1,
            Field::Market => &self.market,
            Field::Category => &self.category,
            Field::Commodity => &self.commodity,
            Field::Unit => &self.unit,
        }
    }

    /// Sorted label universe of a field.
    pub fn options(&self, field: Field) -> &[String] {
        self.get(field).labels()
    }
}
