//! Formatted output for predictions.
//!
//! Everything here is a pure function of its inputs so the TUI, the prompt mode
//! and the scripted commands all render the same text.

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::pipeline::Prediction;
use crate::domain::{PREDICTION_YEAR, Selection};

pub const CONFIDENCE_LABEL: &str = "Medium";
pub const CONFIDENCE_NOTE: &str = "1 year ahead — reasonable estimate based on 2004-2025 data.";
pub const CRISIS_NOTE: &str = "Post-2022 prices reflect crisis period.";
const CRISIS_FROM_YEAR: i32 = 2022;

const PIECE_UNITS: [&str; 5] = ["piece", "pieces", "each", "unit", "pcs"];
const LITRE_UNITS: [&str; 4] = ["l", "litre", "liter", "lt"];

/// Unit-derived hint shown under the price.
///
/// The divide-by-10 assumes the quoted unit is exactly 1 kg / 1 L; labels like
/// "500 G" are not converted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SecondaryValue {
    PerHundredGrams(f64),
    PerHundredMillilitres(f64),
    PerPiece,
}

impl SecondaryValue {
    pub fn amount(self) -> Option<f64> {
        match self {
            SecondaryValue::PerHundredGrams(v) | SecondaryValue::PerHundredMillilitres(v) => Some(v),
            SecondaryValue::PerPiece => None,
        }
    }
}

impl std::fmt::Display for SecondaryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecondaryValue::PerHundredGrams(v) => write!(f, "≈ LKR {} per 100g", format_amount(*v)),
            SecondaryValue::PerHundredMillilitres(v) => write!(f, "≈ LKR {} per 100ml", format_amount(*v)),
            SecondaryValue::PerPiece => f.write_str("Price shown is per individual piece"),
        }
    }
}

/// Derive the secondary display value from the predicted price and unit.
pub fn secondary_value(price: f64, unit: &str) -> Option<SecondaryValue> {
    let unit = unit.to_lowercase();
    if unit == "kg" {
        Some(SecondaryValue::PerHundredGrams(price / 10.0))
    } else if LITRE_UNITS.contains(&unit.as_str()) {
        Some(SecondaryValue::PerHundredMillilitres(price / 10.0))
    } else if PIECE_UNITS.contains(&unit.as_str()) {
        Some(SecondaryValue::PerPiece)
    } else {
        None
    }
}

/// Full month name, e.g. `January`.
pub fn month_name(month: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(PREDICTION_YEAR, month, 1).map(|d| d.format("%B").to_string())
}

/// Month + prediction year, e.g. `January 2026`.
pub fn month_label(month: u32) -> String {
    NaiveDate::from_ymd_opt(PREDICTION_YEAR, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("month {month} {PREDICTION_YEAR}"))
}

/// Headline price, rounded to whole rupees: `₨ 1,235`.
pub fn format_price(price: f64) -> String {
    format!("₨ {}", group_thousands(&format!("{:.0}", price)))
}

/// Two decimals with thousands separators: `1,234.50`.
pub fn format_amount(value: f64) -> String {
    group_thousands(&format!("{value:.2}"))
}

fn group_thousands(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Everything a front-end shows for one successful prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub period: String,
    pub price: f64,
    pub price_text: String,
    pub secondary: Option<SecondaryValue>,
    pub secondary_text: String,
    pub confidence: &'static str,
    pub confidence_note: &'static str,
    pub crisis_note: Option<&'static str>,
    pub item: String,
    pub place: String,
    pub selection: Selection,
}

impl PredictionView {
    pub fn new(prediction: &Prediction) -> Self {
        let sel = &prediction.selection;
        let secondary = secondary_value(prediction.price, &sel.unit);
        Self {
            period: month_label(sel.month),
            price: prediction.price,
            price_text: format_price(prediction.price),
            secondary,
            secondary_text: secondary.map(|s| s.to_string()).unwrap_or_default(),
            confidence: CONFIDENCE_LABEL,
            confidence_note: CONFIDENCE_NOTE,
            crisis_note: (sel.year() >= CRISIS_FROM_YEAR).then_some(CRISIS_NOTE),
            item: format!("{} ({})", sel.commodity, sel.unit),
            place: format!("{}, {}", sel.market, sel.province),
            selection: sel.clone(),
        }
    }
}

/// Plain-text block for terminal output.
pub fn format_prediction(view: &PredictionView) -> String {
    let mut out = String::new();
    out.push_str(&format!("Estimated price for {}\n", view.period));
    out.push_str(&format!("  {}\n", view.price_text));
    if !view.secondary_text.is_empty() {
        out.push_str(&format!("  {}\n", view.secondary_text));
    }
    out.push_str(&format!("Confidence: {} — {}\n", view.confidence, view.confidence_note));
    out.push_str(&format!("Details: {} | {}\n", view.item, view.place));
    if let Some(note) = view.crisis_note {
        out.push_str(note);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kg_shows_per_hundred_grams() {
        let s = secondary_value(1000.0, "kg").unwrap();
        assert_eq!(s, SecondaryValue::PerHundredGrams(100.0));
        assert_eq!(s.to_string(), "≈ LKR 100.00 per 100g");
        assert_eq!(secondary_value(1000.0, "KG").unwrap().amount(), Some(100.0));
    }

    #[test]
    fn litre_spellings_show_per_hundred_ml() {
        for unit in ["L", "litre", "Liter", "LT"] {
            assert_eq!(
                secondary_value(250.0, unit),
                Some(SecondaryValue::PerHundredMillilitres(25.0)),
                "unit {unit}"
            );
        }
    }

    #[test]
    fn piece_units_show_note_not_number() {
        let s = secondary_value(500.0, "each").unwrap();
        assert_eq!(s, SecondaryValue::PerPiece);
        assert_eq!(s.amount(), None);
        assert_eq!(s.to_string(), "Price shown is per individual piece");
        assert_eq!(secondary_value(500.0, "Unit"), Some(SecondaryValue::PerPiece));
    }

    #[test]
    fn other_units_have_no_secondary_value() {
        assert_eq!(secondary_value(200.0, "bag"), None);
        assert_eq!(secondary_value(200.0, "500 G"), None);
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label(1), "January 2026");
        assert_eq!(month_label(12), "December 2026");
        assert_eq!(month_name(6).as_deref(), Some("June"));
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn prices_are_grouped() {
        assert_eq!(format_price(1234.6), "₨ 1,235");
        assert_eq!(format_price(999.0), "₨ 999");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-1500.0), "-1,500.00");
        assert_eq!(format_amount(12.5), "12.50");
    }
}
