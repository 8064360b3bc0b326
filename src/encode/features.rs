//! Selection -> model feature vector.

use crate::catalog::Catalog;
use crate::domain::{FeatureSchema, FeatureVector, Field, MONTHS, Selection};
use crate::encode::EncoderSet;
use crate::error::PredictError;

/// Coordinates used when the market has no known location.
pub const DEFAULT_COORDS: (f64, f64) = (0.0, 0.0);

/// Fields are checked in this order; the first unknown label wins.
const ENCODE_ORDER: [Field; 5] = [
    Field::Market,
    Field::Commodity,
    Field::Admin1,
    Field::Category,
    Field::Unit,
];

/// Encode a completed selection for the model trained on `schema`.
pub fn encode(
    selection: &Selection,
    encoders: &EncoderSet,
    catalog: &Catalog,
    schema: FeatureSchema,
) -> Result<FeatureVector, PredictError> {
    let mut codes = [0u32; 5];
    for field in ENCODE_ORDER {
        codes[field as usize] = encoders.get(field).encode(selection.label(field))?;
    }

    if !MONTHS.contains(&selection.month) {
        return Err(PredictError::InvalidMonth(selection.month));
    }

    let coords = schema.uses_coords().then(|| {
        catalog
            .coords_for(&selection.market)
            .unwrap_or(DEFAULT_COORDS)
    });

    Ok(FeatureVector {
        year: selection.year(),
        month: selection.month,
        coords,
        admin1_enc: codes[Field::Admin1 as usize],
        market_enc: codes[Field::Market as usize],
        category_enc: codes[Field::Category as usize],
        commodity_enc: codes[Field::Commodity as usize],
        unit_enc: codes[Field::Unit as usize],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build;
    use crate::domain::PriceRecord;
    use std::collections::BTreeMap;

    fn record(province: &str, market: &str, commodity: &str, coords: Option<(f64, f64)>) -> PriceRecord {
        PriceRecord {
            province: province.to_string(),
            market: market.to_string(),
            category: "cereals and tubers".to_string(),
            commodity: commodity.to_string(),
            unit: "KG".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
        }
    }

    fn encoders() -> EncoderSet {
        let mut classes = BTreeMap::new();
        classes.insert(Field::Admin1, vec!["Central".to_string(), "Western".to_string()]);
        classes.insert(
            Field::Market,
            vec!["Colombo".to_string(), "Kandy".to_string(), "Jaffna".to_string()],
        );
        classes.insert(Field::Category, vec!["cereals and tubers".to_string()]);
        classes.insert(Field::Commodity, vec!["Rice (red)".to_string(), "Wheat flour".to_string()]);
        classes.insert(Field::Unit, vec!["KG".to_string(), "L".to_string()]);
        EncoderSet::from_classes(classes).unwrap()
    }

    fn selection(market: &str, commodity: &str) -> Selection {
        Selection {
            province: "Western".to_string(),
            market: market.to_string(),
            category: "cereals and tubers".to_string(),
            commodity: commodity.to_string(),
            unit: "KG".to_string(),
            month: 4,
        }
    }

    #[test]
    fn encodes_in_schema_order_with_coords() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", Some((6.93, 79.85)))]);
        let v = encode(&selection("Colombo", "Wheat flour"), &encoders(), &catalog, FeatureSchema::WithCoords).unwrap();
        assert_eq!(v.year, 2026);
        assert_eq!(v.month, 4);
        assert_eq!(v.coords, Some((6.93, 79.85)));
        assert_eq!(v.values(), vec![2026.0, 4.0, 6.93, 79.85, 1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn without_coords_schema_omits_location() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", Some((6.93, 79.85)))]);
        let v = encode(&selection("Colombo", "Rice (red)"), &encoders(), &catalog, FeatureSchema::WithoutCoords).unwrap();
        assert_eq!(v.coords, None);
        assert_eq!(v.values().len(), 7);
    }

    #[test]
    fn unknown_market_short_circuits() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", None)]);
        // Commodity is also unknown, but market is checked first.
        let err = encode(
            &selection("Nonexistent Market", "Nonexistent Commodity"),
            &encoders(),
            &catalog,
            FeatureSchema::WithCoords,
        )
        .unwrap_err();
        assert_eq!(err, PredictError::unknown(Field::Market, "Nonexistent Market"));
    }

    #[test]
    fn unknown_commodity_checked_before_other_fields() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", None)]);
        let mut sel = selection("Colombo", "Sugar");
        sel.unit = "Bag".to_string();
        let err = encode(&sel, &encoders(), &catalog, FeatureSchema::WithCoords).unwrap_err();
        assert_eq!(err, PredictError::unknown(Field::Commodity, "Sugar"));
    }

    #[test]
    fn market_without_coords_falls_back_to_origin() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", Some((6.93, 79.85)))]);
        let v = encode(&selection("Jaffna", "Rice (red)"), &encoders(), &catalog, FeatureSchema::WithCoords).unwrap();
        assert_eq!(v.coords, Some((0.0, 0.0)));
    }

    #[test]
    fn encoding_is_deterministic() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", Some((6.93, 79.85)))]);
        let enc = encoders();
        let sel = selection("Kandy", "Wheat flour");
        let a = encode(&sel, &enc, &catalog, FeatureSchema::WithCoords).unwrap();
        let b = encode(&sel, &enc, &catalog, FeatureSchema::WithCoords).unwrap();
        assert_eq!(a, b);
        let bits = |v: &FeatureVector| v.values().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let catalog = build(&[record("Western", "Colombo", "Rice (red)", None)]);
        let mut sel = selection("Colombo", "Rice (red)");
        sel.month = 13;
        let err = encode(&sel, &encoders(), &catalog, FeatureSchema::WithoutCoords).unwrap_err();
        assert_eq!(err, PredictError::InvalidMonth(13));
    }
}
