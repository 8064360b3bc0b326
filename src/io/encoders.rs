//! Read the label encoder artifact.
//!
//! The artifact is a JSON object mapping each field to the labels its encoder
//! was fit on:
//!
//! ```json
//! { "admin1": ["Central", "Western"], "market": ["Colombo", "Kandy"], ... }
//! ```
//!
//! Labels are sorted and deduplicated on load, so codes are the label's index
//! in sorted order regardless of how the file lists them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::Field;
use crate::encode::EncoderSet;
use crate::error::AppError;

pub fn load_encoders(path: &Path) -> Result<EncoderSet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::asset_missing(format!("Failed to open encoders '{}': {e}", path.display())))?;
    let classes: BTreeMap<Field, Vec<String>> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::asset_invalid(format!("Invalid encoders JSON '{}': {e}", path.display())))?;
    let encoders = EncoderSet::from_classes(classes)
        .map_err(|e| AppError::asset_invalid(format!("Encoders '{}' are unusable: {e}", path.display())))?;

    for field in Field::ALL {
        if encoders.get(field).is_empty() {
            tracing::warn!(field = field.column(), "encoder has no labels; every value of this field is unknown");
        }
    }
    Ok(encoders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_sorts_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoders.json");
        std::fs::write(
            &path,
            r#"{
                "admin1": ["Western", "Central"],
                "market": ["Kandy", "Colombo"],
                "category": ["cereals and tubers"],
                "commodity": ["Rice (red)"],
                "unit": ["L", "KG"]
            }"#,
        )
        .unwrap();
        let enc = load_encoders(&path).unwrap();
        assert_eq!(enc.options(Field::Admin1), ["Central", "Western"]);
        assert_eq!(enc.get(Field::Unit).code("L"), Some(1));
    }

    #[test]
    fn missing_field_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoders.json");
        std::fs::write(&path, r#"{"admin1": ["Western"]}"#).unwrap();
        let err = load_encoders(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ASSET_INVALID);
    }

    #[test]
    fn missing_file_is_asset_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_encoders(&dir.path().join("encoders.json")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ASSET_MISSING);
    }

    #[test]
    fn empty_label_list_loads_as_empty_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoders.json");
        std::fs::write(
            &path,
            r#"{"admin1": ["Western"], "market": [], "category": ["c"], "commodity": ["x"], "unit": ["KG"]}"#,
        )
        .unwrap();
        let enc = load_encoders(&path).unwrap();
        assert!(enc.get(Field::Market).is_empty());
        assert!(!enc.get(Field::Unit).is_empty());
    }
}
