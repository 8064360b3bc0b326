//! CSV ingest for the historical price dataset.
//!
//! Turns the WFP-style price CSV into `PriceRecord`s for the catalog builder.
//!
//! - The first data row beneath the header is skipped (HXL hashtag row).
//! - Rows missing any required value are excluded and reported, not fatal.
//! - A missing file is a startup failure (exit code 2); a file that yields no
//!   usable rows is also fatal (exit code 3).

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Field, PriceRecord};
use crate::error::AppError;

/// Number of data rows skipped under the header.
const SKIPPED_LEADING_ROWS: usize = 1;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: usable records + what was dropped.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<PriceRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// Load price records from `path`.
///
/// With `require_coords`, rows without a parseable latitude/longitude are
/// dropped as well.
pub fn load_price_records(path: &Path, require_coords: bool) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::asset_missing(format!("Failed to open dataset CSV '{}': {e}", path.display()))
    })?;
    read_price_records(file, require_coords)
}

/// Parse price records from any reader (used directly by tests).
pub fn read_price_records<R: std::io::Read>(input: R, require_coords: bool) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::asset_invalid(format!("Failed to read dataset CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map, require_coords)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate().skip(SKIPPED_LEADING_ROWS) {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, require_coords) {
            Ok(rec) => records.push(rec),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::asset_invalid(
            "Dataset CSV has no usable rows after dropping incomplete records.",
        ));
    }

    if !row_errors.is_empty() {
        tracing::warn!(
            dropped = row_errors.len(),
            first_line = row_errors[0].line,
            "dropped incomplete dataset rows"
        );
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>, require_coords: bool) -> Result<(), AppError> {
    for field in Field::ALL {
        if !header_map.contains_key(field.column()) {
            return Err(AppError::asset_invalid(format!(
                "Dataset CSV is missing required column: `{}`",
                field.column()
            )));
        }
    }
    if require_coords {
        for col in ["latitude", "longitude"] {
            if !header_map.contains_key(col) {
                return Err(AppError::asset_invalid(format!(
                    "Dataset CSV is missing column `{col}` (needed for the coordinate feature schema)"
                )));
            }
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    require_coords: bool,
) -> Result<PriceRecord, String> {
    let province = get_required(record, header_map, Field::Admin1.column())?.to_string();
    let market = get_required(record, header_map, Field::Market.column())?.to_string();
    let category = get_required(record, header_map, Field::Category.column())?.to_string();
    let commodity = get_required(record, header_map, Field::Commodity.column())?.to_string();
    let unit = get_required(record, header_map, Field::Unit.column())?.to_string();

    let latitude = parse_opt_f64(get_optional(record, header_map, "latitude"));
    let longitude = parse_opt_f64(get_optional(record, header_map, "longitude"));

    if require_coords && (latitude.is_none() || longitude.is_none()) {
        return Err("Missing/invalid `latitude`/`longitude` value.".to_string());
    }

    Ok(PriceRecord {
        province,
        market,
        category,
        commodity,
        unit,
        latitude,
        longitude,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
date,admin1,admin2,market,latitude,longitude,category,commodity,unit,price
#date,#adm1+name,#adm2+name,#loc+market+name,#geo+lat,#geo+lon,#item+type,#item+name,#item+unit,#value
2024-01-15,Western,Colombo,Colombo,6.93,79.85,cereals and tubers,Rice (red),KG,220
2024-01-15,Western,Colombo,Colombo,6.93,79.85,vegetables and fruits,Onions,KG,400
2024-01-15,Central,Kandy,,7.29,80.63,cereals and tubers,Rice (red),KG,230
2024-01-15,Central,Kandy,Kandy,,,cereals and tubers,Rice (red),KG,235
";

    #[test]
    fn skips_hxl_row_and_drops_incomplete_rows() {
        let data = read_price_records(SAMPLE.as_bytes(), false).unwrap();
        // The HXL row is not counted as read.
        assert_eq!(data.rows_read, 4);
        // Missing market is dropped; missing coords is fine without the coords schema.
        assert_eq!(data.rows_used(), 3);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 5);
        assert_eq!(data.records[0].province, "Western");
        assert_eq!(data.records[0].coords(), Some((6.93, 79.85)));
    }

    #[test]
    fn coordinate_schema_drops_rows_without_coords() {
        let data = read_price_records(SAMPLE.as_bytes(), true).unwrap();
        assert_eq!(data.rows_used(), 2);
        assert!(data.records.iter().all(|r| r.coords().is_some()));
    }

    #[test]
    fn missing_column_is_invalid_asset() {
        let csv = "admin1,market,commodity,unit\n#x,#y,#z,#w\nA,B,C,D\n";
        let err = read_price_records(csv.as_bytes(), false).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ASSET_INVALID);
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn missing_file_is_asset_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_price_records(&dir.path().join("nope.csv"), false).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_ASSET_MISSING);
    }

    #[test]
    fn bom_prefixed_header_is_recognized() {
        let csv = "\u{feff}admin1,market,category,commodity,unit\n#a,#b,#c,#d,#e\nWestern,Colombo,cereals,Rice,KG\n";
        let data = read_price_records(csv.as_bytes(), false).unwrap();
        assert_eq!(data.rows_used(), 1);
    }
}
