//! CSV ingest and normalization.
//!
//! This module turns the two flat input tables into validated, ordered rows:
//!
//! - historical prices: `Year`, `Month`, `Silver_Price_INR_per_kg`
//! - state purchases: `State`, `Silver_Purchased_kg`
//!
//! Any defect is fatal (exit code 2) and names the offending line: a missing
//! file or column, a row with the wrong number of fields, an unparsable or
//! out-of-range value, or a duplicate period/state. Nothing downstream runs on
//! a partially loaded table.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{Month, PricePoint, StatePurchase};
use crate::error::AppError;

const COL_YEAR: &str = "year";
const COL_MONTH: &str = "month";
const COL_PRICE: &str = "silver_price_inr_per_kg";
const COL_STATE: &str = "state";
const COL_PURCHASED: &str = "silver_purchased_kg";

/// Load the historical price table, sorted ascending by period.
pub fn load_price_history(path: &Path) -> Result<Vec<PricePoint>, AppError> {
    let (headers, mut reader) = open_table(path)?;
    let header_map = build_header_map(&headers);
    ensure_columns(path, &header_map, &[COL_YEAR, COL_MONTH, COL_PRICE])?;

    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;

        let point = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_price_row(&record, &header_map))
            .map_err(|message| row_error(path, line, &message))?;

        if !seen.insert(point.period()) {
            return Err(row_error(path, line, &format!("Duplicate period {}.", point.label())));
        }
        rows.push(point);
    }

    if rows.is_empty() {
        return Err(AppError::new(
            2,
            format!("No price rows in '{}'.", path.display()),
        ));
    }

    rows.sort_by_key(PricePoint::period);
    debug!(path = %path.display(), rows = rows.len(), "loaded price history");

    Ok(rows)
}

/// Load the state purchase table in file order.
pub fn load_state_purchases(path: &Path) -> Result<Vec<StatePurchase>, AppError> {
    let (headers, mut reader) = open_table(path)?;
    let header_map = build_header_map(&headers);
    ensure_columns(path, &header_map, &[COL_STATE, COL_PURCHASED])?;

    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;

        let row = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_state_row(&record, &header_map))
            .map_err(|message| row_error(path, line, &message))?;

        if !seen.insert(row.state.to_lowercase()) {
            return Err(row_error(path, line, &format!("Duplicate state '{}'.", row.state)));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::new(
            2,
            format!("No state rows in '{}'.", path.display()),
        ));
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded state purchases");

    Ok(rows)
}

fn open_table(path: &Path) -> Result<(StringRecord, csv::Reader<File>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    // Not flexible: a row whose field count differs from the header (e.g. an
    // unquoted "22,000") is a parse error rather than a silently short row.
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers in '{}': {e}", path.display())))?
        .clone();

    Ok((headers, reader))
}

fn row_error(path: &Path, line: usize, message: &str) -> AppError {
    AppError::new(2, format!("Invalid row in '{}' at line {line}: {message}", path.display()))
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

fn ensure_columns(path: &Path, header_map: &HashMap<String, usize>, required: &[&str]) -> Result<(), AppError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        2,
        format!(
            "Missing required column(s) in '{}': {}",
            path.display(),
            missing.join(", ")
        ),
    ))
}

fn parse_price_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<PricePoint, String> {
    let year_raw = get_required(record, header_map, COL_YEAR)?;
    let year = year_raw
        .parse::<i32>()
        .map_err(|_| format!("Invalid `Year` value '{year_raw}'."))?;

    let month_raw = get_required(record, header_map, COL_MONTH)?;
    let month = Month::parse(month_raw)
        .ok_or_else(|| format!("Invalid `Month` value '{month_raw}' (expected Jan..Dec)."))?;

    let price_per_kg = parse_f64(get_required(record, header_map, COL_PRICE)?)?;
    if price_per_kg <= 0.0 {
        return Err(format!("Price must be positive (got {price_per_kg})."));
    }

    Ok(PricePoint {
        year,
        month,
        price_per_kg,
    })
}

fn parse_state_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<StatePurchase, String> {
    let state = get_required(record, header_map, COL_STATE)?.to_string();
    let quantity_kg = parse_f64(get_required(record, header_map, COL_PURCHASED)?)?;
    if quantity_kg < 0.0 {
        return Err(format!("Purchase quantity for '{state}' must be >= 0 (got {quantity_kg})."));
    }
    Ok(StatePurchase { state, quantity_kg })
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

fn parse_f64(raw: &str) -> Result<f64, String> {
    // Tolerate quoted thousands separators ("22,000") from spreadsheet exports.
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    let v = cleaned
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite number '{raw}'."))
    }
}
