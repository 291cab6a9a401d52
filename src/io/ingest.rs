//! CSV ingest for orders and stock levels.
//!
//! Orders CSV: one row per order line, `sku,date,quantity`. Exports from the
//! storefront and the demand dashboard name these columns differently, so a
//! few aliases are accepted (`item_id`, `timestamp`/`created_at`, `demand`).
//!
//! Stock CSV: `sku,on_hand` (alias `stock`).
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Dates stay raw**: date text is handed to the normalizer untouched, so a
//!   bad date fails that SKU's computation instead of silently shrinking its
//!   history

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::RawObservation;
use crate::error::AppError;

const SKU_COLUMNS: [&str; 3] = ["sku", "item_id", "product_sku"];
const DATE_COLUMNS: [&str; 4] = ["date", "timestamp", "created_at", "order_date"];
const QUANTITY_COLUMNS: [&str; 3] = ["quantity", "demand", "qty"];
const STOCK_COLUMNS: [&str; 3] = ["on_hand", "stock", "current_stock"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub sku: Option<String>,
    pub message: String,
}

/// Orders grouped by SKU, in file order.
#[derive(Debug, Clone, Default)]
pub struct OrdersData {
    pub by_sku: BTreeMap<String, Vec<RawObservation>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// On-hand stock per SKU.
#[derive(Debug, Clone, Default)]
pub struct StockData {
    pub by_sku: BTreeMap<String, f64>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load an orders CSV.
pub fn load_orders(path: &Path) -> Result<OrdersData, AppError> {
    let (headers, mut reader) = open_csv(path)?;
    let header_map = build_header_map(&headers);

    let sku_col = require_column(&header_map, &SKU_COLUMNS, path)?;
    let date_col = require_column(&header_map, &DATE_COLUMNS, path)?;
    let qty_col = require_column(&header_map, &QUANTITY_COLUMNS, path)?;

    let mut data = OrdersData::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        data.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                data.row_errors.push(RowError {
                    line,
                    sku: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(sku) = get_value(&record, sku_col) else {
            data.row_errors.push(RowError {
                line,
                sku: None,
                message: "Missing SKU.".to_string(),
            });
            continue;
        };

        match parse_quantity(get_value(&record, qty_col)) {
            Ok(quantity) => {
                let date = get_value(&record, date_col).map(str::to_string);
                data.by_sku
                    .entry(sku.to_string())
                    .or_default()
                    .push(RawObservation { date, quantity });
                data.rows_used += 1;
            }
            Err(message) => data.row_errors.push(RowError {
                line,
                sku: Some(sku.to_string()),
                message,
            }),
        }
    }

    Ok(data)
}

/// Load a stock CSV. A SKU listed twice keeps its last value.
pub fn load_stock(path: &Path) -> Result<StockData, AppError> {
    let (headers, mut reader) = open_csv(path)?;
    let header_map = build_header_map(&headers);

    let sku_col = require_column(&header_map, &SKU_COLUMNS, path)?;
    let stock_col = require_column(&header_map, &STOCK_COLUMNS, path)?;

    let mut data = StockData::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        data.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                data.row_errors.push(RowError {
                    line,
                    sku: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(sku) = get_value(&record, sku_col) else {
            data.row_errors.push(RowError {
                line,
                sku: None,
                message: "Missing SKU.".to_string(),
            });
            continue;
        };

        match parse_quantity(get_value(&record, stock_col)) {
            Ok(on_hand) => {
                data.by_sku.insert(sku.to_string(), on_hand);
            }
            Err(message) => data.row_errors.push(RowError {
                line,
                sku: Some(sku.to_string()),
                message,
            }),
        }
    }

    Ok(data)
}

fn open_csv(path: &Path) -> Result<(StringRecord, csv::Reader<File>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();

    Ok((headers, reader))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Find the first present column among `aliases`.
fn require_column(header_map: &HashMap<String, usize>, aliases: &[&str], path: &Path) -> Result<usize, AppError> {
    aliases
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "Missing required column in '{}': one of `{}`",
                    path.display(),
                    aliases.join("`, `")
                ),
            )
        })
}

fn get_value(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_quantity(s: Option<&str>) -> Result<f64, String> {
    let s = s.ok_or_else(|| "Missing quantity.".to_string())?;
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid quantity '{s}'."))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("Quantity must be a finite, non-negative number (got '{s}')."));
    }
    Ok(v)
}
