//! Read/write runout JSON files.
//!
//! The JSON document is the portable form of one SKU's result:
//! - runout date and days until runout
//! - the fitted trend and its quality
//! - forecast and cumulative series, day by day
//!
//! The schema is defined by `domain::RunoutFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{RunoutFile, RunoutResult};
use crate::error::AppError;

/// Build the JSON document for a result.
pub fn to_runout_file(sku: &str, result: &RunoutResult) -> RunoutFile {
    RunoutFile {
        tool: "runout".to_string(),
        sku: sku.to_string(),
        runout_day: result.runout_date,
        days_until_runout: result.days_until_runout(),
        current_stock: result.current_stock,
        period: result.period,
        iterations: result.iterations,
        last_observed_date: result.last_observed_date,
        model: result.final_fit.model,
        fit_quality: result.final_fit.quality,
        forecast: result.forecast.clone(),
        cumulative_sold_units: result.cumulative.clone(),
    }
}

/// Write a runout JSON file.
pub fn write_runout_json(path: &Path, sku: &str, result: &RunoutResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create runout JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &to_runout_file(sku, result))
        .map_err(|e| AppError::new(2, format!("Failed to write runout JSON: {e}")))?;

    Ok(())
}

/// Read a runout JSON file.
pub fn read_runout_json(path: &Path) -> Result<RunoutFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open runout JSON '{}': {e}", path.display())))?;
    let doc: RunoutFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid runout JSON: {e}")))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{CumulativePoint, FitQuality, ForecastPoint, TrendFit, TrendModel};

    #[test]
    fn saved_document_reloads_with_response_field_names() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let result = RunoutResult {
            runout_date: d0,
            forecast: vec![ForecastPoint {
                date: d0,
                quantity: 3.0,
            }],
            cumulative: vec![CumulativePoint {
                date: d0,
                running_total: 3.0,
            }],
            current_stock: 2.0,
            period: 1,
            iterations: 1,
            last_observed_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            final_fit: TrendFit {
                model: TrendModel::Linear {
                    intercept: 1.0,
                    slope: 0.5,
                },
                quality: FitQuality {
                    n: 4,
                    sse: 0.1,
                    rmse: 0.158,
                },
            },
        };

        let path = std::env::temp_dir().join(format!("stock_runout_json_{}.json", std::process::id()));
        write_runout_json(&path, "SKU-1", &result).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["runout_day"], "2024-01-04");
        assert_eq!(raw["model"]["kind"], "linear");
        assert!(raw["cumulative_sold_units"].is_array());

        let doc = read_runout_json(&path).unwrap();
        assert_eq!(doc, to_runout_file("SKU-1", &result));
        assert_eq!(doc.days_until_runout, 1);
        std::fs::remove_file(path).ok();
    }
}
