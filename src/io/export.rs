//! CSV exports.
//!
//! - the forecast table: one row per forecast day, easy to load into a
//!   spreadsheet next to the order history
//! - simulated orders and stock levels, in the format `ingest` reads back

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::SimulatedData;
use crate::domain::RunoutResult;
use crate::error::AppError;

/// Write `date,forecast_quantity,cumulative_quantity,exceeds_stock` rows.
pub fn write_forecast_csv(path: &Path, sku: &str, result: &RunoutResult) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "sku,date,forecast_quantity,cumulative_quantity,current_stock,exceeds_stock")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (f, c) in result.forecast.iter().zip(&result.cumulative) {
        writeln!(
            file,
            "{},{},{:.4},{:.4},{:.4},{}",
            sku,
            f.date,
            f.quantity,
            c.running_total,
            result.current_stock,
            c.running_total > result.current_stock,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write simulated orders as a `sku,date,quantity` CSV.
pub fn write_orders_csv(path: &Path, data: &SimulatedData) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create orders CSV '{}': {e}", path.display())))?;

    writeln!(file, "sku,date,quantity")
        .map_err(|e| AppError::new(2, format!("Failed to write orders CSV header: {e}")))?;
    for o in &data.orders {
        writeln!(file, "{},{},{}", o.sku, o.date, o.quantity)
            .map_err(|e| AppError::new(2, format!("Failed to write orders CSV row: {e}")))?;
    }

    Ok(())
}

/// Write simulated stock levels as a `sku,on_hand` CSV.
pub fn write_stock_csv(path: &Path, data: &SimulatedData) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create stock CSV '{}': {e}", path.display())))?;

    writeln!(file, "sku,on_hand")
        .map_err(|e| AppError::new(2, format!("Failed to write stock CSV header: {e}")))?;
    for (sku, on_hand) in &data.stock {
        writeln!(file, "{sku},{on_hand}")
            .map_err(|e| AppError::new(2, format!("Failed to write stock CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{CumulativePoint, FitQuality, ForecastPoint, TrendFit, TrendModel};

    #[test]
    fn writes_one_row_per_forecast_day() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let result = RunoutResult {
            runout_date: d1,
            forecast: vec![
                ForecastPoint {
                    date: d0,
                    quantity: 10.0,
                },
                ForecastPoint {
                    date: d1,
                    quantity: 10.0,
                },
            ],
            cumulative: vec![
                CumulativePoint {
                    date: d0,
                    running_total: 10.0,
                },
                CumulativePoint {
                    date: d1,
                    running_total: 20.0,
                },
            ],
            current_stock: 15.0,
            period: 2,
            iterations: 1,
            last_observed_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            final_fit: TrendFit {
                model: TrendModel::Constant { level: 10.0 },
                quality: FitQuality {
                    n: 1,
                    sse: 0.0,
                    rmse: 0.0,
                },
            },
        };

        let path = std::env::temp_dir().join(format!("stock_runout_export_{}.csv", std::process::id()));
        write_forecast_csv(&path, "A", &result).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "A,2024-01-04,10.0000,10.0000,15.0000,false");
        assert_eq!(lines[2], "A,2024-01-05,10.0000,20.0000,15.0000,true");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn simulated_files_load_back_through_ingest() {
        use crate::data::SimulatedOrder;
        use crate::io::ingest::{load_orders, load_stock};

        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let data = SimulatedData {
            orders: vec![
                SimulatedOrder {
                    sku: "SKU-001".to_string(),
                    date,
                    quantity: 4.0,
                },
                SimulatedOrder {
                    sku: "SKU-002".to_string(),
                    date,
                    quantity: 0.0,
                },
            ],
            stock: vec![("SKU-001".to_string(), 30.0), ("SKU-002".to_string(), 5.0)],
        };

        let dir = std::env::temp_dir();
        let orders = dir.join(format!("stock_runout_sim_orders_{}.csv", std::process::id()));
        let stock = dir.join(format!("stock_runout_sim_stock_{}.csv", std::process::id()));
        write_orders_csv(&orders, &data).unwrap();
        write_stock_csv(&stock, &data).unwrap();

        let loaded = load_orders(&orders).unwrap();
        assert_eq!(loaded.rows_used, 2);
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.by_sku["SKU-001"][0].date.as_deref(), Some("2024-02-01"));
        assert_eq!(load_stock(&stock).unwrap().by_sku["SKU-002"], 5.0);

        std::fs::remove_file(orders).ok();
        std::fs::remove_file(stock).ok();
    }
}
