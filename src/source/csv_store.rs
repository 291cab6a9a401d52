//! History and stock sources backed by CSV files.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::RawObservation;
use crate::error::{AppError, RunoutError};
use crate::io::ingest::{RowError, load_orders, load_stock};
use crate::source::{HistorySource, InMemoryStore, StockSource};

/// Orders (and optionally stock levels) loaded once from CSV.
#[derive(Debug, Clone)]
pub struct CsvStore {
    store: InMemoryStore,
    row_errors: Vec<RowError>,
}

impl CsvStore {
    pub fn open(orders: &Path, stock: Option<&Path>) -> Result<Self, AppError> {
        let orders_data = load_orders(orders)?;
        info!(
            path = %orders.display(),
            rows_read = orders_data.rows_read,
            rows_used = orders_data.rows_used,
            skus = orders_data.by_sku.len(),
            "orders loaded"
        );

        let mut store = InMemoryStore::new();
        for (sku, rows) in orders_data.by_sku {
            store = store.with_history(sku, rows);
        }
        let mut row_errors = orders_data.row_errors;

        if let Some(path) = stock {
            let stock_data = load_stock(path)?;
            info!(
                path = %path.display(),
                rows_read = stock_data.rows_read,
                skus = stock_data.by_sku.len(),
                "stock levels loaded"
            );
            for (sku, on_hand) in stock_data.by_sku {
                store.set_stock(sku, on_hand);
            }
            row_errors.extend(stock_data.row_errors);
        }

        for e in &row_errors {
            warn!(line = e.line, sku = e.sku.as_deref().unwrap_or("-"), "{}", e.message);
        }

        Ok(Self { store, row_errors })
    }

    pub fn skus(&self) -> Vec<String> {
        self.store.skus()
    }

    pub fn row_errors(&self) -> &[RowError] {
        &self.row_errors
    }
}

impl HistorySource for CsvStore {
    fn history(&self, sku: &str) -> Result<Vec<RawObservation>, RunoutError> {
        self.store.history(sku)
    }
}

impl StockSource for CsvStore {
    fn on_hand(&self, sku: &str) -> Result<f64, RunoutError> {
        self.store.on_hand(sku)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn serves_history_and_stock_from_files() {
        let dir = std::env::temp_dir();
        let orders = dir.join(format!("stock_runout_store_orders_{}.csv", std::process::id()));
        let stock = dir.join(format!("stock_runout_store_stock_{}.csv", std::process::id()));
        fs::write(&orders, "sku,date,quantity\nA,2024-01-01,2\nA,2024-01-02,3\n").unwrap();
        fs::write(&stock, "sku,on_hand\nA,40\nB,7\n").unwrap();

        let store = CsvStore::open(&orders, Some(&stock)).unwrap();
        assert_eq!(store.history("A").unwrap().len(), 2);
        assert_eq!(store.on_hand("A").unwrap(), 40.0);
        assert_eq!(store.history("B").unwrap(), Vec::new());
        assert!(matches!(
            store.on_hand("C"),
            Err(RunoutError::UpstreamNotFound { .. })
        ));
        assert_eq!(store.skus(), vec!["A".to_string(), "B".to_string()]);
        assert!(store.row_errors().is_empty());

        fs::remove_file(orders).ok();
        fs::remove_file(stock).ok();
    }
}
