//! Data source interfaces.
//!
//! The engine never talks to storage directly. It asks a `HistorySource` for a
//! SKU's order history and a `StockSource` for its on-hand quantity.
//!
//! Implementations shipped here:
//! - `InMemoryStore`: maps held in memory (tests, embedding)
//! - `CsvStore`: orders/stock CSV files loaded at startup
//! - `FixedStock`: a single stock level supplied by the caller

use crate::domain::RawObservation;
use crate::error::RunoutError;

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvStore;
pub use memory::InMemoryStore;

/// Supplies order history per SKU.
pub trait HistorySource: Send + Sync {
    /// Observations for `sku`, one per order (not yet aggregated per day).
    ///
    /// An empty vector is a valid answer for a known SKU with no orders; the
    /// normalizer rejects it. Unknown SKUs return `UpstreamNotFound`.
    fn history(&self, sku: &str) -> Result<Vec<RawObservation>, RunoutError>;
}

/// Supplies the current on-hand quantity per SKU.
pub trait StockSource: Send + Sync {
    fn on_hand(&self, sku: &str) -> Result<f64, RunoutError>;
}

/// The same stock level for whichever SKU is asked about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStock(pub f64);

impl StockSource for FixedStock {
    fn on_hand(&self, _sku: &str) -> Result<f64, RunoutError> {
        Ok(self.0)
    }
}
