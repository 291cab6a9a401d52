//! Synthetic daily demand histories.
//!
//! Each SKU gets a base level, a linear drift and Gaussian day-to-day noise.
//! Quantities are rounded and floored at zero like real order counts. Stock is
//! set to cover a configurable number of days of recent demand, so generated
//! SKUs run out at a spread of horizons (some only after extension).

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::RawObservation;
use crate::error::AppError;
use crate::source::InMemoryStore;

/// Days of trailing demand averaged to size the generated stock level.
const STOCK_LOOKBACK_DAYS: usize = 14;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub skus: usize,
    pub days: usize,
    pub start_date: NaiveDate,
    /// Typical daily demand; each SKU draws its own level in `[0.5, 1.5] ×` this.
    pub base_demand: f64,
    /// Maximum absolute daily drift in demand.
    pub trend_max: f64,
    /// Standard deviation of daily noise.
    pub noise_sd: f64,
    /// Stock level in days of recent average demand.
    pub stock_days: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedOrder {
    pub sku: String,
    pub date: NaiveDate,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedData {
    pub orders: Vec<SimulatedOrder>,
    /// `(sku, on_hand)` in SKU order.
    pub stock: Vec<(String, f64)>,
}

impl SimulatedData {
    /// Load the generated data into an in-memory source.
    pub fn into_store(self) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for o in self.orders {
            store.push_order(o.sku, RawObservation::new(o.date.to_string(), o.quantity));
        }
        for (sku, on_hand) in self.stock {
            store.set_stock(sku, on_hand);
        }
        store
    }
}

pub fn generate_demand(config: &SimulationConfig) -> Result<SimulatedData, AppError> {
    if config.skus == 0 {
        return Err(AppError::new(2, "SKU count must be > 0."));
    }
    if config.days == 0 {
        return Err(AppError::new(2, "Day count must be > 0."));
    }
    if !(config.base_demand.is_finite() && config.base_demand > 0.0) {
        return Err(AppError::new(2, "Base demand must be a positive number."));
    }
    if !(config.trend_max.is_finite() && config.trend_max >= 0.0) {
        return Err(AppError::new(2, "Trend bound must be a non-negative number."));
    }
    if !(config.stock_days.is_finite() && config.stock_days >= 0.0) {
        return Err(AppError::new(2, "Stock days must be a non-negative number."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let width = config.skus.to_string().len().max(3);
    let mut orders = Vec::with_capacity(config.skus * config.days);
    let mut stock = Vec::with_capacity(config.skus);

    for s in 0..config.skus {
        let sku = format!("SKU-{:0width$}", s + 1);
        let level = config.base_demand * rng.gen_range(0.5..=1.5);
        let drift = if config.trend_max > 0.0 {
            rng.gen_range(-config.trend_max..=config.trend_max)
        } else {
            0.0
        };

        let mut quantities = Vec::with_capacity(config.days);
        for t in 0..config.days {
            let date = config
                .start_date
                .checked_add_days(Days::new(t as u64))
                .ok_or_else(|| AppError::new(2, "Simulated dates run past the calendar range."))?;
            let mean = level + drift * t as f64;
            let quantity = (mean + noise.sample(&mut rng)).round().max(0.0);
            quantities.push(quantity);
            orders.push(SimulatedOrder {
                sku: sku.clone(),
                date,
                quantity,
            });
        }

        let tail = &quantities[quantities.len().saturating_sub(STOCK_LOOKBACK_DAYS)..];
        let recent = tail.iter().sum::<f64>() / tail.len() as f64;
        stock.push((sku, (recent * config.stock_days).round().max(0.0)));
    }

    Ok(SimulatedData { orders, stock })
}
