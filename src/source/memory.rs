//! In-memory history and stock store.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::RawObservation;
use crate::error::RunoutError;
use crate::source::{HistorySource, StockSource};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    orders: BTreeMap<String, Vec<RawObservation>>,
    stock: BTreeMap<String, f64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, sku: impl Into<String>, history: Vec<RawObservation>) -> Self {
        self.orders.entry(sku.into()).or_default().extend(history);
        self
    }

    pub fn with_stock(mut self, sku: impl Into<String>, on_hand: f64) -> Self {
        self.set_stock(sku, on_hand);
        self
    }

    pub fn push_order(&mut self, sku: impl Into<String>, order: RawObservation) {
        self.orders.entry(sku.into()).or_default().push(order);
    }

    pub fn set_stock(&mut self, sku: impl Into<String>, on_hand: f64) {
        self.stock.insert(sku.into(), on_hand);
    }

    /// Every SKU with either orders or a stock level, sorted.
    pub fn skus(&self) -> Vec<String> {
        let all: BTreeSet<&String> = self.orders.keys().chain(self.stock.keys()).collect();
        all.into_iter().cloned().collect()
    }

    pub fn order_count(&self) -> usize {
        self.orders.values().map(Vec::len).sum()
    }
}

impl HistorySource for InMemoryStore {
    fn history(&self, sku: &str) -> Result<Vec<RawObservation>, RunoutError> {
        match self.orders.get(sku) {
            Some(rows) => Ok(rows.clone()),
            // Stocked but never ordered: a known SKU with an empty history.
            None if self.stock.contains_key(sku) => Ok(Vec::new()),
            None => Err(RunoutError::not_found(sku, "history")),
        }
    }
}

impl StockSource for InMemoryStore {
    fn on_hand(&self, sku: &str) -> Result<f64, RunoutError> {
        self.stock
            .get(sku)
            .copied()
            .ok_or_else(|| RunoutError::not_found(sku, "stock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sku_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.history("X"),
            Err(RunoutError::UpstreamNotFound {
                what: "history",
                ..
            })
        ));
        assert!(matches!(
            store.on_hand("X"),
            Err(RunoutError::UpstreamNotFound { what: "stock", .. })
        ));
    }

    #[test]
    fn stocked_sku_without_orders_has_empty_history() {
        let store = InMemoryStore::new().with_stock("A", 5.0);
        assert_eq!(store.history("A").unwrap(), Vec::new());
        assert_eq!(store.on_hand("A").unwrap(), 5.0);
    }

    #[test]
    fn skus_are_the_sorted_union() {
        let store = InMemoryStore::new()
            .with_history("B", vec![RawObservation::new("2024-01-01", 1.0)])
            .with_stock("A", 1.0)
            .with_stock("B", 2.0);
        assert_eq!(store.skus(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(store.order_count(), 1);
    }
}
