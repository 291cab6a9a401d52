//! Bounded worker pool for trend fits.
//!
//! Fits are the only CPU-heavy step of a runout computation, so they run on a
//! dedicated fixed-size rayon pool instead of the caller's thread. The pool's
//! thread count is the admission gate: at most `capacity` fits execute at once
//! across every request sharing the pool, and further submissions wait in the
//! pool's queue until a worker frees up. Nothing is dropped.
//!
//! Lifecycle: build one `FitPool` at startup, share it (`Arc`) with every
//! request handler, and call `shutdown` when the process is done.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::domain::{NormalizedSeries, TrendFit};
use crate::error::RunoutError;
use crate::fit::fitter::fit_trend;

pub struct FitPool {
    pool: ThreadPool,
    capacity: usize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicU64,
}

impl FitPool {
    pub fn new(capacity: usize) -> Result<Self, RunoutError> {
        if capacity == 0 {
            return Err(RunoutError::Pool("pool capacity must be at least 1".to_string()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(capacity)
            .thread_name(|i| format!("runout-fit-{i}"))
            .build()
            .map_err(|e| RunoutError::Pool(format!("failed to start worker pool: {e}")))?;

        info!(capacity, "fit pool started");
        Ok(Self {
            pool,
            capacity,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completed: AtomicU64::new(0),
        })
    }

    /// Fit a trend on a pool worker, blocking the caller until it completes.
    ///
    /// Callers beyond capacity queue here; every submission eventually runs.
    pub fn fit(&self, series: &NormalizedSeries) -> Result<TrendFit, RunoutError> {
        self.pool.install(|| {
            let _slot = self.enter();
            fit_trend(series)
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fits executing right now.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of simultaneous fits observed since startup.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Stop the pool. Queued fits still finish before the workers exit.
    pub fn shutdown(self) {
        info!(
            completed = self.completed(),
            peak_in_flight = self.peak_in_flight(),
            "fit pool shutting down"
        );
        drop(self.pool);
    }

    fn enter(&self) -> Slot<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        debug!(in_flight = now, capacity = self.capacity, "fit admitted");
        Slot { pool: self }
    }
}

impl std::fmt::Debug for FitPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitPool")
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight())
            .field("peak_in_flight", &self.peak_in_flight())
            .field("completed", &self.completed())
            .finish()
    }
}

/// Held by a worker for the duration of one fit.
struct Slot<'a> {
    pool: &'a FitPool,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.pool.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.pool.completed.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Observation;
    use crate::series::{NormalizeOptions, normalize};

    fn ramp(len: i64, slope: f64) -> NormalizedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let obs: Vec<Observation> = (0..len)
            .map(|i| Observation::new(start + chrono::Duration::days(i), 1.0 + slope * i as f64))
            .collect();
        normalize(&obs, &NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(FitPool::new(0), Err(RunoutError::Pool(_))));
    }

    #[test]
    fn concurrent_fits_never_exceed_capacity() {
        let pool = Arc::new(FitPool::new(2).unwrap());
        let callers = 12;

        let slopes: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..callers)
                .map(|k| {
                    let pool = Arc::clone(&pool);
                    scope.spawn(move || {
                        let series = ramp(400, k as f64);
                        pool.fit(&series).unwrap().model.slope()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (k, slope) in slopes.iter().enumerate() {
            assert!((slope - k as f64).abs() < 1e-6, "caller {k} got slope {slope}");
        }
        assert!(pool.peak_in_flight() >= 1);
        assert!(pool.peak_in_flight() <= 2);
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(pool.completed(), callers as u64);
    }
}
