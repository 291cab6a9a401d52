//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - order history observations (`Observation`, `RawObservation`)
//! - the normalized series fed to the fitter (`NormalizedSeries`)
//! - fit and forecast outputs (`TrendFit`, `ForecastPoint`, `RunoutResult`, etc.)
//! - engine configuration (`EngineConfig`)

pub mod types;

pub use types::*;
