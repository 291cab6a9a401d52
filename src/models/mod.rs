//! Demand trend model implementations.
//!
//! Models are small, pure functions so the fitter and projector stay generic
//! over the fitted shape.

pub mod model;

pub use model::*;
