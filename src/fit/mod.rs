//! Trend fitting.
//!
//! Responsibilities:
//!
//! - least squares fit of demand against day index (`fitter`)
//! - the bounded worker pool every fit runs on (`pool`)

pub mod fitter;
pub mod pool;

pub use fitter::*;
pub use pool::*;
