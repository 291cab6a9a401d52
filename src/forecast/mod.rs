//! Forecast projection and runout detection.

pub mod project;
pub mod runout;

pub use project::*;
pub use runout::*;
