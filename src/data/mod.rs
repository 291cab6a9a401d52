//! Data generation.
//!
//! - seeded synthetic demand histories and stock levels (`sample`)

pub mod sample;

pub use sample::*;
