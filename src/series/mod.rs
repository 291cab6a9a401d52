//! History normalization: raw observations to an indexed daily series.

pub mod normalize;

pub use normalize::*;
