//! Input/output helpers.
//!
//! - orders/stock CSV ingest + validation (`ingest`)
//! - forecast table export to CSV (`export`)
//! - runout JSON read/write (`runout_json`)

pub mod export;
pub mod ingest;
pub mod runout_json;

pub use export::*;
pub use ingest::*;
pub use runout_json::*;
