//! Reporting utilities: terminal summaries and tables.

pub mod format;

pub use format::*;
