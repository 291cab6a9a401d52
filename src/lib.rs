//! `stock-runout` library crate.
//!
//! The binary (`runout`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes
//! - a service can embed `RunoutEngine` behind its own request handlers
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod series;
pub mod source;
