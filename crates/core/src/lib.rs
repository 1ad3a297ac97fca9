//! Stockdice Core - Domain services and traits.
//!
//! This crate contains the refresh engine and the sampling engine.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod config;
pub mod dice;
pub mod errors;
pub mod fx;
pub mod records;
pub mod refresh;
pub mod utils;

pub use config::StockdiceConfig;
pub use dice::{DiceRoll, DiceService, Weighting};
pub use fx::UsdConverter;
pub use records::RecordStore;
pub use refresh::{RefreshEngine, RefreshReport, RefreshScope, RefreshSummary};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
