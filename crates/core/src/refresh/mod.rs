//! Refresh module - keeps every dataset fresh within a max age.

mod fund_classifier;
mod refresh_model;
mod refresh_service;


pub use fund_classifier::FundClassifier;
pub use refresh_model::{RefreshReport, RefreshScope, RefreshSummary, SymbolOutcome};
pub use refresh_service::RefreshEngine;
