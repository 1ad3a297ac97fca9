//! Dice module - weighted random sampling over the refreshed universe.

mod dice_model;
mod dice_service;
mod dice_traits;
pub mod sampler;

pub use dice_model::{AnnualFundamentals, DiceRoll, EquityProfile, UniverseRow, Weighting};
pub use dice_service::DiceService;
pub use dice_traits::UniverseRepositoryTrait;
