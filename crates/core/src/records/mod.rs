//! Record store contract and freshness rules.

mod freshness;
mod records_traits;

pub use freshness::is_fresh;
pub use records_traits::{DeletePredicate, RecordStore};
