mod model;
mod repository;

pub use model::{BalanceSheetDB, CompanyProfileDB, ForexPairDB, IncomeStatementDB, SymbolListingDB};
pub use repository::RecordRepository;
