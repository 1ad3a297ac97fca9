//! Database models for the dataset tables.
//!
//! Each model carries the value columns of one table. `last_updated_us` is
//! written alongside by the repository so the freshness stamp stays under
//! its control.

use diesel::prelude::*;

use stockdice_market_data::{BalanceSheet, CompanyProfile, ForexPair, IncomeStatement, SymbolListing};

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::symbol_list)]
#[diesel(primary_key(symbol))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SymbolListingDB {
    pub symbol: String,
    pub company_name: Option<String>,
    pub trading_currency: Option<String>,
    pub reporting_currency: Option<String>,
}

impl From<SymbolListing> for SymbolListingDB {
    fn from(listing: SymbolListing) -> Self {
        Self {
            symbol: listing.symbol,
            company_name: listing.company_name,
            trading_currency: listing.trading_currency,
            reporting_currency: listing.reporting_currency,
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::company_profile)]
#[diesel(primary_key(symbol))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompanyProfileDB {
    pub symbol: String,
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub is_etf: Option<bool>,
    pub is_fund: Option<bool>,
    pub is_actively_trading: Option<bool>,
    pub is_adr: Option<bool>,
}

impl From<CompanyProfile> for CompanyProfileDB {
    fn from(profile: CompanyProfile) -> Self {
        Self {
            symbol: profile.symbol,
            company_name: profile.company_name,
            currency: profile.currency.map(|c| c.trim().to_uppercase()),
            price: profile.price,
            market_cap: profile.market_cap,
            beta: profile.beta,
            exchange: profile.exchange,
            industry: profile.industry,
            sector: profile.sector,
            country: profile.country,
            is_etf: profile.is_etf,
            is_fund: profile.is_fund,
            is_actively_trading: profile.is_actively_trading,
            is_adr: profile.is_adr,
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::income_statement)]
#[diesel(primary_key(symbol, fiscal_year, period))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IncomeStatementDB {
    pub symbol: String,
    pub fiscal_year: i32,
    pub period: String,
    pub date: Option<String>,
    pub reported_currency: Option<String>,
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub eps: Option<f64>,
}

impl From<IncomeStatement> for IncomeStatementDB {
    fn from(statement: IncomeStatement) -> Self {
        Self {
            symbol: statement.symbol,
            fiscal_year: statement.fiscal_year,
            period: statement.period,
            date: statement.date,
            reported_currency: statement.reported_currency,
            revenue: statement.revenue,
            gross_profit: statement.gross_profit,
            operating_income: statement.operating_income,
            net_income: statement.net_income,
            eps: statement.eps,
        }
    }
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::balance_sheet)]
#[diesel(primary_key(symbol, fiscal_year, period))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BalanceSheetDB {
    pub symbol: String,
    pub fiscal_year: i32,
    pub period: String,
    pub date: Option<String>,
    pub reported_currency: Option<String>,
    pub cash_and_cash_equivalents: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_stockholders_equity: Option<f64>,
    pub total_debt: Option<f64>,
}

impl From<BalanceSheet> for BalanceSheetDB {
    fn from(sheet: BalanceSheet) -> Self {
        Self {
            symbol: sheet.symbol,
            fiscal_year: sheet.fiscal_year,
            period: sheet.period,
            date: sheet.date,
            reported_currency: sheet.reported_currency,
            cash_and_cash_equivalents: sheet.cash_and_cash_equivalents,
            total_assets: sheet.total_assets,
            total_liabilities: sheet.total_liabilities,
            total_stockholders_equity: sheet.total_stockholders_equity,
            total_debt: sheet.total_debt,
        }
    }
}

/// Forex pair metadata. Prices are written separately by quote refreshes.
#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::forex)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ForexPairDB {
    pub symbol: String,
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    pub from_name: Option<String>,
    pub to_name: Option<String>,
}

impl ForexPairDB {
    pub fn has_metadata(&self) -> bool {
        self.from_currency.is_some()
            || self.to_currency.is_some()
            || self.from_name.is_some()
            || self.to_name.is_some()
    }
}

impl From<ForexPair> for ForexPairDB {
    fn from(pair: ForexPair) -> Self {
        Self {
            symbol: pair.symbol,
            from_currency: pair.from_currency.map(|c| c.trim().to_uppercase()),
            to_currency: pair.to_currency.map(|c| c.trim().to_uppercase()),
            from_name: pair.from_name,
            to_name: pair.to_name,
        }
    }
}
