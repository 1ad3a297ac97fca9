use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::{max, sql};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable};
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;
use log::debug;

use stockdice_core::dice::{AnnualFundamentals, EquityProfile, UniverseRepositoryTrait};
use stockdice_core::fx::{ForexRateRepositoryTrait, USD};
use stockdice_core::records::{DeletePredicate, RecordStore};
use stockdice_core::{Error, Result};
use stockdice_market_data::{
    BalanceSheet, Dataset, ForexPair, Record, RecordKey, PLACEHOLDER_FISCAL_YEAR,
    PLACEHOLDER_PERIOD,
};

use super::model::{
    BalanceSheetDB, CompanyProfileDB, ForexPairDB, IncomeStatementDB, SymbolListingDB,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{balance_sheet, company_profile, forex, income_statement, symbol_list};

/// Conflict-clause stamp: an existing `last_updated_us` is only ever raised.
const RAISE_LAST_UPDATED: &str = "MAX(COALESCE(last_updated_us, 0), excluded.last_updated_us)";

const ANNUAL_PERIOD: &str = "FY";

/// SQLite implementation of every store the core reads and writes.
#[derive(Clone)]
pub struct RecordRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RecordRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn write_record(
    conn: &mut SqliteConnection,
    dataset: Dataset,
    record: Record,
    last_updated_us: i64,
) -> QueryResult<usize> {
    match record {
        Record::Symbol(listing) => {
            let row = SymbolListingDB::from(listing);
            diesel::insert_into(symbol_list::table)
                .values((&row, symbol_list::last_updated_us.eq(last_updated_us)))
                .on_conflict(symbol_list::symbol)
                .do_update()
                .set((
                    &row,
                    symbol_list::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)),
                ))
                .execute(conn)
        }
        Record::CompanyProfile(profile) => {
            let row = CompanyProfileDB::from(profile);
            diesel::insert_into(company_profile::table)
                .values((&row, company_profile::last_updated_us.eq(last_updated_us)))
                .on_conflict(company_profile::symbol)
                .do_update()
                .set((
                    &row,
                    company_profile::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)),
                ))
                .execute(conn)
        }
        Record::IncomeStatement(statement) => {
            let row = IncomeStatementDB::from(statement);
            diesel::insert_into(income_statement::table)
                .values((&row, income_statement::last_updated_us.eq(last_updated_us)))
                .on_conflict((
                    income_statement::symbol,
                    income_statement::fiscal_year,
                    income_statement::period,
                ))
                .do_update()
                .set((
                    &row,
                    income_statement::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)),
                ))
                .execute(conn)
        }
        Record::BalanceSheet(sheet) => {
            let row = BalanceSheetDB::from(sheet);
            diesel::insert_into(balance_sheet::table)
                .values((&row, balance_sheet::last_updated_us.eq(last_updated_us)))
                .on_conflict((
                    balance_sheet::symbol,
                    balance_sheet::fiscal_year,
                    balance_sheet::period,
                ))
                .do_update()
                .set((
                    &row,
                    balance_sheet::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)),
                ))
                .execute(conn)
        }
        Record::ForexQuote(quote) => diesel::insert_into(forex::table)
            .values((
                forex::symbol.eq(&quote.symbol),
                forex::price.eq(quote.price),
                forex::last_updated_us.eq(Some(last_updated_us)),
            ))
            .on_conflict(forex::symbol)
            .do_update()
            .set((
                forex::price.eq(excluded(forex::price)),
                forex::last_updated_us.eq(sql::<Nullable<BigInt>>(RAISE_LAST_UPDATED)),
            ))
            .execute(conn),
        Record::Placeholder(key) => write_placeholder(conn, dataset, &key, last_updated_us),
    }
}

/// Insert the key columns only, or raise the stamp of an existing row
/// without touching its values.
fn write_placeholder(
    conn: &mut SqliteConnection,
    dataset: Dataset,
    key: &RecordKey,
    last_updated_us: i64,
) -> QueryResult<usize> {
    let fiscal_year = key.fiscal_year.unwrap_or(PLACEHOLDER_FISCAL_YEAR);
    let period = key.period.as_deref().unwrap_or(PLACEHOLDER_PERIOD);

    match dataset {
        Dataset::Symbols => diesel::insert_into(symbol_list::table)
            .values((
                symbol_list::symbol.eq(&key.symbol),
                symbol_list::last_updated_us.eq(last_updated_us),
            ))
            .on_conflict(symbol_list::symbol)
            .do_update()
            .set(symbol_list::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)))
            .execute(conn),
        Dataset::CompanyProfile => diesel::insert_into(company_profile::table)
            .values((
                company_profile::symbol.eq(&key.symbol),
                company_profile::last_updated_us.eq(last_updated_us),
            ))
            .on_conflict(company_profile::symbol)
            .do_update()
            .set(company_profile::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)))
            .execute(conn),
        Dataset::IncomeStatement => diesel::insert_into(income_statement::table)
            .values((
                income_statement::symbol.eq(&key.symbol),
                income_statement::fiscal_year.eq(fiscal_year),
                income_statement::period.eq(period),
                income_statement::last_updated_us.eq(last_updated_us),
            ))
            .on_conflict((
                income_statement::symbol,
                income_statement::fiscal_year,
                income_statement::period,
            ))
            .do_update()
            .set(income_statement::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)))
            .execute(conn),
        Dataset::BalanceSheet => diesel::insert_into(balance_sheet::table)
            .values((
                balance_sheet::symbol.eq(&key.symbol),
                balance_sheet::fiscal_year.eq(fiscal_year),
                balance_sheet::period.eq(period),
                balance_sheet::last_updated_us.eq(last_updated_us),
            ))
            .on_conflict((
                balance_sheet::symbol,
                balance_sheet::fiscal_year,
                balance_sheet::period,
            ))
            .do_update()
            .set(balance_sheet::last_updated_us.eq(sql::<BigInt>(RAISE_LAST_UPDATED)))
            .execute(conn),
        Dataset::Forex => diesel::insert_into(forex::table)
            .values((
                forex::symbol.eq(&key.symbol),
                forex::last_updated_us.eq(Some(last_updated_us)),
            ))
            .on_conflict(forex::symbol)
            .do_update()
            .set(forex::last_updated_us.eq(sql::<Nullable<BigInt>>(RAISE_LAST_UPDATED)))
            .execute(conn),
    }
}

/// Drop the periodic placeholder rows of `symbols` once real rows exist.
fn clear_placeholders(
    conn: &mut SqliteConnection,
    dataset: Dataset,
    symbols: &[String],
) -> QueryResult<usize> {
    match dataset {
        Dataset::IncomeStatement => diesel::delete(
            income_statement::table
                .filter(income_statement::symbol.eq_any(symbols))
                .filter(income_statement::fiscal_year.eq(PLACEHOLDER_FISCAL_YEAR))
                .filter(income_statement::period.eq(PLACEHOLDER_PERIOD)),
        )
        .execute(conn),
        Dataset::BalanceSheet => diesel::delete(
            balance_sheet::table
                .filter(balance_sheet::symbol.eq_any(symbols))
                .filter(balance_sheet::fiscal_year.eq(PLACEHOLDER_FISCAL_YEAR))
                .filter(balance_sheet::period.eq(PLACEHOLDER_PERIOD)),
        )
        .execute(conn),
        _ => Ok(0),
    }
}

#[async_trait]
impl RecordStore for RecordRepository {
    fn get_last_updated(&self, dataset: Dataset, symbol: &str) -> Result<Option<i64>> {
        let mut conn = get_connection(&self.pool)?;
        match dataset {
            Dataset::Symbols => symbol_list::table
                .filter(symbol_list::symbol.eq(symbol))
                .select(max(symbol_list::last_updated_us))
                .get_result::<Option<i64>>(&mut conn),
            Dataset::CompanyProfile => company_profile::table
                .filter(company_profile::symbol.eq(symbol))
                .select(max(company_profile::last_updated_us))
                .get_result::<Option<i64>>(&mut conn),
            Dataset::IncomeStatement => income_statement::table
                .filter(income_statement::symbol.eq(symbol))
                .select(max(income_statement::last_updated_us))
                .get_result::<Option<i64>>(&mut conn),
            Dataset::BalanceSheet => balance_sheet::table
                .filter(balance_sheet::symbol.eq(symbol))
                .select(max(balance_sheet::last_updated_us))
                .get_result::<Option<i64>>(&mut conn),
            Dataset::Forex => forex::table
                .filter(forex::symbol.eq(symbol))
                .select(max(forex::last_updated_us))
                .get_result::<Option<i64>>(&mut conn),
        }
        .into_core()
    }

    fn list_symbols(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        symbol_list::table
            .select(symbol_list::symbol)
            .order(symbol_list::symbol.asc())
            .load::<String>(&mut conn)
            .into_core()
    }

    fn list_forex_symbols(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        forex::table
            .filter(forex::to_currency.eq(USD))
            .select(forex::symbol)
            .order(forex::symbol.asc())
            .load::<String>(&mut conn)
            .into_core()
    }

    fn fund_or_etf_symbols(&self) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;
        let symbols = company_profile::table
            .filter(
                company_profile::is_etf
                    .eq(true)
                    .or(company_profile::is_fund.eq(true)),
            )
            .select(company_profile::symbol)
            .load::<String>(&mut conn)
            .into_core()?;
        Ok(symbols.into_iter().collect())
    }

    async fn upsert(
        &self,
        dataset: Dataset,
        records: Vec<Record>,
        last_updated_us: i64,
    ) -> Result<usize> {
        if let Some(stray) = records.iter().find(|record| !record.belongs_to(dataset)) {
            return Err(Error::Unexpected(format!(
                "record for {} cannot be written to {}",
                stray.symbol(),
                dataset
            )));
        }
        if records.is_empty() {
            return Ok(0);
        }

        self.writer
            .exec(move |conn| {
                if dataset.is_periodic() {
                    let with_data: Vec<String> = records
                        .iter()
                        .filter(|record| !record.is_placeholder())
                        .map(|record| record.symbol().to_string())
                        .collect::<HashSet<_>>()
                        .into_iter()
                        .collect();
                    if !with_data.is_empty() {
                        clear_placeholders(conn, dataset, &with_data).into_core()?;
                    }
                }

                let mut written = 0;
                for record in records {
                    written += write_record(conn, dataset, record, last_updated_us).into_core()?;
                }
                Ok(written)
            })
            .await
    }

    async fn upsert_forex_pairs(&self, pairs: Vec<ForexPair>) -> Result<usize> {
        if pairs.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn| {
                let mut written = 0;
                for pair in pairs {
                    let row = ForexPairDB::from(pair);
                    let insert = diesel::insert_into(forex::table)
                        .values(&row)
                        .on_conflict(forex::symbol);
                    // An all-NULL changeset is empty and cannot be sent.
                    written += if row.has_metadata() {
                        insert.do_update().set(&row).execute(conn)
                    } else {
                        insert.do_nothing().execute(conn)
                    }
                    .into_core()?;
                }
                Ok(written)
            })
            .await
    }

    async fn delete_where(&self, dataset: Dataset, predicate: DeletePredicate) -> Result<usize> {
        let DeletePredicate::LastUpdatedBefore(cutoff) = predicate;
        let deleted = self
            .writer
            .exec(move |conn| {
                match dataset {
                    Dataset::Symbols => diesel::delete(
                        symbol_list::table.filter(symbol_list::last_updated_us.lt(cutoff)),
                    )
                    .execute(conn),
                    Dataset::CompanyProfile => diesel::delete(
                        company_profile::table.filter(company_profile::last_updated_us.lt(cutoff)),
                    )
                    .execute(conn),
                    Dataset::IncomeStatement => diesel::delete(
                        income_statement::table
                            .filter(income_statement::last_updated_us.lt(cutoff)),
                    )
                    .execute(conn),
                    Dataset::BalanceSheet => diesel::delete(
                        balance_sheet::table.filter(balance_sheet::last_updated_us.lt(cutoff)),
                    )
                    .execute(conn),
                    Dataset::Forex => {
                        diesel::delete(forex::table.filter(forex::last_updated_us.lt(cutoff)))
                            .execute(conn)
                    }
                }
                .into_core()
            })
            .await?;
        debug!("Deleted {} {} rows older than {}", deleted, dataset, cutoff);
        Ok(deleted)
    }
}

impl ForexRateRepositoryTrait for RecordRepository {
    fn load_usd_rates(&self) -> Result<Vec<(String, f64)>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = forex::table
            .filter(forex::to_currency.eq(USD))
            .filter(forex::from_currency.is_not_null())
            .filter(forex::price.is_not_null())
            .order(forex::symbol.asc())
            .select((forex::from_currency, forex::price))
            .load::<(Option<String>, Option<f64>)>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .filter_map(|(currency, price)| Some((currency?, price?)))
            .collect())
    }
}

impl UniverseRepositoryTrait for RecordRepository {
    fn load_equity_profiles(&self) -> Result<Vec<EquityProfile>> {
        let mut conn = get_connection(&self.pool)?;
        // NULL flags (placeholders) fail both comparisons. Symbols swept
        // out of the directory are no longer part of the universe.
        let rows = company_profile::table
            .filter(company_profile::symbol.eq_any(symbol_list::table.select(symbol_list::symbol)))
            .filter(company_profile::is_etf.eq(false))
            .filter(company_profile::is_fund.eq(false))
            .order(company_profile::symbol.asc())
            .select((
                company_profile::symbol,
                company_profile::company_name,
                company_profile::currency,
                company_profile::market_cap,
            ))
            .load::<(String, Option<String>, Option<String>, Option<f64>)>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(|(symbol, company_name, currency, market_cap)| EquityProfile {
                symbol,
                company_name,
                currency,
                market_cap,
            })
            .collect())
    }

    fn load_latest_annual_fundamentals(&self) -> Result<Vec<AnnualFundamentals>> {
        let mut conn = get_connection(&self.pool)?;
        let mut latest: BTreeMap<String, AnnualFundamentals> = BTreeMap::new();

        // Rows come newest first per symbol; keep the first one seen.
        let income = income_statement::table
            .filter(income_statement::symbol.eq_any(symbol_list::table.select(symbol_list::symbol)))
            .filter(income_statement::period.eq(ANNUAL_PERIOD))
            .order((
                income_statement::symbol.asc(),
                income_statement::fiscal_year.desc(),
            ))
            .select((
                income_statement::symbol,
                income_statement::reported_currency,
                income_statement::revenue,
                income_statement::net_income,
            ))
            .load::<(String, Option<String>, Option<f64>, Option<f64>)>(&mut conn)
            .into_core()?;
        for (symbol, currency, revenue, net_income) in income {
            latest.entry(symbol.clone()).or_insert_with(|| AnnualFundamentals {
                symbol,
                income_currency: currency,
                revenue,
                net_income,
                ..Default::default()
            });
        }

        let balance = balance_sheet::table
            .filter(balance_sheet::symbol.eq_any(symbol_list::table.select(symbol_list::symbol)))
            .filter(balance_sheet::period.eq(ANNUAL_PERIOD))
            .order((balance_sheet::symbol.asc(), balance_sheet::fiscal_year.desc()))
            .select((
                balance_sheet::symbol,
                balance_sheet::reported_currency,
                balance_sheet::total_assets,
                balance_sheet::total_liabilities,
            ))
            .load::<(String, Option<String>, Option<f64>, Option<f64>)>(&mut conn)
            .into_core()?;
        let mut seen = HashSet::new();
        for (symbol, currency, total_assets, total_liabilities) in balance {
            if !seen.insert(symbol.clone()) {
                continue;
            }
            let book_value = BalanceSheet {
                total_assets,
                total_liabilities,
                ..Default::default()
            }
            .book_value();
            let entry = latest
                .entry(symbol.clone())
                .or_insert_with(|| AnnualFundamentals {
                    symbol,
                    ..Default::default()
                });
            entry.balance_currency = currency;
            entry.book_value = book_value;
        }

        Ok(latest.into_values().collect())
    }
}
