//! Stockdice CLI.
//!
//! Commands:
//! - `init-db` creates the database file and applies migrations
//! - `refresh` brings stored datasets up to date from the provider
//! - `roll` draws random symbols from the stored universe

mod output;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use stockdice_core::utils::{parse_duration, SystemClock};
use stockdice_core::{
    DiceService, RefreshEngine, RefreshScope, StockdiceConfig, UsdConverter, Weighting,
};
use stockdice_market_data::{FmpProvider, RateGate, RetryPolicy};
use stockdice_storage_sqlite::{db, RecordRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use output::{OutputFormat, OutputTarget};

#[derive(Parser)]
#[command(name = "stockdice", about = "Roll random stocks from a locally refreshed universe")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply pending migrations.
    InitDb,
    /// Refresh stored datasets from Financial Modeling Prep. Needs FMP_API_KEY.
    Refresh {
        /// market, all, or one dataset (symbols, company-profile, income-statement, balance-sheet, forex).
        #[arg(long, default_value = "all")]
        scope: String,

        /// Records younger than this are skipped (e.g. 30m, 1h, 7d). Defaults to SD_MAX_AGE.
        #[arg(long)]
        max_age: Option<String>,
    },
    /// Draw symbols with replacement.
    Roll {
        /// Number of rolls. Zero or negative prints no rows.
        #[arg(short = 'n', long = "number", default_value_t = 1, allow_negative_numbers = true)]
        n: i64,

        /// uniform, market-cap or blended.
        #[arg(long, default_value = "market-cap")]
        weighting: String,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Output file. `-` or `--` (the default) writes to stdout.
        #[arg(short = 'o', long, allow_hyphen_values = true)]
        output: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = StockdiceConfig::from_env()?;

    match cli.command {
        Commands::InitDb => run_init_db(&config),
        Commands::Refresh { scope, max_age } => run_refresh(&config, &scope, max_age).await,
        Commands::Roll {
            n,
            weighting,
            format,
            output,
        } => {
            let weighting: Weighting = weighting.parse()?;
            let target = OutputTarget::parse(output.as_deref());
            run_roll(&config, n, weighting, format, &target).await
        }
    }
}

fn open_pool(config: &StockdiceConfig) -> Result<Arc<db::DbPool>> {
    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    Ok(pool)
}

fn run_init_db(config: &StockdiceConfig) -> Result<()> {
    open_pool(config)?;
    println!("Database ready at {}", config.db_path.display());
    Ok(())
}

async fn run_refresh(config: &StockdiceConfig, scope: &str, max_age: Option<String>) -> Result<()> {
    let api_key = config.require_fmp_api_key()?.to_string();
    let scope: RefreshScope = scope.parse()?;
    let max_age: Duration = match max_age {
        Some(raw) => parse_duration(&raw)?,
        None => config.max_age,
    };

    let pool = open_pool(config)?;
    let writer = db::spawn_writer((*pool).clone());
    let repository = Arc::new(RecordRepository::new(pool, writer));
    let engine = RefreshEngine::new(
        Arc::new(FmpProvider::new(api_key)),
        repository.clone(),
        Arc::new(RateGate::new(config.requests_per_minute)),
        RetryPolicy::new(config.min_backoff),
        Arc::new(SystemClock),
    )
    .with_usd_converter(UsdConverter::new(repository));

    let report = engine.refresh_scope(scope, max_age).await;
    for summary in &report.summaries {
        println!("{}", summary);
    }
    for (dataset, err) in &report.failures {
        eprintln!("{}: {}", dataset, err);
    }
    if !report.is_success() {
        bail!("{} dataset(s) failed to refresh", report.failures.len());
    }
    Ok(())
}

async fn run_roll(
    config: &StockdiceConfig,
    n: i64,
    weighting: Weighting,
    format: OutputFormat,
    target: &OutputTarget,
) -> Result<()> {
    let pool = open_pool(config)?;
    let writer = db::spawn_writer((*pool).clone());
    let repository = Arc::new(RecordRepository::new(pool, writer));
    let dice = DiceService::new(repository.clone(), UsdConverter::new(repository));

    let rolls = dice.roll_with(n, weighting, &mut rand::thread_rng())?;
    output::emit(&rolls, format, target)
}
