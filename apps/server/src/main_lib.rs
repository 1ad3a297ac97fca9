use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use stockdice_core::utils::SystemClock;
use stockdice_core::{DiceService, RefreshEngine, StockdiceConfig, UsdConverter};
use stockdice_market_data::{FmpProvider, RateGate, RetryPolicy};
use stockdice_storage_sqlite::{db, RecordRepository};

use crate::config::Config;

pub const LOG_FORMAT: &str = "SD_LOG_FORMAT";

pub struct AppState {
    pub dice_service: Arc<DiceService>,
    /// Present when background refresh is enabled.
    pub refresh_engine: Option<Arc<RefreshEngine>>,
    pub pool: Arc<db::DbPool>,
    pub config: StockdiceConfig,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var(LOG_FORMAT).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let core = config.core.clone();
    let db_path = db::init(&core.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let repository = Arc::new(RecordRepository::new(pool.clone(), writer));
    let usd_converter = UsdConverter::new(repository.clone());
    let dice_service = Arc::new(DiceService::new(repository.clone(), usd_converter.clone()));

    let refresh_engine = if config.refresh_enabled {
        let api_key = core.require_fmp_api_key()?.to_string();
        let engine = RefreshEngine::new(
            Arc::new(FmpProvider::new(api_key)),
            repository,
            Arc::new(RateGate::new(core.requests_per_minute)),
            RetryPolicy::new(core.min_backoff),
            Arc::new(SystemClock),
        )
        .with_usd_converter(usd_converter);
        Some(Arc::new(engine))
    } else {
        tracing::info!("Background refresh disabled");
        None
    };

    Ok(Arc::new(AppState {
        dice_service,
        refresh_engine,
        pool,
        config: core,
        db_path,
    }))
}
