//! Background tasks: the trading-hours refresh loop and replica backups.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stockdice_core::utils::trading_hours::{
    duration_until_next_trading_hours, is_new_york_regular_trading_hours,
};
use stockdice_core::{RefreshEngine, RefreshReport};
use stockdice_storage_sqlite::db;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Lower bound between two market-hours passes, so a pass over an
/// all-fresh store does not spin.
const MIN_MARKET_PASS_INTERVAL: Duration = Duration::from_secs(60);

/// Starts the refresh loop when the server has a refresh engine.
///
/// During New York trading hours only fast-moving data (symbols, forex,
/// profiles) is refreshed. Outside them everything is refreshed once, then
/// the loop sleeps until the next open.
pub fn start_refresh_scheduler(state: Arc<AppState>) {
    let Some(engine) = state.refresh_engine.clone() else {
        return;
    };
    let max_age = state.config.max_age;

    tokio::spawn(async move {
        info!("Refresh scheduler started (max age {:?})", max_age);
        loop {
            run_refresh_pass(&engine, max_age).await;
        }
    });
}

async fn run_refresh_pass(engine: &RefreshEngine, max_age: Duration) {
    if is_new_york_regular_trading_hours(Utc::now()) {
        let started = Instant::now();
        log_report("market data", &engine.refresh_market_data(max_age).await);
        let elapsed = started.elapsed();
        if elapsed < MIN_MARKET_PASS_INTERVAL {
            sleep(MIN_MARKET_PASS_INTERVAL - elapsed).await;
        }
    } else {
        log_report("full", &engine.refresh_everything(max_age).await);
        let wait = duration_until_next_trading_hours(Utc::now());
        info!(
            "Outside of trading hours. Sleeping for {:.2} hours.",
            wait.as_secs_f64() / 3600.0
        );
        sleep(wait).await;
    }
}

fn log_report(label: &str, report: &RefreshReport) {
    for summary in &report.summaries {
        info!("{}", summary);
    }
    if report.is_success() {
        info!("Scheduled {} refresh completed", label);
    } else {
        warn!(
            "Scheduled {} refresh finished with {} failed dataset(s)",
            label,
            report.failures.len()
        );
    }
}

/// Starts the periodic `VACUUM INTO` replica backup. Failures are logged
/// and retried on the next tick.
pub fn start_backup_scheduler(state: Arc<AppState>) {
    let period = state.config.backup_interval;
    if period.is_zero() {
        info!("Replica backup disabled (zero interval)");
        return;
    }

    tokio::spawn(async move {
        info!(
            "Backup scheduler started ({:?} interval, replica {})",
            period,
            state.config.replica_path.display()
        );
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let pool = state.pool.clone();
            let replica = state.config.replica_path.clone();
            match tokio::task::spawn_blocking(move || db::backup_database(&pool, &replica)).await
            {
                Ok(Ok(path)) => debug!("Replica written to {}", path.display()),
                Ok(Err(e)) => warn!("Scheduled backup failed: {}", e),
                Err(e) => warn!("Scheduled backup task panicked: {}", e),
            }
        }
    });
}
