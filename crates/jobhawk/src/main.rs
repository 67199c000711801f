use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use jobhawk_core::config::JobhawkConfig;
use jobhawk_engine::{ApplicationEngine, Sweeper};
use jobhawk_hh::{HhClient, HhRefresher};
use jobhawk_store::{CredentialStore, PreferenceStore, SubmissionLedger};
use jobhawk_telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobhawk=info".into()),
        )
        .init();

    // load config: JOBHAWK_CONFIG env > ~/.jobhawk/jobhawk.toml
    let config_path = std::env::var("JOBHAWK_CONFIG").ok();
    let config = JobhawkConfig::load(config_path.as_deref())?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    jobhawk_store::db::init_db(&db)?;
    info!("database schema ready");

    // each store gets its own connection for thread safety
    let credentials = Arc::new(CredentialStore::new(rusqlite::Connection::open(db_path)?));
    let prefs = Arc::new(PreferenceStore::new(rusqlite::Connection::open(db_path)?));
    let ledger = Arc::new(SubmissionLedger::new(rusqlite::Connection::open(db_path)?));

    let api = Arc::new(HhClient::new(&config.hh, config.engine.per_page));
    let refresher = Arc::new(HhRefresher::new(&config.hh, Arc::clone(&credentials)));
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram));

    let engine = Arc::new(ApplicationEngine::new(
        credentials,
        prefs,
        ledger,
        api,
        refresher,
        notifier,
        Duration::from_millis(config.engine.apply_pause_ms),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper = Sweeper::new(
        engine,
        Duration::from_secs(config.engine.sweep_interval_secs),
    );
    let sweeper_task = tokio::spawn(sweeper.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = sweeper_task.await;

    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
