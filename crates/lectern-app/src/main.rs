use std::sync::Arc;

use clap::Parser;
use lectern_core::config::load_config;
use lectern_db::db::connection::create_pool;
use lectern_db::db::directory::PgNameDirectory;
use lectern_db::db::migrations::run_migrations;
use lectern_db::db::store::PgOccurrenceStore;
use lectern_service::clock::SystemClock;
use lectern_service::sweep::ScheduleSweeper;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// Recurring class-schedule service.
#[derive(Parser, Debug)]
#[command(name = "lectern", version, about)]
struct Cli {
    /// Run a single sweep and exit instead of starting the timer.
    #[arg(long, env = "LECTERN_ONCE")]
    once: bool,

    /// Skip applying pending database migrations on startup.
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Lectern schedule service");

    let config = load_config()?;

    tracing::info!(schedule = ?config.schedule, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let tz = config.schedule.tz()?;

    if cli.skip_migrations {
        tracing::warn!("Skipping database migrations");
    } else {
        run_migrations(&config.database.url).await?;
    }

    let pool = create_pool(&config.database).await?;

    let sweeper = Arc::new(ScheduleSweeper::new(
        Arc::new(PgOccurrenceStore::new(pool.clone())),
        Arc::new(PgNameDirectory::new(pool)),
        Arc::new(SystemClock::new(tz)),
        config.schedule.clone(),
    ));

    if cli.once {
        let summary = sweeper.run_sweep_once().await;
        tracing::info!(?summary, "Single sweep complete");
        return Ok(());
    }

    let Some(handle) = sweeper.start_periodic_sweep() else {
        anyhow::bail!("schedule sweep was already started");
    };

    shutdown_signal().await;
    tracing::info!("Shutdown requested, waiting for the current sweep to finish");

    handle.stop();
    handle.join().await?;

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
