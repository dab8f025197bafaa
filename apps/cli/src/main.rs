mod args;
mod config;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use stats_app::{
    AppConfig, AppError, AppState, CancelToken, Dialect, LogConfig, RunSummary, SiteStatus,
    init_tracing,
};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let loaded = config::load_or_create(args.config.as_deref()).map_err(io::Error::other)?;
    let config = loaded.config;
    init_tracing(&LogConfig {
        log_level: config.log_level.clone(),
        json: config.log_json,
    });
    if loaded.created {
        info!(path = %loaded.file.display(), "created default config");
    }

    let dialect: Dialect = args
        .dialect
        .as_deref()
        .unwrap_or(&config.dialect)
        .parse()?;
    let app_config = AppConfig {
        db_path: args.db.clone().unwrap_or(config.db_path),
        dialect,
        workers: args.workers.unwrap_or(config.workers),
    };
    info!(
        db = %app_config.db_path.display(),
        %dialect,
        workers = app_config.workers,
        "starting browser stats rollup"
    );

    let state = AppState::new(app_config);
    if let Err(err) = state.setup_db() {
        return Err(io::Error::other(format!("failed to initialize database: {}", err)).into());
    }

    let cancel = CancelToken::new();
    let stopped = Arc::new(Notify::new());
    spawn_interrupt_handler(cancel.clone(), stopped.clone());

    let Some(secs) = args.interval_secs.or(config.interval_secs) else {
        let summary = run_pass(&state, args.site, &cancel).await?;
        report(&summary, args.json)?;
        return Ok(if summary.has_failures() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    };

    let passes = run_interval(
        &state,
        args.site,
        &cancel,
        &stopped,
        Duration::from_secs(secs),
        args.json,
    )
    .await?;
    info!(passes, "rollup loop stopped");
    Ok(ExitCode::SUCCESS)
}

/// Runs a pass on every tick until `stopped` fires or `cancel` is set.
/// A failed pass is logged and the loop waits for the next tick. Returns the
/// number of passes started.
async fn run_interval(
    state: &AppState,
    site: Option<i64>,
    cancel: &CancelToken,
    stopped: &Notify,
    period: Duration,
    json: bool,
) -> Result<usize, serde_json::Error> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut passes = 0usize;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stopped.notified() => break,
        }
        passes += 1;
        match run_pass(state, site, cancel).await {
            Ok(summary) => report(&summary, json)?,
            Err(err) => error!(error = %err, "rollup pass failed; retrying next tick"),
        }
        if cancel.is_cancelled() {
            break;
        }
    }
    Ok(passes)
}

fn spawn_interrupt_handler(cancel: CancelToken, stopped: Arc<Notify>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, cancelling pending rollups");
                cancel.cancel();
                stopped.notify_one();
            }
            Err(err) => error!(error = %err, "failed to listen for ctrl-c"),
        }
    });
}

// Rollups hit SQLite synchronously, so each pass runs off the async workers.
async fn run_pass(
    state: &AppState,
    site: Option<i64>,
    cancel: &CancelToken,
) -> Result<RunSummary, AppError> {
    let service = state.services.rollup.clone();
    let cancel = cancel.clone();
    tokio::task::spawn_blocking(move || match site {
        Some(site_id) => service
            .run_site(site_id, &cancel)
            .map(|outcome| RunSummary::new(vec![outcome])),
        None => service.run_all(&cancel),
    })
    .await
    .map_err(|err| AppError::Message(format!("rollup task failed: {}", err)))?
}

fn report(summary: &RunSummary, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }
    for outcome in &summary.sites {
        let label = format!("{} (#{})", outcome.code, outcome.site_id);
        match &outcome.status {
            SiteStatus::Updated { stats } => println!(
                "{label}: {} groups from {} hourly rows since {}",
                stats.groups_written, stats.rows_read, stats.watermark
            ),
            SiteStatus::Cancelled => println!("{label}: cancelled"),
            SiteStatus::Failed { stage, message } => {
                println!("{label}: failed during {stage}: {message}")
            }
        }
    }
    println!(
        "{} updated, {} failed, {} cancelled",
        summary.updated, summary.failed, summary.cancelled
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_passes_do_not_stop_the_loop() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = AppState::new(AppConfig::new(dir.path().join("stats.sqlite")));
        state.setup_db().expect("setup db");
        let cancel = CancelToken::new();
        let stopped = Arc::new(Notify::new());

        let stopper = stopped.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            stopper.notify_one();
        });

        // Site 42 does not exist, so every pass fails.
        let passes = run_interval(
            &state,
            Some(42),
            &cancel,
            &stopped,
            Duration::from_millis(20),
            true,
        )
        .await
        .expect("loop");
        assert!(passes >= 2, "only {passes} passes ran");
    }

    #[tokio::test]
    async fn cancel_ends_the_loop_after_the_current_pass() {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = AppState::new(AppConfig::new(dir.path().join("stats.sqlite")));
        state.setup_db().expect("setup db");
        let cancel = CancelToken::new();
        cancel.cancel();

        let passes = run_interval(
            &state,
            None,
            &cancel,
            &Notify::new(),
            Duration::from_millis(20),
            true,
        )
        .await
        .expect("loop");
        assert_eq!(passes, 1);
    }
}
