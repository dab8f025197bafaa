use chrono::Utc;
use rayon::prelude::*;
use rollup::{CancelToken, RollupError, RollupStats, update_browser_stats};
use serde::Serialize;
use stats_core::Site;
use tracing::{error, info, warn};

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

/// Result of rolling up one site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteOutcome {
    pub site_id: i64,
    pub code: String,
    #[serde(flatten)]
    pub status: SiteStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SiteStatus {
    Updated { stats: RollupStats },
    Cancelled,
    Failed { stage: String, message: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub updated: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub sites: Vec<SiteOutcome>,
}

impl RunSummary {
    pub fn new(sites: Vec<SiteOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in &sites {
            match outcome.status {
                SiteStatus::Updated { .. } => summary.updated += 1,
                SiteStatus::Cancelled => summary.cancelled += 1,
                SiteStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary.sites = sites;
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Runs the browser stats rollup and moves site checkpoints forward.
#[derive(Clone)]
pub struct RollupService {
    config: SharedConfig,
}

impl RollupService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn run_site(&self, site_id: i64, cancel: &CancelToken) -> Result<SiteOutcome> {
        let site = open_db(&self.config)?
            .get_site(site_id)?
            .ok_or_else(|| AppError::NotFound(format!("site {} not found", site_id)))?;
        Ok(self.run_one(&site, cancel))
    }

    /// Rolls up every site on the worker pool. A failing site, including one
    /// whose checkpoint cannot be read, is logged and reported in the summary;
    /// the remaining sites still run.
    pub fn run_all(&self, cancel: &CancelToken) -> Result<RunSummary> {
        let entries = open_db(&self.config)?.list_site_entries()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|err| AppError::Message(format!("build worker pool: {}", err)))?;
        let outcomes: Vec<SiteOutcome> = pool.install(|| {
            entries
                .par_iter()
                .map(|entry| match &entry.site {
                    Ok(site) => self.run_one(site, cancel),
                    Err(err) => {
                        error!(site_id = entry.id, error = %err, "unreadable checkpoint");
                        SiteOutcome {
                            site_id: entry.id,
                            code: entry.code.clone(),
                            status: failed("checkpoint", err),
                        }
                    }
                })
                .collect()
        });
        let summary = RunSummary::new(outcomes);
        info!(
            sites = summary.sites.len(),
            updated = summary.updated,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "rollup pass finished"
        );
        Ok(summary)
    }

    // Each site gets its own connection so runs share no state.
    fn run_one(&self, site: &Site, cancel: &CancelToken) -> SiteOutcome {
        let started_at = Utc::now().naive_utc();
        let outcome = |status| SiteOutcome {
            site_id: site.id,
            code: site.code.clone(),
            status,
        };

        let mut db = match open_db(&self.config) {
            Ok(db) => db,
            Err(err) => {
                error!(site_id = site.id, error = %err, "failed to open database");
                return outcome(failed("open", &err));
            }
        };

        let stats = match update_browser_stats(&mut db, site, self.config.dialect, cancel) {
            Ok(stats) => stats,
            Err(RollupError::Cancelled { .. }) => {
                info!(site_id = site.id, "rollup cancelled");
                return outcome(SiteStatus::Cancelled);
            }
            Err(err) => {
                let stage = err.stage().map_or("rollup", |stage| stage.as_str());
                error!(site_id = site.id, stage, error = %err, "rollup failed");
                return outcome(failed(stage, &err));
            }
        };

        match db.set_last_stat(site.id, started_at) {
            Ok(true) => {}
            Ok(false) => warn!(site_id = site.id, "site removed during rollup"),
            Err(err) => {
                error!(site_id = site.id, error = %err, "failed to advance checkpoint");
                return outcome(failed("checkpoint", &err));
            }
        }
        outcome(SiteStatus::Updated { stats })
    }
}

fn failed(stage: &str, err: &dyn std::fmt::Display) -> SiteStatus {
    SiteStatus::Failed {
        stage: stage.to_string(),
        message: err.to_string(),
    }
}
