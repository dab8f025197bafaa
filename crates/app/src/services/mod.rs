mod browser_stats;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use stats_db::Db;

pub use browser_stats::{RollupService, RunSummary, SiteOutcome, SiteStatus};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub rollup: RollupService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            rollup: RollupService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
