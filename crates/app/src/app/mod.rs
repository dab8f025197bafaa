use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::services::AppServices;
use stats_db::{Db, Dialect};

/// Settings needed to run browser stat rollups.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub dialect: Dialect,
    /// Sites rolled up in parallel; 0 lets rayon pick.
    pub workers: usize,
}

impl AppConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            dialect: Dialect::default(),
            workers: 0,
        }
    }
}

/// Application state shared by frontends (CLI, tests).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        if let Some(parent) = self.config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut db = Db::open(&self.config.db_path)
            .map_err(|err| AppError::Message(format!("open db: {}", err)))?;
        db.migrate()?;
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}
