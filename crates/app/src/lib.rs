pub mod app;
pub mod error;
pub mod logging;
pub mod services;

pub use app::{AppConfig, AppState};
pub use error::{AppError, Result};
pub use logging::{LogConfig, init_tracing};
pub use rollup::CancelToken;
pub use services::{AppServices, RollupService, RunSummary, SiteOutcome, SiteStatus};
pub use stats_db::Dialect;
