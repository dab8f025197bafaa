mod cancel;
mod pipeline;
mod types;

pub use cancel::CancelToken;
pub use pipeline::{
    fetch_hourly_counts, replace_browser_stats, update_browser_stats, write_browser_stats,
};
pub use types::{Result, RollupError, RollupStage, RollupStats};
