use chrono::NaiveDate;
use serde::Serialize;
use stats_db::DbError;

/// Outcome of one successful site rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollupStats {
    pub site_id: i64,
    pub watermark: NaiveDate,
    pub rows_read: usize,
    pub rows_discarded: usize,
    pub rows_deleted: usize,
    pub groups_written: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupStage {
    Read,
    Delete,
    Write,
}

impl RollupStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Write => "write",
        }
    }
}

/// Errors that abort a site rollup. None of them are retried here; the whole
/// run can be repeated from the same watermark.
#[derive(Debug, thiserror::Error)]
pub enum RollupError {
    #[error("site {site_id}: fetch hits since {watermark}: {source}")]
    Read {
        site_id: i64,
        watermark: NaiveDate,
        source: DbError,
    },
    #[error("site {site_id}: delete browser stats since {watermark}: {source}")]
    Delete {
        site_id: i64,
        watermark: NaiveDate,
        source: DbError,
    },
    #[error("site {site_id}: write browser stats since {watermark}: {source}")]
    Write {
        site_id: i64,
        watermark: NaiveDate,
        source: DbError,
    },
    #[error("site {site_id}: cancelled before writing")]
    Cancelled { site_id: i64 },
}

impl RollupError {
    pub fn site_id(&self) -> i64 {
        match self {
            Self::Read { site_id, .. }
            | Self::Delete { site_id, .. }
            | Self::Write { site_id, .. }
            | Self::Cancelled { site_id } => *site_id,
        }
    }

    /// Stage that failed; `None` for cancellation.
    pub fn stage(&self) -> Option<RollupStage> {
        match self {
            Self::Read { .. } => Some(RollupStage::Read),
            Self::Delete { .. } => Some(RollupStage::Delete),
            Self::Write { .. } => Some(RollupStage::Write),
            Self::Cancelled { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RollupError>;
