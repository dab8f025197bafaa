mod aggregate;
mod classify;
mod user_agent;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub use aggregate::{aggregate, aggregate_counted, summary_rows};
pub use classify::classify;
pub use user_agent::UserAgent;

/// A tracked site and its rollup checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub code: String,
    pub last_stat: Option<NaiveDateTime>,
}

impl Site {
    /// Earliest day that has to be recomputed for this site.
    ///
    /// Time of day is dropped, so the whole day of the last checkpoint is
    /// rebuilt. Sites that were never rolled up start at the Unix epoch.
    pub fn watermark(&self) -> NaiveDate {
        self.last_stat
            .map(|ts| ts.date())
            .unwrap_or_else(epoch_watermark)
    }
}

pub fn epoch_watermark() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

/// Hits for one user-agent string within one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHourlyCount {
    pub browser: String,
    pub count: u64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedBrowser {
    pub family: String,
    pub version: String,
    pub mobile: bool,
}

impl ClassifiedBrowser {
    pub fn is_discarded(&self) -> bool {
        self.family.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyGroupKey {
    pub day: NaiveDate,
    pub family: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGroupValue {
    pub count: u64,
    pub mobile: bool,
    pub day: NaiveDate,
    pub family: String,
    pub version: String,
}

pub type DailyGroups = BTreeMap<DailyGroupKey, DailyGroupValue>;

/// One persisted row of the daily browser summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub site_id: i64,
    pub day: NaiveDate,
    pub browser: String,
    pub version: String,
    pub count: u64,
    pub mobile: bool,
}

/// A raw request as recorded by the ingestion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub browser: String,
    pub created_at: NaiveDateTime,
}
