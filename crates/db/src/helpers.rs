use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Row;
use stats_core::{Site, SummaryRow};

use crate::error::{DbError, Result};

/// Storage format of `hits.created_at` and `sites.last_stat`, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Storage format of `browser_stats.day` and of watermark parameters.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)?)
}

pub(crate) fn parse_day(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, DAY_FORMAT)?)
}

pub(crate) fn count_from_sql(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| DbError::InvalidValue(format!("negative count {value}")))
}

pub(crate) fn count_to_sql(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| DbError::InvalidValue(format!("count {value} out of range")))
}

/// Undecoded `sites` row; timestamps are parsed outside the rusqlite callback
/// so parse failures surface as [`DbError::TimeParse`].
pub(crate) struct SiteRecord {
    pub(crate) id: i64,
    pub(crate) code: String,
    last_stat: Option<String>,
}

pub(crate) fn row_to_site_record(
    row: &Row<'_>,
) -> std::result::Result<SiteRecord, rusqlite::Error> {
    Ok(SiteRecord {
        id: row.get(0)?,
        code: row.get(1)?,
        last_stat: row.get(2)?,
    })
}

impl SiteRecord {
    pub(crate) fn decode(self) -> Result<Site> {
        Ok(Site {
            id: self.id,
            code: self.code,
            last_stat: self.last_stat.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

pub(crate) struct SummaryRecord {
    site_id: i64,
    day: String,
    browser: String,
    version: String,
    count: i64,
    mobile: bool,
}

pub(crate) fn row_to_summary_record(
    row: &Row<'_>,
) -> std::result::Result<SummaryRecord, rusqlite::Error> {
    Ok(SummaryRecord {
        site_id: row.get(0)?,
        day: row.get(1)?,
        browser: row.get(2)?,
        version: row.get(3)?,
        count: row.get(4)?,
        mobile: row.get(5)?,
    })
}

impl SummaryRecord {
    pub(crate) fn decode(self) -> Result<SummaryRow> {
        Ok(SummaryRow {
            site_id: self.site_id,
            day: parse_day(&self.day)?,
            browser: self.browser,
            version: self.version,
            count: count_from_sql(self.count)?,
            mobile: self.mobile,
        })
    }
}
