use std::time::Instant;

use chrono::NaiveDate;
use stats_core::{DailyGroups, RawHourlyCount, Site, aggregate_counted, summary_rows};
use stats_db::{Db, DbError, Dialect};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::types::{Result, RollupError, RollupStats};

/// Rebuilds a site's daily browser summary from its last checkpoint onwards.
///
/// Reads hour-bucketed hit counts since the site's watermark, classifies and
/// groups them per day, then swaps the summary rows for that window in one
/// transaction. The checkpoint itself is left alone; the caller advances it
/// once this returns `Ok`.
///
/// Cancellation is honoured up to the point the write transaction starts.
pub fn update_browser_stats(
    db: &mut Db,
    site: &Site,
    dialect: Dialect,
    cancel: &CancelToken,
) -> Result<RollupStats> {
    let started = Instant::now();
    let watermark = site.watermark();
    if cancel.is_cancelled() {
        return Err(RollupError::Cancelled { site_id: site.id });
    }

    let rows = fetch_hourly_counts(db, site.id, watermark, dialect)?;
    let mut stats = write_browser_stats(db, site, &rows, cancel)?;
    stats.elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        site_id = stats.site_id,
        watermark = %stats.watermark,
        %dialect,
        rows_read = stats.rows_read,
        rows_deleted = stats.rows_deleted,
        groups_written = stats.groups_written,
        elapsed_ms = stats.elapsed_ms,
        "browser stats updated"
    );
    Ok(stats)
}

/// Aggregates already fetched hourly counts and swaps them into the site's
/// summary from its watermark onwards. `cancel` is checked once more before
/// the write transaction opens.
pub fn write_browser_stats(
    db: &mut Db,
    site: &Site,
    rows: &[RawHourlyCount],
    cancel: &CancelToken,
) -> Result<RollupStats> {
    let started = Instant::now();
    let watermark = site.watermark();
    let (groups, discarded) = aggregate_counted(rows);
    if discarded > 0 {
        debug!(
            site_id = site.id,
            discarded, "skipped unclassifiable user agents"
        );
    }

    if cancel.is_cancelled() {
        return Err(RollupError::Cancelled { site_id: site.id });
    }
    let deleted = replace_browser_stats(db, site.id, watermark, &groups)?;

    Ok(RollupStats {
        site_id: site.id,
        watermark,
        rows_read: rows.len(),
        rows_discarded: discarded,
        rows_deleted: deleted,
        groups_written: groups.len(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

pub fn fetch_hourly_counts(
    db: &Db,
    site_id: i64,
    watermark: NaiveDate,
    dialect: Dialect,
) -> Result<Vec<RawHourlyCount>> {
    db.hourly_browser_counts(site_id, watermark, dialect)
        .map_err(|source| RollupError::Read {
            site_id,
            watermark,
            source,
        })
}

/// Deletes the site's summary rows from `watermark` on and inserts `groups`,
/// committing both together. Returns the number of rows deleted.
pub fn replace_browser_stats(
    db: &mut Db,
    site_id: i64,
    watermark: NaiveDate,
    groups: &DailyGroups,
) -> Result<usize> {
    let delete_err = |source: DbError| RollupError::Delete {
        site_id,
        watermark,
        source,
    };
    let write_err = |source: DbError| RollupError::Write {
        site_id,
        watermark,
        source,
    };

    let writer = db.browser_stats_writer().map_err(delete_err)?;
    let deleted = writer.delete_since(site_id, watermark).map_err(delete_err)?;
    writer
        .insert(&summary_rows(site_id, groups))
        .map_err(write_err)?;
    writer.commit().map_err(write_err)?;
    Ok(deleted)
}
