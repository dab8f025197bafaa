use chrono::NaiveDate;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter};
use stats_core::{Hit, RawHourlyCount};

use crate::Db;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::helpers::{count_from_sql, format_day, format_timestamp, parse_timestamp};

const INSERT_COLUMNS: usize = 3;
const INSERT_CHUNK_ROWS: usize = 500;

impl Db {
    /// Stores hits with batched multi-row INSERT statements in one transaction.
    pub fn insert_hits(&mut self, site_id: i64, hits: &[Hit]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        for chunk in hits.chunks(INSERT_CHUNK_ROWS) {
            let mut values = Vec::with_capacity(chunk.len() * INSERT_COLUMNS);
            for hit in chunk {
                values.push(Value::Integer(site_id));
                values.push(Value::Text(hit.browser.clone()));
                values.push(Value::Text(format_timestamp(hit.created_at)));
            }
            let mut stmt = tx.prepare_cached(&insert_sql(chunk.len()))?;
            inserted += stmt.execute(params_from_iter(values))?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Hit counts per user-agent string and hour for a site, starting at the
    /// beginning of `since`.
    ///
    /// User-agent bytes that are not valid UTF-8 are decoded lossily; the
    /// classifier discards what it cannot recognise.
    pub fn hourly_browser_counts(
        &self,
        site_id: i64,
        since: NaiveDate,
        dialect: Dialect,
    ) -> Result<Vec<RawHourlyCount>> {
        let mut stmt = self.conn.prepare(dialect.hourly_counts_sql())?;
        let rows = stmt
            .query_map(params![site_id, format_day(since)], |row| {
                Ok((
                    lossy_text(row.get_ref(0)?),
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(browser, count, hour)| {
                Ok(RawHourlyCount {
                    browser,
                    count: count_from_sql(count)?,
                    created_at: parse_timestamp(&hour)?,
                })
            })
            .collect()
    }
}

fn lossy_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Null => String::new(),
    }
}

fn insert_sql(rows: usize) -> String {
    let placeholders = vec!["(?, ?, ?)"; rows].join(", ");
    format!("INSERT INTO hits (site, browser, created_at) VALUES {placeholders}")
}
