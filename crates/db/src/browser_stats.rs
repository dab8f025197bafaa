use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Transaction, TransactionBehavior, params, params_from_iter};
use stats_core::SummaryRow;

use crate::Db;
use crate::error::Result;
use crate::helpers::{count_to_sql, format_day, row_to_summary_record};

const INSERT_COLUMNS: usize = 6;
/// Rows per multi-row INSERT; keeps bound parameters well below SQLite's limit.
const INSERT_CHUNK_ROWS: usize = 500;

/// Replaces summary rows inside one write transaction.
///
/// Nothing is visible to other connections until [`commit`](Self::commit).
/// Dropping the writer without committing rolls back the delete as well, so a
/// failed insert never leaves the window empty.
pub struct BrowserStatsWriter<'conn> {
    tx: Transaction<'conn>,
}

impl Db {
    pub fn browser_stats_writer(&mut self) -> Result<BrowserStatsWriter<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(BrowserStatsWriter { tx })
    }

    pub fn list_browser_stats(&self, site_id: i64) -> Result<Vec<SummaryRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT site, day, browser, version, count, mobile
            FROM browser_stats
            WHERE site = ?1
            ORDER BY day ASC, browser ASC, version ASC
            "#,
        )?;
        let records = stmt
            .query_map(params![site_id], row_to_summary_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        records.into_iter().map(|record| record.decode()).collect()
    }
}

impl BrowserStatsWriter<'_> {
    /// Deletes the site's rows from `since` onwards. Returns rows removed.
    pub fn delete_since(&self, site_id: i64, since: NaiveDate) -> Result<usize> {
        let deleted = self.tx.execute(
            "DELETE FROM browser_stats WHERE site = ?1 AND day >= ?2",
            params![site_id, format_day(since)],
        )?;
        Ok(deleted)
    }

    /// Bulk-inserts rows with batched multi-row INSERT statements.
    pub fn insert(&self, rows: &[SummaryRow]) -> Result<usize> {
        let mut inserted = 0usize;
        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut values = Vec::with_capacity(chunk.len() * INSERT_COLUMNS);
            for row in chunk {
                values.push(Value::Integer(row.site_id));
                values.push(Value::Text(format_day(row.day)));
                values.push(Value::Text(row.browser.clone()));
                values.push(Value::Text(row.version.clone()));
                values.push(Value::Integer(count_to_sql(row.count)?));
                values.push(Value::Integer(i64::from(row.mobile)));
            }
            let sql = insert_sql(chunk.len());
            let mut stmt = self.tx.prepare_cached(&sql)?;
            inserted += stmt.execute(params_from_iter(values))?;
        }
        Ok(inserted)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn insert_sql(rows: usize) -> String {
    let placeholders = vec!["(?, ?, ?, ?, ?, ?)"; rows].join(", ");
    format!(
        "INSERT INTO browser_stats (site, day, browser, version, count, mobile) VALUES {placeholders}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sql_has_one_tuple_per_row() {
        let sql = insert_sql(3);
        assert_eq!(sql.matches("(?, ?, ?, ?, ?, ?)").count(), 3);
        assert_eq!(sql.matches('?').count(), 3 * INSERT_COLUMNS);
    }
}
