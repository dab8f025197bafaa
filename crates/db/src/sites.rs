use chrono::NaiveDateTime;
use rusqlite::{OptionalExtension, params};
use stats_core::Site;

use crate::Db;
use crate::error::Result;
use crate::helpers::{SiteRecord, format_timestamp, row_to_site_record};

/// A `sites` row whose checkpoint is decoded separately, so one unreadable
/// `last_stat` does not hide the other sites.
#[derive(Debug)]
pub struct SiteEntry {
    pub id: i64,
    pub code: String,
    pub site: Result<Site>,
}

impl Db {
    pub fn create_site(&self, code: &str) -> Result<Site> {
        self.conn
            .execute("INSERT INTO sites (code) VALUES (?1)", params![code])?;
        Ok(Site {
            id: self.conn.last_insert_rowid(),
            code: code.to_string(),
            last_stat: None,
        })
    }

    pub fn get_site(&self, id: i64) -> Result<Option<Site>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, code, last_stat FROM sites WHERE id = ?1",
                params![id],
                row_to_site_record,
            )
            .optional()?;
        record.map(|record| record.decode()).transpose()
    }

    pub fn list_sites(&self) -> Result<Vec<Site>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, last_stat FROM sites ORDER BY id ASC")?;
        let records = stmt
            .query_map([], row_to_site_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        records.into_iter().map(|record| record.decode()).collect()
    }

    /// Like [`list_sites`](Self::list_sites), but checkpoint decode errors are
    /// reported per site instead of failing the whole listing.
    pub fn list_site_entries(&self) -> Result<Vec<SiteEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, last_stat FROM sites ORDER BY id ASC")?;
        let records = stmt
            .query_map([], row_to_site_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records.into_iter().map(site_entry).collect())
    }

    /// Moves the site's rollup checkpoint. Returns false if the site is gone.
    pub fn set_last_stat(&self, id: i64, last_stat: NaiveDateTime) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE sites SET last_stat = ?1 WHERE id = ?2",
            params![format_timestamp(last_stat), id],
        )?;
        Ok(updated > 0)
    }
}

fn site_entry(record: SiteRecord) -> SiteEntry {
    SiteEntry {
        id: record.id,
        code: record.code.clone(),
        site: record.decode(),
    }
}
