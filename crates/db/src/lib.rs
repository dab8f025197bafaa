use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

mod browser_stats;
mod dialect;
mod error;
mod helpers;
mod hits;
mod migrations;
mod sites;

pub use browser_stats::BrowserStatsWriter;
pub use dialect::Dialect;
pub use error::{DbError, Result};
pub use helpers::{DAY_FORMAT, TIMESTAMP_FORMAT};
pub use sites::SiteEntry;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }
}
