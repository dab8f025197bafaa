use chrono::Utc;
use rusqlite::{Connection, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::TIMESTAMP_FORMAT;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_stats_indexes.sql");

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_stats_indexes", MIGRATION_0002),
];

impl Db {
    /// Applies every migration that is not yet recorded in `schema_migration`.
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migration (
              name TEXT PRIMARY KEY,
              applied_at TEXT NOT NULL
            );
            "#,
        )?;
        for (name, sql) in MIGRATIONS {
            if migration_applied(&tx, name)? {
                continue;
            }
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO schema_migration (name, applied_at) VALUES (?1, ?2)",
                params![name, Utc::now().format(TIMESTAMP_FORMAT).to_string()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn applied_migrations(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM schema_migration ORDER BY name ASC")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn migration_applied(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM schema_migration WHERE name = ?1")?;
    Ok(stmt.exists(params![name])?)
}
