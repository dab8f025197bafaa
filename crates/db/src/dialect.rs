use std::fmt;
use std::str::FromStr;

use crate::error::DbError;

/// SQL dialect used to bucket hits by hour.
///
/// Both formulations return the hour bucket as text in the form
/// `YYYY-MM-DD HH:00:00` and produce the same `(browser, count, hour)` rows.
/// The Postgres statement only uses functions SQLite also understands, so
/// either one can run against the bundled SQLite database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
}

const SQLITE_HOURLY_COUNTS: &str = r#"
    SELECT
      browser,
      COUNT(browser) AS count,
      strftime('%Y-%m-%d %H:00:00', created_at) AS hour
    FROM hits
    WHERE site = ?1
      AND created_at >= ?2
    GROUP BY browser, strftime('%Y-%m-%d %H', created_at)
    ORDER BY count DESC
"#;

const POSTGRES_HOURLY_COUNTS: &str = r#"
    SELECT
      browser,
      count(browser) AS count,
      substr(cast(created_at AS varchar), 0, 14) || ':00:00' AS hour
    FROM hits
    WHERE site = $1
      AND created_at >= $2
    GROUP BY browser, substr(cast(created_at AS varchar), 0, 14)
    ORDER BY count DESC
"#;

impl Dialect {
    /// Hour-bucketed hit counts for one site since a watermark day.
    /// Parameters: site id, watermark formatted as `YYYY-MM-DD`.
    pub fn hourly_counts_sql(self) -> &'static str {
        match self {
            Self::Sqlite => SQLITE_HOURLY_COUNTS,
            Self::Postgres => POSTGRES_HOURLY_COUNTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pgsql" => Ok(Self::Postgres),
            other => Err(DbError::InvalidValue(format!("unknown dialect: {other}"))),
        }
    }
}
