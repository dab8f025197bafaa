#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use stats_core::{Hit, Site, SummaryRow};
use stats_db::{Db, TIMESTAMP_FORMAT};
use tempfile::TempDir;

pub const CHROME_96: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";
pub const CHROME_96_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.93 Safari/537.36";
pub const CHROME_96_ANDROID: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.104 Mobile Safari/537.36";
pub const FIREFOX_95: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:95.0) Gecko/20100101 Firefox/95.0";
pub const SAFARI_14: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Safari/605.1.15";
pub const ANDROID_STOCK: &str = "Mozilla/5.0 (Linux; U; Android 4.0.3; ko-kr; LG-L160L Build/IML74K) AppleWebKit/534.30 (KHTML, like Gecko) Version/4.0 Mobile Safari/534.30";

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

impl TestDb {
    /// Second connection for poking at the schema behind the `Db`'s back.
    pub fn raw_conn(&self) -> Connection {
        Connection::open(&self.path).expect("open raw conn")
    }
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("rollup.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn setup_site(db: &Db, code: &str, last_stat: Option<&str>) -> Site {
    let site = db.create_site(code).expect("site");
    if let Some(last_stat) = last_stat {
        db.set_last_stat(site.id, ts(last_stat)).expect("last stat");
    }
    db.get_site(site.id).expect("get site").expect("site")
}

pub fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).expect("timestamp")
}

pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("day")
}

pub fn hits(db: &mut Db, site_id: i64, entries: &[(&str, &str)]) {
    let hits: Vec<Hit> = entries
        .iter()
        .map(|(browser, created_at)| Hit {
            browser: browser.to_string(),
            created_at: ts(created_at),
        })
        .collect();
    db.insert_hits(site_id, &hits).expect("insert hits");
}

pub fn seed_summary(db: &mut Db, rows: &[SummaryRow]) {
    let writer = db.browser_stats_writer().expect("writer");
    writer.insert(rows).expect("seed summary");
    writer.commit().expect("commit");
}

pub fn summary(
    site_id: i64,
    day_value: &str,
    browser: &str,
    version: &str,
    count: u64,
    mobile: bool,
) -> SummaryRow {
    SummaryRow {
        site_id,
        day: day(day_value),
        browser: browser.to_string(),
        version: version.to_string(),
        count,
        mobile,
    }
}
