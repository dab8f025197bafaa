#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDateTime;
use stats_core::{Hit, Site};
use stats_db::{Db, TIMESTAMP_FORMAT};
use tempfile::TempDir;

pub const CHROME_96: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";
pub const FIREFOX_95: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:95.0) Gecko/20100101 Firefox/95.0";

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn setup_site(db: &Db, code: &str) -> Site {
    db.create_site(code).expect("site")
}

pub fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).expect("timestamp")
}

pub fn make_hit(browser: &str, created_at: &str) -> Hit {
    Hit {
        browser: browser.to_string(),
        created_at: ts(created_at),
    }
}

pub fn insert_hits(db: &mut Db, site_id: i64, hits: Vec<Hit>) {
    db.insert_hits(site_id, &hits).expect("insert hits");
}
