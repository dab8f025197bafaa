mod support;

use chrono::NaiveDate;
use stats_core::RawHourlyCount;
use stats_db::Dialect;
use support::{CHROME_96, FIREFOX_95, insert_hits, make_hit, setup_db, setup_site, ts};

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("day")
}

fn sorted(mut rows: Vec<RawHourlyCount>) -> Vec<RawHourlyCount> {
    rows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.browser.cmp(&b.browser))
            .then_with(|| a.count.cmp(&b.count))
    });
    rows
}

#[test]
fn counts_hits_per_browser_and_hour() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    let site = setup_site(db, "alpha");
    insert_hits(
        db,
        site.id,
        vec![
            make_hit(CHROME_96, "2020-01-05 10:01:00"),
            make_hit(CHROME_96, "2020-01-05 10:59:59"),
            make_hit(CHROME_96, "2020-01-05 11:00:00"),
            make_hit(FIREFOX_95, "2020-01-05 10:30:00"),
        ],
    );

    let rows = sorted(
        db.hourly_browser_counts(site.id, day("1970-01-01"), Dialect::Sqlite)
            .expect("counts"),
    );
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].browser, CHROME_96);
    assert_eq!(rows[0].created_at, ts("2020-01-05 10:00:00"));
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].browser, FIREFOX_95);
    assert_eq!(rows[1].count, 1);
    assert_eq!(rows[2].created_at, ts("2020-01-05 11:00:00"));
    assert_eq!(rows[2].count, 1);
}

#[test]
fn filters_by_site_and_watermark() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    let site = setup_site(db, "alpha");
    let other = setup_site(db, "beta");
    insert_hits(
        db,
        site.id,
        vec![
            make_hit(CHROME_96, "2020-01-04 23:59:59"),
            make_hit(CHROME_96, "2020-01-05 00:00:00"),
        ],
    );
    insert_hits(db, other.id, vec![make_hit(CHROME_96, "2020-01-05 00:10:00")]);

    for dialect in [Dialect::Sqlite, Dialect::Postgres] {
        let rows = db
            .hourly_browser_counts(site.id, day("2020-01-05"), dialect)
            .expect("counts");
        assert_eq!(rows.len(), 1, "{dialect}");
        assert_eq!(rows[0].created_at, ts("2020-01-05 00:00:00"));
        assert_eq!(rows[0].count, 1);
    }
}

#[test]
fn dialects_produce_identical_buckets() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    let site = setup_site(db, "alpha");
    let mut hits = Vec::new();
    for (minute, browser) in [(0, CHROME_96), (15, FIREFOX_95), (59, CHROME_96)] {
        for hour in [0, 9, 23] {
            hits.push(make_hit(
                browser,
                &format!("2021-03-14 {hour:02}:{minute:02}:30"),
            ));
            hits.push(make_hit(
                browser,
                &format!("2021-03-15 {hour:02}:{minute:02}:00"),
            ));
        }
    }
    hits.push(make_hit("", "2021-03-15 09:00:00"));
    insert_hits(db, site.id, hits);

    let sqlite = sorted(
        db.hourly_browser_counts(site.id, day("2021-03-14"), Dialect::Sqlite)
            .expect("sqlite counts"),
    );
    let postgres = sorted(
        db.hourly_browser_counts(site.id, day("2021-03-14"), Dialect::Postgres)
            .expect("postgres counts"),
    );
    assert_eq!(sqlite, postgres);
    assert_eq!(sqlite.len(), 13);
    assert_eq!(sqlite.iter().map(|row| row.count).sum::<u64>(), 19);
}
