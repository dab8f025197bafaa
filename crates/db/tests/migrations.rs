use rusqlite::Connection;
use stats_db::Db;

#[test]
fn migrate_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("migrate.sqlite");
    let mut db = Db::open(&db_path).expect("open db");
    db.migrate().expect("first migrate");
    db.migrate().expect("second migrate");
    assert_eq!(
        db.applied_migrations().expect("applied"),
        vec!["0001_init".to_string(), "0002_add_stats_indexes".to_string()]
    );

    let conn = Connection::open(&db_path).expect("open conn");
    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name IN ('idx_hits_site_created_at', 'idx_browser_stats_site_day')",
            [],
            |row| row.get(0),
        )
        .expect("indexes");
    assert_eq!(indexes, 2);
}

#[test]
fn migrate_keeps_existing_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("existing.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        conn.execute_batch(include_str!("../migrations/0001_init.sql"))
            .expect("migrate 0001");
        conn.execute("INSERT INTO sites (code) VALUES ('legacy')", [])
            .expect("insert site");
    }

    let mut db = Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate db");
    let sites = db.list_sites().expect("sites");
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].code, "legacy");
}
