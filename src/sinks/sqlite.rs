use crate::error::Result;
use crate::types::ExhibitionRecord;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS exhibitions (
    museum TEXT NOT NULL,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    topic TEXT NOT NULL,
    url TEXT NOT NULL,
    image_url TEXT NOT NULL,
    location TEXT NOT NULL,
    time TEXT NOT NULL,
    category TEXT NOT NULL,
    extra TEXT NOT NULL,
    harvested_at TEXT DEFAULT CURRENT_TIMESTAMP
)";

/// Append every record to the `exhibitions` table, creating it on first use.
/// No upsert: re-running the harvest duplicates previously seen exhibitions,
/// dedup happens out-of-band. Returns the number of rows inserted.
pub fn write_sqlite(records: &[ExhibitionRecord], db_path: &Path) -> Result<usize> {
    let mut conn = Connection::open(db_path)?;
    conn.execute_batch(CREATE_TABLE)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO exhibitions
             (museum, title, date, topic, url, image_url, location, time, category, extra)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for record in records {
            stmt.execute(params![
                record.museum,
                record.title,
                record.date,
                record.topic,
                record.url,
                record.image_url,
                record.location,
                record.time,
                record.category,
                record.extra,
            ])?;
        }
    }
    tx.commit()?;

    info!("Appended {} records to {}", records.len(), db_path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> ExhibitionRecord {
        ExhibitionRecord {
            museum: "館A".to_string(),
            title: title.to_string(),
            date: "2024/01/01 - 2024/03/01".to_string(),
            topic: String::new(),
            url: "https://example.org/e/1".to_string(),
            image_url: String::new(),
            location: String::new(),
            time: String::new(),
            category: String::new(),
            extra: String::new(),
        }
    }

    fn count_rows(path: &Path) -> i64 {
        let conn = Connection::open(path).unwrap();
        conn.query_row("SELECT COUNT(*) FROM exhibitions", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn appends_one_row_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("exhibitions.db");

        let inserted = write_sqlite(&[record("展1"), record("展2")], &db).unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(count_rows(&db), 2);
    }

    #[test]
    fn a_second_run_is_a_pure_append() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("exhibitions.db");

        write_sqlite(&[record("展1")], &db).unwrap();
        write_sqlite(&[record("展1")], &db).unwrap();

        assert_eq!(count_rows(&db), 2);
    }

    #[test]
    fn stored_fields_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("exhibitions.db");
        write_sqlite(&[record("展覽名稱")], &db).unwrap();

        let conn = Connection::open(&db).unwrap();
        let (museum, title, date): (String, String, String) = conn
            .query_row("SELECT museum, title, date FROM exhibitions", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(museum, "館A");
        assert_eq!(title, "展覽名稱");
        assert_eq!(date, "2024/01/01 - 2024/03/01");
    }
}
