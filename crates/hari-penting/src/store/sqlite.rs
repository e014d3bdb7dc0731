use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, params};

use super::{ObservanceStore, StoreError};
use crate::types::{Observance, ObservanceDate};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS observances (
    date  TEXT NOT NULL,
    label TEXT NOT NULL,
    UNIQUE (date, label)
);";

const UPSERT_SQL: &str = "
INSERT INTO observances (date, label) VALUES (?1, ?2)
ON CONFLICT (date, label) DO UPDATE SET date = excluded.date, label = excluded.label;";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        log::info!("Opening observance store at {}", path.display());
        let conn = Connection::open(path)
            .inspect_err(|e| log::error!("Failed to open {}: {e}", path.display()))?;
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn parse_row(date: String, label: String) -> Result<Observance, StoreError> {
    let corrupt = |reason: String| StoreError::CorruptRow {
        date: date.clone(),
        label: label.clone(),
        reason,
    };
    let parsed = date
        .parse::<ObservanceDate>()
        .map_err(|e| corrupt(e.to_string()))?;
    Observance::new(parsed, &label).map_err(|e| corrupt(e.to_string()))
}

impl ObservanceStore for SqliteStore {
    fn upsert(&self, observance: &Observance) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            UPSERT_SQL,
            params![observance.date.to_string(), observance.label.as_str()],
        )?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<Observance>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare("SELECT date, label FROM observances")?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_row(row.get(0)?, row.get(1)?)?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, label: &str) -> Observance {
        Observance::new(date.parse().unwrap(), label).unwrap()
    }

    #[test]
    fn test_upsert_is_keyed_on_date_and_label() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert(&obs("17-08", "Hari Kemerdekaan")).unwrap();
        store.upsert(&obs("17-08", "Hari Kemerdekaan")).unwrap();
        store.upsert(&obs("17-08", "Hari Pramuka")).unwrap();
        store.upsert(&obs("14-08", "Hari Pramuka")).unwrap();

        let mut all = store.all().unwrap();
        all.sort_by(|a, b| (a.date, &a.label).cmp(&(b.date, &b.label)));
        assert_eq!(
            all,
            vec![
                obs("14-08", "Hari Pramuka"),
                obs("17-08", "Hari Kemerdekaan"),
                obs("17-08", "Hari Pramuka"),
            ]
        );
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hari_penting.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.upsert(&obs("02-05", "Hari Pendidikan Nasional")).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.all().unwrap(),
            vec![obs("02-05", "Hari Pendidikan Nasional")]
        );
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO observances (date, label) VALUES ('2024-08-17', 'x')",
                [],
            )
            .unwrap();

        let err = store.all().unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { .. }));
    }
}
