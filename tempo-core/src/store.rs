//! SQLite-backed favorites storage.
//!
//! Single table keyed by city name. Every mutation republishes the full
//! list through a `tokio::sync::watch` channel so callers can observe the
//! favorites reactively instead of polling.

use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use crate::model::FavoriteCity;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("favorites storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("favorites store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct FavoriteStore {
    conn: Mutex<Connection>,
    list_tx: watch::Sender<Vec<FavoriteCity>>,
}

impl FavoriteStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory store for tests.
    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        let initial = query_all(&conn)?;
        let (list_tx, _) = watch::channel(initial);

        Ok(Self { conn: Mutex::new(conn), list_tx })
    }

    /// Subscribe to the favorites list. The receiver always holds the
    /// latest snapshot, newest-first.
    pub fn watch(&self) -> watch::Receiver<Vec<FavoriteCity>> {
        self.list_tx.subscribe()
    }

    /// Insert or replace, keyed by city name. Re-adding refreshes the
    /// stored coordinates and timestamp.
    pub fn add(&self, city: &FavoriteCity) -> StoreResult<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO favorite_cities (name, region, country, lat, lon, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![city.name, city.region, city.country, city.lat, city.lon, city.timestamp],
        )?;

        tracing::debug!(city = %city.name, "Added favorite");
        self.publish(&conn)
    }

    /// Delete by name. Removing a city that is not stored is a no-op;
    /// the returned bool says whether a row was actually deleted.
    pub fn remove(&self, name: &str) -> StoreResult<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM favorite_cities WHERE name = ?1", params![name])?;

        if deleted > 0 {
            tracing::debug!(city = %name, "Removed favorite");
            self.publish(&conn)?;
        }

        Ok(deleted > 0)
    }

    pub fn get(&self, name: &str) -> StoreResult<Option<FavoriteCity>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT name, region, country, lat, lon, timestamp
             FROM favorite_cities WHERE name = ?1 LIMIT 1",
        )?;

        let mut rows = stmt.query_map(params![name], row_to_city)?;
        rows.next().transpose().map_err(StoreError::from)
    }

    /// All favorites, newest-first.
    pub fn list(&self) -> StoreResult<Vec<FavoriteCity>> {
        let conn = self.lock()?;
        query_all(&conn)
    }

    pub fn is_favorite(&self, name: &str) -> StoreResult<bool> {
        let conn = self.lock()?;

        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorite_cities WHERE name = ?1 LIMIT 1)",
            params![name],
            |row| row.get(0),
        )?;

        Ok(exists != 0)
    }

    fn publish(&self, conn: &Connection) -> StoreResult<()> {
        let cities = query_all(conn)?;
        self.list_tx.send_replace(cities);
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl std::fmt::Debug for FavoriteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteStore").finish_non_exhaustive()
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS favorite_cities (
            name      TEXT PRIMARY KEY,
            region    TEXT NOT NULL,
            country   TEXT NOT NULL,
            lat       REAL NOT NULL,
            lon       REAL NOT NULL,
            timestamp INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_favorite_cities_timestamp
            ON favorite_cities(timestamp DESC);
        "#,
    )?;
    Ok(())
}

fn query_all(conn: &Connection) -> StoreResult<Vec<FavoriteCity>> {
    let mut stmt = conn.prepare(
        "SELECT name, region, country, lat, lon, timestamp
         FROM favorite_cities ORDER BY timestamp DESC",
    )?;

    let rows = stmt.query_map([], row_to_city)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

fn row_to_city(row: &rusqlite::Row) -> rusqlite::Result<FavoriteCity> {
    Ok(FavoriteCity {
        name: row.get(0)?,
        region: row.get(1)?,
        country: row.get(2)?,
        lat: row.get(3)?,
        lon: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, timestamp: i64) -> FavoriteCity {
        FavoriteCity {
            name: name.to_string(),
            region: "Região".to_string(),
            country: "Brazil".to_string(),
            lat: -23.5,
            lon: -46.6,
            timestamp,
        }
    }

    #[test]
    fn add_and_get() {
        let store = FavoriteStore::in_memory().unwrap();

        store.add(&city("Santos", 10)).unwrap();

        let stored = store.get("Santos").unwrap().expect("city stored");
        assert_eq!(stored.country, "Brazil");
        assert!(store.is_favorite("Santos").unwrap());
        assert!(!store.is_favorite("Niterói").unwrap());
    }

    #[test]
    fn readd_replaces_instead_of_duplicating() {
        let store = FavoriteStore::in_memory().unwrap();

        store.add(&city("Santos", 10)).unwrap();

        let mut updated = city("Santos", 20);
        updated.lat = -24.0;
        store.add(&updated).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].timestamp, 20);
        assert_eq!(all[0].lat, -24.0);
    }

    #[test]
    fn list_is_newest_first() {
        let store = FavoriteStore::in_memory().unwrap();

        store.add(&city("Primeira", 1)).unwrap();
        store.add(&city("Terceira", 3)).unwrap();
        store.add(&city("Segunda", 2)).unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Terceira", "Segunda", "Primeira"]);
    }

    #[test]
    fn remove_missing_city_is_a_noop() {
        let store = FavoriteStore::in_memory().unwrap();

        assert!(!store.remove("Fantasma").unwrap());

        store.add(&city("Santos", 1)).unwrap();
        assert!(store.remove("Santos").unwrap());
        assert!(store.get("Santos").unwrap().is_none());
    }

    #[test]
    fn watch_sees_every_mutation() {
        let store = FavoriteStore::in_memory().unwrap();
        let rx = store.watch();

        assert!(rx.borrow().is_empty());

        store.add(&city("Santos", 1)).unwrap();
        assert_eq!(rx.borrow().len(), 1);

        store.remove("Santos").unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.sqlite3");

        {
            let store = FavoriteStore::open(&path).unwrap();
            store.add(&city("Santos", 1)).unwrap();
        }

        let store = FavoriteStore::open(&path).unwrap();
        assert!(store.is_favorite("Santos").unwrap());
        assert_eq!(store.watch().borrow().len(), 1);
    }
}
