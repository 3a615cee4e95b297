//! SQLite-backed trip storage.
//!
//! One row per trip. The full snapshot lives in `body` as JSON; `name` and
//! `updated_at` are copied out so listing never parses bodies.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use vox_core::{new_trip_id, TripId, TripMetadata, TripSnapshot};

use crate::gateway::{GatewayError, TripGateway};

const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS trips (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    body TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_trips_updated_at ON trips(updated_at DESC);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

struct Db {
    conn: Connection,
}

impl Drop for Db {
    fn drop(&mut self) {
        // Merge WAL back into main DB so users see a single file when idle.
        let _ = self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
    }
}

/// SQLite-backed [`TripGateway`]. Cheap to clone; clones share one
/// connection.
#[derive(Clone)]
pub struct SqliteTripStore {
    db: Arc<Mutex<Db>>,
}

impl std::fmt::Debug for SqliteTripStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTripStore").finish_non_exhaustive()
    }
}

impl SqliteTripStore {
    /// Open or create the trips database with full schema.
    pub fn open_or_create(db_path: &Path) -> Result<Self, GatewayError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(db_path)?)
    }

    /// A private database that disappears on drop.
    pub fn in_memory() -> Result<Self, GatewayError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, GatewayError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(Self {
            db: Arc::new(Mutex::new(Db { conn })),
        })
    }

    /// Run blocking SQLite work off the async executor.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, GatewayError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&guard.conn)
        })
        .await?
    }
}

#[async_trait::async_trait]
impl TripGateway for SqliteTripStore {
    async fn save_trip(&self, trip: &TripSnapshot) -> Result<TripId, GatewayError> {
        let mut trip = trip.clone();
        if trip.id.trim().is_empty() {
            trip.id = new_trip_id();
        }
        let body = serde_json::to_string(&trip)?;
        tracing::debug!(id = %trip.id, name = %trip.name, "saving trip");
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO trips (id, name, updated_at, body) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    updated_at = excluded.updated_at,
                    body = excluded.body",
                params![trip.id, trip.name, trip.updated_at, body],
            )?;
            Ok(trip.id)
        })
        .await
    }

    async fn list_trips(&self) -> Result<Vec<TripMetadata>, GatewayError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, updated_at FROM trips ORDER BY updated_at DESC, id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(TripMetadata {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    async fn load_trip(&self, id: &str) -> Result<Option<TripSnapshot>, GatewayError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let body: Option<String> = conn
                .query_row("SELECT body FROM trips WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;
            match body {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn delete_trip(&self, id: &str) -> Result<(), GatewayError> {
        let id = id.to_string();
        tracing::debug!(%id, "deleting trip");
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM trips WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::{Coordinates, ItineraryStore, NewStop, TripConstraints};

    fn trip_with(stops: usize, days: u32) -> TripSnapshot {
        let mut store = ItineraryStore::new();
        for i in 0..stops {
            store.add_stop(
                NewStop::new(format!("stop {i}"), Coordinates { lng: i as f64, lat: 1.0 })
                    .on_day(i as u32 % days + 1),
            );
        }
        store.set_trip_constraints(TripConstraints {
            destination: Some("Porto".into()),
            duration: Some("3 days".into()),
            vibe: Some("food".into()),
        });
        store.snapshot(None, "Porto weekend", Some(Coordinates { lng: -8.61, lat: 41.15 }), Some(11.5))
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let gw = SqliteTripStore::in_memory().unwrap();
        for (stops, days) in [(0, 1), (1, 1), (7, 3)] {
            let trip = trip_with(stops, days);
            let id = gw.save_trip(&trip).await.unwrap();
            assert_eq!(id, trip.id);
            let loaded = gw.load_trip(&id).await.unwrap().unwrap();
            assert_eq!(loaded, trip);
        }
    }

    #[tokio::test]
    async fn save_overwrites_by_id() {
        let gw = SqliteTripStore::in_memory().unwrap();
        let mut trip = trip_with(2, 1);
        gw.save_trip(&trip).await.unwrap();
        trip.name = "renamed".into();
        trip.stops.clear();
        trip.itinerary.clear();
        gw.save_trip(&trip).await.unwrap();

        let list = gw.list_trips().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "renamed");
        let loaded = gw.load_trip(&trip.id).await.unwrap().unwrap();
        assert!(loaded.stops.is_empty());
    }

    #[tokio::test]
    async fn empty_id_gets_generated() {
        let gw = SqliteTripStore::in_memory().unwrap();
        let mut trip = trip_with(1, 1);
        trip.id = String::new();
        let id = gw.save_trip(&trip).await.unwrap();
        assert!(id.starts_with("trip_"));
        assert_eq!(gw.load_trip(&id).await.unwrap().unwrap().id, id);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let gw = SqliteTripStore::in_memory().unwrap();
        for (id, ts) in [("trip_a", 10), ("trip_b", 30), ("trip_c", 20)] {
            let mut trip = trip_with(0, 1);
            trip.id = id.into();
            trip.name = id.into();
            trip.updated_at = ts;
            gw.save_trip(&trip).await.unwrap();
        }
        let ids: Vec<String> = gw.list_trips().await.unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["trip_b", "trip_c", "trip_a"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_load_missing_is_none() {
        let gw = SqliteTripStore::in_memory().unwrap();
        let trip = trip_with(1, 1);
        gw.save_trip(&trip).await.unwrap();
        gw.delete_trip(&trip.id).await.unwrap();
        gw.delete_trip(&trip.id).await.unwrap();
        assert!(gw.load_trip(&trip.id).await.unwrap().is_none());
        assert!(gw.list_trips().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_survives_reopen_and_checkpoints() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("trips.db");
        let trip = trip_with(3, 2);
        {
            let gw = SqliteTripStore::open_or_create(&path).unwrap();
            gw.save_trip(&trip).await.unwrap();
        }
        let wal = tmp.path().join("nested").join("trips.db-wal");
        if wal.exists() {
            assert_eq!(std::fs::metadata(&wal).unwrap().len(), 0);
        }
        let gw = SqliteTripStore::open_or_create(&path).unwrap();
        assert_eq!(gw.load_trip(&trip.id).await.unwrap().unwrap(), trip);
    }

    #[test]
    fn schema_creation() {
        let store = SqliteTripStore::in_memory().unwrap();
        let db = store.db.lock().unwrap();
        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"trips".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));
    }
}
