//! Saved trips.
//!
//! A trip snapshot is written whole and replaced whole. Storage sits behind
//! [`TripGateway`] so callers work the same whether the SQLite file opened or
//! the store fell back to [`UnavailableTripStore`].

pub mod gateway;
pub mod sqlite_store;

use std::path::Path;
use std::sync::Arc;

pub use gateway::{GatewayError, TripGateway, UnavailableTripStore};
pub use sqlite_store::SqliteTripStore;

/// Open the trips database, or degrade to a gateway that reads empty and
/// refuses writes.
pub fn open_gateway(db_path: &Path) -> Arc<dyn TripGateway> {
    match SqliteTripStore::open_or_create(db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %db_path.display(),
                "trip storage unavailable, saved trips are disabled"
            );
            Arc::new(UnavailableTripStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_gateway_uses_sqlite_when_possible() {
        let tmp = tempfile::tempdir().unwrap();
        let gw = open_gateway(&tmp.path().join("trips.db"));
        assert!(gw.is_available());
        assert!(gw.list_trips().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_gateway_degrades_when_path_is_blocked() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let gw = open_gateway(&blocker.join("trips.db"));
        assert!(!gw.is_available());
        assert!(gw.list_trips().await.unwrap().is_empty());
    }
}
