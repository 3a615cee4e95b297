use vox_core::{TripId, TripMetadata, TripSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("trip storage is unavailable on this device")]
    Unavailable,
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored trip is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("cannot create storage directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Keyed storage for trip snapshots.
#[async_trait::async_trait]
pub trait TripGateway: Send + Sync {
    /// Insert or overwrite by id. Returns the id the trip was stored under.
    async fn save_trip(&self, trip: &TripSnapshot) -> Result<TripId, GatewayError>;

    /// Every stored trip, most recently updated first.
    async fn list_trips(&self) -> Result<Vec<TripMetadata>, GatewayError>;

    async fn load_trip(&self, id: &str) -> Result<Option<TripSnapshot>, GatewayError>;

    /// Deleting a missing id is not an error.
    async fn delete_trip(&self, id: &str) -> Result<(), GatewayError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Stand-in used when no storage medium could be opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTripStore;

#[async_trait::async_trait]
impl TripGateway for UnavailableTripStore {
    async fn save_trip(&self, _trip: &TripSnapshot) -> Result<TripId, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn list_trips(&self) -> Result<Vec<TripMetadata>, GatewayError> {
        Ok(Vec::new())
    }

    async fn load_trip(&self, _id: &str) -> Result<Option<TripSnapshot>, GatewayError> {
        Ok(None)
    }

    async fn delete_trip(&self, _id: &str) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::TripConstraints;

    fn snapshot() -> TripSnapshot {
        TripSnapshot {
            id: "trip_x".into(),
            name: "x".into(),
            updated_at: 0,
            stops: vec![],
            itinerary: vec![],
            trip_constraints: TripConstraints::default(),
            center: None,
            zoom: None,
        }
    }

    #[tokio::test]
    async fn unavailable_reads_empty_and_refuses_writes() {
        let gw = UnavailableTripStore;
        assert!(gw.list_trips().await.unwrap().is_empty());
        assert!(gw.load_trip("trip_x").await.unwrap().is_none());
        assert!(matches!(
            gw.save_trip(&snapshot()).await,
            Err(GatewayError::Unavailable)
        ));
        assert!(matches!(
            gw.delete_trip("trip_x").await,
            Err(GatewayError::Unavailable)
        ));
        assert!(!gw.is_available());
    }
}
