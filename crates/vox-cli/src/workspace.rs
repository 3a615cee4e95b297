use std::path::Path;
use std::sync::Arc;

use vox_core::ItineraryStore;
use vox_geocode::MapboxGeocoder;
use vox_store::{load_session, SessionPersister, SessionSlice, Settings, VoxPaths};
use vox_trips::TripGateway;

/// Everything a command needs: resolved paths, credentials, and a store
/// hydrated from the session slice with auto-save attached.
pub struct Workspace {
    pub paths: VoxPaths,
    pub settings: Settings,
    pub store: ItineraryStore,
}

impl Workspace {
    pub fn open(home: Option<&Path>) -> anyhow::Result<Self> {
        let paths = VoxPaths::resolve(home);
        paths.ensure_layout()?;

        let settings = Settings::load(&paths.settings_json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable settings, using defaults");
            Settings::defaults()
        });

        let mut store = ItineraryStore::new();
        match load_session(&paths.session_json) {
            Ok(Some(slice)) => slice.restore_into(&mut store),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "session slice unreadable, starting with an empty trip");
            }
        }
        let baseline = SessionSlice::from_state(store.state());
        store.subscribe(Box::new(SessionPersister::with_baseline(
            &paths.session_json,
            baseline,
        )));

        Ok(Self {
            paths,
            settings,
            store,
        })
    }

    pub fn gateway(&self) -> Arc<dyn TripGateway> {
        vox_trips::open_gateway(&self.paths.trips_db)
    }

    pub fn geocoder(&self) -> MapboxGeocoder {
        MapboxGeocoder::new(self.settings.mapbox_token.clone())
    }
}
