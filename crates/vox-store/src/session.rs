//! The auto-saved session slice.
//!
//! Only the trip content and the theme are kept. The story cursor and the
//! focused location are transient and start fresh in every process.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vox_core::{ItineraryDay, ItineraryStore, Stop, StoreObserver, Theme, TripConstraints, TripState};

pub const SESSION_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSlice {
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub trip_constraints: TripConstraints,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub version: u32,
}

impl SessionSlice {
    pub fn from_state(state: &TripState) -> Self {
        Self {
            stops: state.stops.clone(),
            itinerary: state.itinerary.clone(),
            trip_constraints: state.trip_constraints.clone(),
            theme: state.theme,
            version: SESSION_VERSION,
        }
    }

    /// Hydrate `store` without notifying its observers.
    pub fn restore_into(self, store: &mut ItineraryStore) {
        store.hydrate(self.stops, self.itinerary, self.trip_constraints, self.theme);
    }
}

/// Read the slice at `path`. A missing file is `Ok(None)`; a corrupt one is
/// an error.
pub fn load_session(path: &Path) -> anyhow::Result<Option<SessionSlice>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let slice = serde_json::from_str(&text)
        .with_context(|| format!("parsing session slice {}", path.display()))?;
    Ok(Some(slice))
}

pub fn save_session(path: &Path, slice: &SessionSlice) -> anyhow::Result<()> {
    crate::write_json(path, slice)
}

/// Store observer that writes the session slice after each commit.
#[derive(Debug)]
pub struct SessionPersister {
    path: PathBuf,
    last: Option<SessionSlice>,
    writes: usize,
}

impl SessionPersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last: None,
            writes: 0,
        }
    }

    /// Start from a slice that is already on disk, so an identical commit
    /// does not rewrite it.
    pub fn with_baseline(path: impl Into<PathBuf>, baseline: SessionSlice) -> Self {
        Self {
            last: Some(baseline),
            ..Self::new(path)
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl StoreObserver for SessionPersister {
    fn on_commit(&mut self, state: &TripState) {
        let slice = SessionSlice::from_state(state);
        if self.last.as_ref() == Some(&slice) {
            return;
        }
        match save_session(&self.path, &slice) {
            Ok(()) => {
                self.writes += 1;
                self.last = Some(slice);
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "session slice write failed");
            }
        }
    }
}
