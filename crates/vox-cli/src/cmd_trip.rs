//! Saved trips. Gateway failures never abort the command: they are reported
//! as notices and the in-memory trip is left as it was.

use std::path::Path;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use vox_core::{Coordinates, ItineraryStore, TripId, TripMetadata};
use vox_notify::{Notice, Notifier, StderrNotifier};
use vox_trips::TripGateway;

use crate::workspace::Workspace;

const UNTITLED: &str = "Untitled trip";

/// Name used when `trip save` gets none.
pub fn default_trip_name(store: &ItineraryStore) -> String {
    store
        .state()
        .trip_constraints
        .destination
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

pub async fn save_with(
    store: &ItineraryStore,
    gateway: &dyn TripGateway,
    notifier: &dyn Notifier,
    name: &str,
    id: Option<&str>,
    center: Option<Coordinates>,
) -> Option<TripId> {
    let snapshot = store.snapshot(id.map(str::to_string), name, center, None);
    match gateway.save_trip(&snapshot).await {
        Ok(id) => {
            notifier
                .notify(&Notice::success(format!("Saved \"{name}\"")))
                .await;
            Some(id)
        }
        Err(e) => {
            notifier
                .notify(&Notice::error(format!("Failed to save trip: {e}")))
                .await;
            None
        }
    }
}

pub async fn list_with(gateway: &dyn TripGateway, notifier: &dyn Notifier) -> Vec<TripMetadata> {
    match gateway.list_trips().await {
        Ok(trips) => trips,
        Err(e) => {
            notifier
                .notify(&Notice::error(format!("Failed to list trips: {e}")))
                .await;
            Vec::new()
        }
    }
}

/// Replace the store's trip with a saved one. Returns whether it loaded.
pub async fn load_with(
    store: &mut ItineraryStore,
    gateway: &dyn TripGateway,
    notifier: &dyn Notifier,
    id: &str,
) -> bool {
    match gateway.load_trip(id).await {
        Ok(Some(trip)) => {
            store.load_itinerary(&trip);
            notifier
                .notify(&Notice::success(format!("Loaded \"{}\"", trip.name)))
                .await;
            true
        }
        Ok(None) => {
            notifier
                .notify(&Notice::error(format!("No saved trip with id {id}")))
                .await;
            false
        }
        Err(e) => {
            notifier
                .notify(&Notice::error(format!("Failed to load trip: {e}")))
                .await;
            false
        }
    }
}

pub async fn delete_with(gateway: &dyn TripGateway, notifier: &dyn Notifier, id: &str) -> bool {
    match gateway.delete_trip(id).await {
        Ok(()) => {
            notifier.notify(&Notice::success("Trip deleted")).await;
            true
        }
        Err(e) => {
            notifier
                .notify(&Notice::error(format!("Failed to delete trip: {e}")))
                .await;
            false
        }
    }
}

fn format_updated(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| ms.to_string())
}

// ── Command Implementations ──

/// `vox trip save [--lng --lat]`. The focused location is not kept between
/// commands, so a map center has to be given here to be stored.
pub fn save(
    home: Option<&Path>,
    name: Option<&str>,
    id: Option<&str>,
    center: Option<(f64, f64)>,
) -> anyhow::Result<()> {
    let center = center
        .map(|(lng, lat)| Coordinates::new(lng, lat))
        .transpose()?;
    let ws = Workspace::open(home)?;
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| default_trip_name(&ws.store));
    let gateway = ws.gateway();
    let rt = tokio::runtime::Runtime::new()?;
    let saved = rt.block_on(save_with(
        &ws.store,
        gateway.as_ref(),
        &StderrNotifier,
        &name,
        id,
        center,
    ));
    if let Some(id) = saved {
        println!("{id}");
    }
    Ok(())
}

/// `vox trip list`
pub fn list(home: Option<&Path>) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    let gateway = ws.gateway();
    let rt = tokio::runtime::Runtime::new()?;
    let trips = rt.block_on(list_with(gateway.as_ref(), &StderrNotifier));
    if trips.is_empty() {
        println!("(no saved trips)");
    }
    for t in trips {
        println!("{}  {}  {}", t.id, format_updated(t.updated_at), t.name);
    }
    Ok(())
}

/// `vox trip load <id>`
pub fn load(home: Option<&Path>, id: &str) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    let gateway = ws.gateway();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(load_with(&mut ws.store, gateway.as_ref(), &StderrNotifier, id));
    Ok(())
}

/// `vox trip delete <id>`
pub fn delete(home: Option<&Path>, id: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    let gateway = ws.gateway();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(delete_with(gateway.as_ref(), &StderrNotifier, id));
    Ok(())
}
