use std::path::Path;

use vox_core::{Coordinates, ItineraryStore, NewStop, Stop};
use vox_geocode::{pin_name, Place, PlaceSearch};
use vox_notify::{Notice, Notifier, StderrNotifier};

use crate::workspace::Workspace;

/// `vox stop add <name> --lng --lat`
pub fn add(
    home: Option<&Path>,
    name: &str,
    lng: f64,
    lat: f64,
    day: Option<u32>,
    notes: Option<String>,
) -> anyhow::Result<()> {
    let at = Coordinates::new(lng, lat)?;
    let mut ws = Workspace::open(home)?;
    let mut new = NewStop::new(name, at);
    new.day_index = day;
    new.notes = notes;
    let id = ws.store.add_stop(new);
    println!("Added {name} ({id})");
    Ok(())
}

/// `vox stop pin --lng --lat`
pub fn pin(home: Option<&Path>, lng: f64, lat: f64, day: Option<u32>) -> anyhow::Result<()> {
    let at = Coordinates::new(lng, lat)?;
    let mut ws = Workspace::open(home)?;
    let geocoder = ws.geocoder();
    let (id, name) = pin_stop(&mut ws.store, &geocoder, at, day);
    println!("Added {name} ({id})");
    Ok(())
}

/// Add a stop at `at`, named by reverse geocoding.
pub fn pin_stop(
    store: &mut ItineraryStore,
    search: &dyn PlaceSearch,
    at: Coordinates,
    day: Option<u32>,
) -> (String, String) {
    let name = pin_name(search, at);
    let mut new = NewStop::new(name.clone(), at);
    new.day_index = day;
    (store.add_stop(new), name)
}

/// Forward search. A failure is reported as a notice and yields `None`.
pub async fn find_places(
    search: &dyn PlaceSearch,
    notifier: &dyn Notifier,
    query: &str,
) -> Option<Vec<Place>> {
    match search.search(query) {
        Ok(places) => Some(places),
        Err(e) => {
            notifier
                .notify(&Notice::error(format!("Search failed: {e}")))
                .await;
            None
        }
    }
}

/// `vox stop search <query>`
pub fn search(
    home: Option<&Path>,
    query: &str,
    pick: Option<usize>,
    day: Option<u32>,
) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    let geocoder = ws.geocoder();
    let rt = tokio::runtime::Runtime::new()?;
    let Some(places) = rt.block_on(find_places(&geocoder, &StderrNotifier, query)) else {
        return Ok(());
    };
    if places.is_empty() {
        println!("No places found for \"{query}\"");
        return Ok(());
    }
    for (i, place) in places.iter().enumerate() {
        println!("{:>2}. {}  [{}]", i + 1, place.name, place.coordinates);
    }
    if let Some(n) = pick {
        let Some(place) = pick_place(&places, n) else {
            anyhow::bail!("--pick {n} is out of range (1..={})", places.len());
        };
        let mut new = NewStop::new(place.name.clone(), place.coordinates);
        new.day_index = day;
        let id = ws.store.add_stop(new);
        println!("Added {} ({id})", place.name);
    }
    Ok(())
}

fn pick_place(places: &[Place], n: usize) -> Option<&Place> {
    places.get(n.checked_sub(1)?)
}

/// `vox stop remove <id|position>`
pub fn remove(home: Option<&Path>, target: &str) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    let Some(id) = resolve_target(ws.store.stops(), target) else {
        println!("No stop matches \"{target}\"");
        return Ok(());
    };
    if ws.store.remove_stop(&id) {
        println!("Removed {id}");
    }
    Ok(())
}

/// A stop id, or a 1-based position in the flat list.
pub fn resolve_target(stops: &[Stop], target: &str) -> Option<String> {
    if let Some(stop) = stops.iter().find(|s| s.id == target) {
        return Some(stop.id.clone());
    }
    let pos: usize = target.parse().ok()?;
    stops.get(pos.checked_sub(1)?).map(|s| s.id.clone())
}

/// `vox stop move <from> <to>`
pub fn reorder(home: Option<&Path>, from: usize, to: usize) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    move_stop(&mut ws.store, from, to)?;
    print_stops(ws.store.stops());
    Ok(())
}

/// Move the stop at 1-based `from` to 1-based `to`. A `to` past the end
/// moves the stop last.
fn move_stop(store: &mut ItineraryStore, from: usize, to: usize) -> anyhow::Result<()> {
    let Some(t) = to.checked_sub(1) else {
        anyhow::bail!("invalid target position {to}: positions start at 1");
    };
    let moved = match from.checked_sub(1) {
        Some(f) => store.reorder_stops(f, t),
        None => false,
    };
    if !moved {
        anyhow::bail!(
            "no stop at position {from} (trip has {} stops)",
            store.stops().len()
        );
    }
    Ok(())
}

/// `vox stop list`
pub fn list(home: Option<&Path>) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    if ws.store.stops().is_empty() {
        println!("(no stops)");
    } else {
        print_stops(ws.store.stops());
    }
    Ok(())
}

fn print_stops(stops: &[Stop]) {
    for (i, s) in stops.iter().enumerate() {
        println!(
            "{:>3}. [day {}] {}  ({})  {}",
            i + 1,
            s.day_index,
            s.name,
            s.coordinates,
            s.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_geocode::GeocodeError;
    use vox_notify::{CollectNotifier, Level};

    struct Offline;

    impl PlaceSearch for Offline {
        fn search(&self, _query: &str) -> Result<Vec<Place>, GeocodeError> {
            Err(GeocodeError::MissingToken)
        }

        fn reverse(&self, _at: Coordinates) -> Result<Vec<Place>, GeocodeError> {
            Err(GeocodeError::MissingToken)
        }
    }

    fn stop(id: &str) -> Stop {
        Stop {
            id: id.into(),
            name: id.into(),
            coordinates: Coordinates { lng: 0.0, lat: 0.0 },
            day_index: 1,
            notes: None,
        }
    }

    #[test]
    fn resolve_target_by_id_or_position() {
        let stops = vec![stop("stp_a"), stop("stp_b")];
        assert_eq!(resolve_target(&stops, "stp_b").as_deref(), Some("stp_b"));
        assert_eq!(resolve_target(&stops, "1").as_deref(), Some("stp_a"));
        assert_eq!(resolve_target(&stops, "0"), None);
        assert_eq!(resolve_target(&stops, "3"), None);
        assert_eq!(resolve_target(&stops, "nope"), None);
    }

    #[test]
    fn pin_without_geocoding_uses_fallback_name() {
        let mut store = ItineraryStore::new();
        let (id, name) = pin_stop(&mut store, &Offline, Coordinates { lng: 4.9, lat: 52.37 }, Some(2));
        assert_eq!(name, vox_geocode::PINNED_LOCATION);
        assert_eq!(store.stops()[0].id, id);
        assert_eq!(store.stops()[0].day_index, 2);
    }

    #[tokio::test]
    async fn failed_search_becomes_an_error_notice() {
        let sink = CollectNotifier::new();
        assert!(find_places(&Offline, &sink, "Vondelpark").await.is_none());
        assert_eq!(sink.levels(), vec![Level::Error]);
        assert!(sink.messages()[0].starts_with("Search failed:"));
    }

    #[test]
    fn move_errors_name_the_bad_position() {
        let mut store = ItineraryStore::new();
        store.add_stop(NewStop::new("A", Coordinates { lng: 0.0, lat: 0.0 }));
        store.add_stop(NewStop::new("B", Coordinates { lng: 1.0, lat: 0.0 }));

        let err = move_stop(&mut store, 1, 0).unwrap_err();
        assert_eq!(err.to_string(), "invalid target position 0: positions start at 1");
        let err = move_stop(&mut store, 0, 1).unwrap_err();
        assert_eq!(err.to_string(), "no stop at position 0 (trip has 2 stops)");
        let err = move_stop(&mut store, 3, 1).unwrap_err();
        assert_eq!(err.to_string(), "no stop at position 3 (trip has 2 stops)");

        move_stop(&mut store, 1, 9).unwrap();
        assert_eq!(store.stops()[1].name, "A");
    }

    #[test]
    fn pick_place_is_one_based() {
        let places = vec![Place {
            name: "Rijksmuseum".into(),
            coordinates: Coordinates { lng: 4.885, lat: 52.36 },
        }];
        assert_eq!(pick_place(&places, 1).unwrap().name, "Rijksmuseum");
        assert!(pick_place(&places, 0).is_none());
        assert!(pick_place(&places, 2).is_none());
    }

    #[test]
    fn add_and_move_through_workspace() {
        let tmp = tempfile::tempdir().unwrap();
        add(Some(tmp.path()), "A", 1.0, 1.0, None, None).unwrap();
        add(Some(tmp.path()), "B", 2.0, 2.0, None, Some("lunch".into())).unwrap();
        reorder(Some(tmp.path()), 2, 1).unwrap();
        assert!(reorder(Some(tmp.path()), 9, 1).is_err());
        assert!(add(Some(tmp.path()), "bad", f64::NAN, 0.0, None, None).is_err());

        let ws = Workspace::open(Some(tmp.path())).unwrap();
        let names: Vec<&str> = ws.store.stops().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(ws.store.stops()[0].notes.as_deref(), Some("lunch"));
    }
}
