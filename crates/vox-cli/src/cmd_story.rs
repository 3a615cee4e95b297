use std::path::Path;

use vox_core::{ItineraryStore, StoryView};

use crate::workspace::Workspace;

/// Walk the itinerary in story mode.
///
/// With the `tui` feature (default): opens the interactive story player
/// unless `plain` is set. Without: always prints the walk.
pub fn execute(home: Option<&Path>, plain: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;

    #[cfg(feature = "tui")]
    {
        if !plain {
            let gateway = ws.gateway();
            return crate::tui::run(ws.store, gateway);
        }
    }

    #[cfg(not(feature = "tui"))]
    {
        if !plain {
            eprintln!("vox story (plain mode, rebuild with `tui` feature for the player)");
        }
    }

    let mut store = ws.store;
    let lines = walk(&mut store);
    if lines.is_empty() {
        println!("Itinerary is empty.");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// One line per stop, first to last. Leaves story mode off.
pub fn walk(store: &mut ItineraryStore) -> Vec<String> {
    let mut lines = Vec::new();
    store.start_journey();
    loop {
        let StoryView::Stop(frame) = store.story_view() else {
            break;
        };
        lines.push(format!(
            "{:>8}  Day {}  {}: {}",
            frame.time_label(),
            frame.day.day,
            frame.stop.name,
            frame.caption()
        ));
        if !store.next_stop() {
            break;
        }
    }
    store.stop_journey();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::{Coordinates, NewStop};

    #[test]
    fn walk_visits_every_stop_in_order() {
        let mut store = ItineraryStore::new();
        let at = Coordinates { lng: 100.5, lat: 13.75 };
        store.add_stop(NewStop::new("Wat Pho", at).with_notes("Reclining Buddha"));
        store.add_stop(NewStop::new("Chinatown", at));
        store.add_stop(NewStop::new("Chatuchak", at).on_day(2));

        let lines = walk(&mut store);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], " 9:00 AM  Day 1  Wat Pho: Reclining Buddha");
        assert!(lines[1].starts_with("11:00 AM  Day 1  Chinatown"));
        assert_eq!(lines[2], " 9:00 AM  Day 2  Chatuchak: Day 2");
        assert!(!store.cursor().is_active());
    }

    #[test]
    fn empty_itinerary_walks_nothing() {
        let mut store = ItineraryStore::new();
        assert!(walk(&mut store).is_empty());
        assert!(!store.cursor().is_active());
    }

    #[test]
    fn plain_story_through_workspace() {
        let tmp = tempfile::tempdir().unwrap();
        execute(Some(tmp.path()), true).unwrap();
    }
}
