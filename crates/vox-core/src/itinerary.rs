//! The itinerary store: a single-writer state container for one trip.
//!
//! The day-grouped projection is the source of truth. After every mutation
//! the flat stop list is recomputed from it, the playback cursor is clamped,
//! and subscribed observers see the committed state.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cursor::{PlaybackCursor, StoryView};
use crate::types::{
    default_narrative, new_stop_id, new_trip_id, now_millis, Coordinates, ItineraryDay, NewStop,
    Stop, StopId, Theme, TripConstraints, TripId, TripSnapshot,
};

/// Everything the store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripState {
    /// Flat, day-ordered copy of the projection.
    pub stops: Vec<Stop>,
    pub itinerary: Vec<ItineraryDay>,
    pub focused_location: Option<Coordinates>,
    pub trip_constraints: TripConstraints,
    pub theme: Theme,
    pub cursor: PlaybackCursor,
}

/// Receives the state after each committed mutation.
pub trait StoreObserver: Send {
    fn on_commit(&mut self, state: &TripState);
}

#[derive(Default)]
pub struct ItineraryStore {
    state: TripState,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl std::fmt::Debug for ItineraryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItineraryStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Restore persisted state without notifying observers. The cursor and
    /// focused location are not persisted and start fresh.
    pub fn hydrate(
        &mut self,
        stops: Vec<Stop>,
        itinerary: Vec<ItineraryDay>,
        trip_constraints: TripConstraints,
        theme: Theme,
    ) {
        self.state = TripState {
            itinerary: projection_from(itinerary, stops),
            trip_constraints,
            theme,
            ..TripState::default()
        };
        self.state.stops = flatten(&self.state.itinerary);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn stops(&self) -> &[Stop] {
        &self.state.stops
    }

    pub fn itinerary(&self) -> &[ItineraryDay] {
        &self.state.itinerary
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.state.cursor
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn active_stop(&self) -> Option<&Stop> {
        self.state
            .cursor
            .resolve(&self.state.itinerary)
            .map(|(_, stop)| stop)
    }

    pub fn story_view(&self) -> StoryView<'_> {
        self.state.cursor.view(&self.state.itinerary)
    }

    /// Build a self-contained snapshot of the current trip. A missing id gets
    /// a fresh one; a missing center falls back to the focused location.
    pub fn snapshot(
        &self,
        id: Option<TripId>,
        name: &str,
        center: Option<Coordinates>,
        zoom: Option<f64>,
    ) -> TripSnapshot {
        TripSnapshot {
            id: id.unwrap_or_else(new_trip_id),
            name: name.to_string(),
            updated_at: now_millis(),
            stops: self.state.stops.clone(),
            itinerary: self.state.itinerary.clone(),
            trip_constraints: self.state.trip_constraints.clone(),
            center: center.or(self.state.focused_location),
            zoom,
        }
    }

    // ── Stop edits ───────────────────────────────────────────────────

    /// Append a stop to the end of its day, creating the day if needed.
    pub fn add_stop(&mut self, new: NewStop) -> StopId {
        let day = coerce_day(new.day_index.unwrap_or(1));
        let stop = Stop {
            id: new_stop_id(),
            name: new.name,
            coordinates: new.coordinates,
            day_index: day,
            notes: new.notes,
        };
        let id = stop.id.clone();
        push_to_day(&mut self.state.itinerary, stop);
        self.commit("add_stop");
        id
    }

    /// Remove a stop everywhere it appears. Days this removal leaves empty
    /// are dropped; days that were already empty stay.
    pub fn remove_stop(&mut self, id: &str) -> bool {
        let mut removed = false;
        let mut emptied = Vec::new();
        for day in &mut self.state.itinerary {
            let before = day.stops.len();
            day.stops.retain(|s| s.id != id);
            if day.stops.len() != before {
                removed = true;
                if day.stops.is_empty() {
                    emptied.push(day.day);
                }
            }
        }
        if !removed {
            return false;
        }
        self.state.itinerary.retain(|d| !emptied.contains(&d.day));
        self.commit("remove_stop");
        true
    }

    /// Move one entry of the flat list and regroup by day. Stops keep their
    /// day, so only the order within each day can change.
    pub fn reorder_stops(&mut self, from: usize, to: usize) -> bool {
        let mut flat = self.state.stops.clone();
        if from >= flat.len() {
            return false;
        }
        let to = to.min(flat.len() - 1);
        let moved = flat.remove(from);
        flat.insert(to, moved);
        self.state.itinerary = group_by_day(flat, &self.state.itinerary);
        self.commit("reorder_stops");
        true
    }

    // ── Bulk edits ───────────────────────────────────────────────────

    pub fn set_itinerary(&mut self, days: Vec<ItineraryDay>) {
        self.state.itinerary = normalize_days(days);
        self.commit("set_itinerary");
    }

    pub fn load_itinerary(&mut self, snapshot: &TripSnapshot) {
        self.state.itinerary =
            projection_from(snapshot.itinerary.clone(), snapshot.stops.clone());
        self.state.trip_constraints = snapshot.trip_constraints.clone();
        self.state.focused_location = snapshot.center;
        self.commit("load_itinerary");
    }

    /// Back to an empty trip. The theme is a preference and survives.
    pub fn reset_trip(&mut self) {
        self.state = TripState {
            theme: self.state.theme,
            ..TripState::default()
        };
        self.commit("reset_trip");
    }

    // ── Simple assignments ───────────────────────────────────────────

    pub fn set_focused_location(&mut self, at: Coordinates) {
        self.state.focused_location = Some(at);
        self.commit("set_focused_location");
    }

    pub fn set_trip_constraints(&mut self, constraints: TripConstraints) {
        self.state.trip_constraints = constraints;
        self.commit("set_trip_constraints");
    }

    pub fn merge_trip_constraints(&mut self, constraints: TripConstraints) {
        self.state.trip_constraints.merge(constraints);
        self.commit("merge_trip_constraints");
    }

    pub fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        self.commit("toggle_theme");
    }

    // ── Story mode ───────────────────────────────────────────────────

    pub fn toggle_story_mode(&mut self) {
        self.state.cursor.toggle();
        self.state.cursor.clamp(&self.state.itinerary);
        self.focus_active_stop();
        self.commit("toggle_story_mode");
    }

    pub fn start_journey(&mut self) {
        self.state.cursor.start();
        self.state.cursor.clamp(&self.state.itinerary);
        self.focus_active_stop();
        self.commit("start_journey");
    }

    pub fn stop_journey(&mut self) {
        self.state.cursor.stop();
        self.commit("stop_journey");
    }

    /// Returns `false` at the end of the trip or outside story mode.
    pub fn next_stop(&mut self) -> bool {
        if !self.state.cursor.advance(&self.state.itinerary) {
            return false;
        }
        self.focus_active_stop();
        self.commit("next_stop");
        true
    }

    /// Returns `false` at the start of the trip or outside story mode.
    pub fn prev_stop(&mut self) -> bool {
        if !self.state.cursor.retreat(&self.state.itinerary) {
            return false;
        }
        self.focus_active_stop();
        self.commit("prev_stop");
        true
    }

    fn focus_active_stop(&mut self) {
        if let Some(at) = self.active_stop().map(|s| s.coordinates) {
            self.state.focused_location = Some(at);
        }
    }

    fn commit(&mut self, op: &str) {
        self.state.stops = flatten(&self.state.itinerary);
        self.state.cursor.clamp(&self.state.itinerary);
        tracing::debug!(
            op,
            stops = self.state.stops.len(),
            days = self.state.itinerary.len(),
            "itinerary commit"
        );
        for observer in &mut self.observers {
            observer.on_commit(&self.state);
        }
    }
}

fn coerce_day(day: u32) -> u32 {
    day.max(1)
}

/// Day-ordered concatenation of every day's stops.
pub fn flatten(days: &[ItineraryDay]) -> Vec<Stop> {
    days.iter().flat_map(|d| d.stops.iter().cloned()).collect()
}

/// Append a stop to the end of its day. A missing day is created as
/// `"Day n"` in sorted position.
fn push_to_day(days: &mut Vec<ItineraryDay>, stop: Stop) {
    let day = stop.day_index;
    match days.binary_search_by_key(&day, |d| d.day) {
        Ok(i) => days[i].stops.push(stop),
        Err(i) => {
            let mut group = ItineraryDay::new(day);
            group.stops.push(stop);
            days.insert(i, group);
        }
    }
}

/// Normalize the grouped `itinerary`, then append every registry stop it
/// does not already hold to the end of that stop's day, in registry order.
/// A legacy snapshot with no grouped stops is rebuilt entirely this way.
fn projection_from(itinerary: Vec<ItineraryDay>, stops: Vec<Stop>) -> Vec<ItineraryDay> {
    let mut days = normalize_days(itinerary);
    let mut known: HashSet<StopId> = days
        .iter()
        .flat_map(|d| d.stops.iter().map(|s| s.id.clone()))
        .collect();
    for mut stop in stops {
        if stop.id.trim().is_empty() {
            stop.id = new_stop_id();
        } else if known.contains(&stop.id) {
            continue;
        }
        known.insert(stop.id.clone());
        stop.day_index = coerce_day(stop.day_index);
        push_to_day(&mut days, stop);
    }
    days
}

/// Group a flat list by `day_index`, keeping relative order. Every day of
/// `previous` is kept with its narrative, even one left without stops.
pub fn group_by_day(stops: Vec<Stop>, previous: &[ItineraryDay]) -> Vec<ItineraryDay> {
    let mut grouped: BTreeMap<u32, ItineraryDay> = previous
        .iter()
        .map(|d| {
            let group = ItineraryDay {
                day: d.day,
                narrative: d.narrative.clone(),
                stops: Vec::new(),
            };
            (d.day, group)
        })
        .collect();
    for mut stop in stops {
        stop.day_index = coerce_day(stop.day_index);
        let day = stop.day_index;
        grouped
            .entry(day)
            .or_insert_with(|| ItineraryDay::new(day))
            .stops
            .push(stop);
    }
    grouped.into_values().collect()
}

/// Bring arbitrary input into projection shape: positive unique day numbers
/// in ascending order, stops tagged with their day, unique non-empty ids.
/// Days without stops are kept. Duplicate days merge in input order and the
/// first non-empty narrative wins.
pub fn normalize_days(days: Vec<ItineraryDay>) -> Vec<ItineraryDay> {
    let mut merged: BTreeMap<u32, ItineraryDay> = BTreeMap::new();
    for day in days {
        let n = coerce_day(day.day);
        let slot = merged.entry(n).or_insert_with(|| ItineraryDay {
            day: n,
            narrative: String::new(),
            stops: Vec::new(),
        });
        if slot.narrative.trim().is_empty() {
            slot.narrative = day.narrative;
        }
        slot.stops.extend(day.stops);
    }

    let mut seen: HashSet<StopId> = HashSet::new();
    let mut out = Vec::with_capacity(merged.len());
    for (n, mut day) in merged {
        for stop in &mut day.stops {
            stop.day_index = n;
            if stop.id.trim().is_empty() || seen.contains(&stop.id) {
                stop.id = new_stop_id();
            }
            seen.insert(stop.id.clone());
        }
        out.push(day);
    }
    out
}

/// Narrative for a day that has none of its own.
pub fn narrative_or_default(day: &ItineraryDay) -> String {
    if day.narrative.trim().is_empty() {
        default_narrative(day.day)
    } else {
        day.narrative.clone()
    }
}
