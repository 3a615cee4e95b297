//! Story-mode playback cursor.
//!
//! The cursor is a `(day index, activity index)` pair into the itinerary plus
//! a story-mode flag. Indices are positions, not day numbers: index 0 is the
//! first day group whatever its `day` value is.

use serde::{Deserialize, Serialize};

use crate::types::{ItineraryDay, Stop, DEFAULT_CAPTION};

/// Hour shown for the first activity of a day in the story clock.
const STORY_DAY_START_HOUR: usize = 9;
/// Simulated hours between consecutive activities.
const STORY_HOURS_PER_ACTIVITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Inactive,
    Active {
        day_index: usize,
        activity_index: usize,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackCursor {
    story_mode: bool,
    day_index: usize,
    activity_index: usize,
}

impl PlaybackCursor {
    pub fn is_active(&self) -> bool {
        self.story_mode
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }

    pub fn activity_index(&self) -> usize {
        self.activity_index
    }

    pub fn state(&self) -> PlaybackState {
        if self.story_mode {
            PlaybackState::Active {
                day_index: self.day_index,
                activity_index: self.activity_index,
            }
        } else {
            PlaybackState::Inactive
        }
    }

    /// Flip story mode. Either direction lands on (0, 0).
    pub fn toggle(&mut self) {
        self.story_mode = !self.story_mode;
        self.rewind();
    }

    pub fn start(&mut self) {
        self.story_mode = true;
        self.rewind();
    }

    /// Leave story mode. The position is reset, same as `toggle`.
    pub fn stop(&mut self) {
        self.story_mode = false;
        self.rewind();
    }

    fn rewind(&mut self) {
        self.day_index = 0;
        self.activity_index = 0;
    }

    /// Step forward one activity, rolling over into the next day that has
    /// stops. Returns `false` at the end of the trip or when inactive.
    pub fn advance(&mut self, days: &[ItineraryDay]) -> bool {
        if !self.story_mode || days.is_empty() {
            return false;
        }
        self.clamp(days);
        let current_len = days[self.day_index].stops.len();
        if self.activity_index + 1 < current_len {
            self.activity_index += 1;
            return true;
        }
        let next_day = days
            .iter()
            .enumerate()
            .skip(self.day_index + 1)
            .find(|(_, d)| !d.stops.is_empty())
            .map(|(i, _)| i);
        match next_day {
            Some(i) => {
                self.day_index = i;
                self.activity_index = 0;
                true
            }
            None => false,
        }
    }

    /// Step back one activity, rolling back into the last activity of the
    /// previous day that has stops. Returns `false` at the start of the trip.
    pub fn retreat(&mut self, days: &[ItineraryDay]) -> bool {
        if !self.story_mode || days.is_empty() {
            return false;
        }
        self.clamp(days);
        if self.activity_index > 0 {
            self.activity_index -= 1;
            return true;
        }
        let prev_day = days[..self.day_index]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, d)| !d.stops.is_empty())
            .map(|(i, _)| i);
        match prev_day {
            Some(i) => {
                self.day_index = i;
                self.activity_index = days[i].stops.len() - 1;
                true
            }
            None => false,
        }
    }

    /// Pull the indices back inside `days`. A day without stops hands the
    /// cursor to the first stop of the next day that has some, else to the
    /// last stop of the previous one. With no stops anywhere the cursor
    /// clamps to (0, 0), which `resolve` reports as "no active stop".
    pub fn clamp(&mut self, days: &[ItineraryDay]) {
        if days.is_empty() {
            self.rewind();
            return;
        }
        self.day_index = self.day_index.min(days.len() - 1);
        if days[self.day_index].stops.is_empty() {
            let later = (self.day_index..days.len()).find(|&i| !days[i].stops.is_empty());
            let earlier = (0..self.day_index).rev().find(|&i| !days[i].stops.is_empty());
            match (later, earlier) {
                (Some(i), _) => {
                    self.day_index = i;
                    self.activity_index = 0;
                }
                (None, Some(i)) => {
                    self.day_index = i;
                    self.activity_index = days[i].stops.len() - 1;
                }
                (None, None) => self.rewind(),
            }
            return;
        }
        let len = days[self.day_index].stops.len();
        self.activity_index = self.activity_index.min(len - 1);
    }

    /// The day and stop under the cursor, if story mode is on and the
    /// indices point at something.
    pub fn resolve<'a>(&self, days: &'a [ItineraryDay]) -> Option<(&'a ItineraryDay, &'a Stop)> {
        if !self.story_mode {
            return None;
        }
        let day = days.get(self.day_index)?;
        let stop = day.stops.get(self.activity_index)?;
        Some((day, stop))
    }

    /// Render-ready view of the cursor position.
    pub fn view<'a>(&self, days: &'a [ItineraryDay]) -> StoryView<'a> {
        if !self.story_mode {
            return StoryView::Inactive;
        }
        let Some((day, stop)) = self.resolve(days) else {
            return StoryView::Empty;
        };
        let is_first = !days[..self.day_index].iter().any(|d| !d.stops.is_empty())
            && self.activity_index == 0;
        let is_last = self.activity_index + 1 == day.stops.len()
            && !days[self.day_index + 1..].iter().any(|d| !d.stops.is_empty());
        StoryView::Stop(StoryFrame {
            day,
            stop,
            day_index: self.day_index,
            activity_index: self.activity_index,
            is_first,
            is_last,
        })
    }
}

/// What a story overlay should show.
#[derive(Debug, Clone, PartialEq)]
pub enum StoryView<'a> {
    Inactive,
    /// Story mode is on but there is nothing to play.
    Empty,
    Stop(StoryFrame<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoryFrame<'a> {
    pub day: &'a ItineraryDay,
    pub stop: &'a Stop,
    pub day_index: usize,
    pub activity_index: usize,
    pub is_first: bool,
    pub is_last: bool,
}

impl StoryFrame<'_> {
    /// Stop notes, else the day narrative, else a stock line.
    pub fn caption(&self) -> &str {
        self.stop
            .notes
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| Some(self.day.narrative.as_str()).filter(|n| !n.trim().is_empty()))
            .unwrap_or(DEFAULT_CAPTION)
    }

    /// Simulated clock: 9:00 AM for the first activity, two hours per step.
    pub fn time_label(&self) -> String {
        story_time_label(self.activity_index)
    }
}

pub fn story_time_label(activity_index: usize) -> String {
    let hour = (STORY_DAY_START_HOUR + activity_index * STORY_HOURS_PER_ACTIVITY) % 24;
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display}:00 {suffix}")
}
