pub mod cursor;
pub mod drive;
pub mod itinerary;
pub mod plan;
pub mod types;

pub use cursor::{PlaybackCursor, PlaybackState, StoryFrame, StoryView};
pub use itinerary::{ItineraryStore, StoreObserver, TripState};
pub use types::*;
