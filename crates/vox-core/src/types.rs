use serde::{Deserialize, Serialize};

/// Stop ID format: `stp_<ulid>`
pub type StopId = String;

/// Trip ID format: `trip_<ulid>`
pub type TripId = String;

/// Narrative shown in story mode when neither the stop nor its day has text.
pub const DEFAULT_CAPTION: &str = "Explore this amazing location.";

pub fn new_stop_id() -> StopId {
    format!("stp_{}", ulid::Ulid::new().to_string().to_lowercase())
}

pub fn new_trip_id() -> TripId {
    format!("trip_{}", ulid::Ulid::new().to_string().to_lowercase())
}

/// Milliseconds since the Unix epoch, the unit of `TripSnapshot::updated_at`.
pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Default narrative for a day group created implicitly.
pub fn default_narrative(day: u32) -> String {
    format!("Day {day}")
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinates need exactly two numbers [lng, lat], got {0}")]
    Arity(usize),
    #[error("coordinates must be finite numbers")]
    NotFinite,
}

/// A geographic point. Longitude comes first everywhere: in memory, on the
/// wire (`[lng, lat]`), and in every map-facing API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lng: f64, lat: f64) -> Result<Self, CoordinateError> {
        if !lng.is_finite() || !lat.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        Ok(Self { lng, lat })
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lng, c.lat]
    }
}

impl TryFrom<&[f64]> for Coordinates {
    type Error = CoordinateError;

    fn try_from(pair: &[f64]) -> Result<Self, Self::Error> {
        match pair {
            [lng, lat] => Self::new(*lng, *lat),
            other => Err(CoordinateError::Arity(other.len())),
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lng, self.lat)
    }
}

/// A point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default = "first_day")]
    pub day_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn first_day() -> u32 {
    1
}

/// Input for `ItineraryStore::add_stop`. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStop {
    pub name: String,
    pub coordinates: Coordinates,
    /// Day number; `None` or `0` lands on day 1.
    pub day_index: Option<u32>,
    pub notes: Option<String>,
}

impl NewStop {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
            day_index: None,
            notes: None,
        }
    }

    pub fn on_day(mut self, day: u32) -> Self {
        self.day_index = Some(day);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One day of the itinerary with its narrative and ordered stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl ItineraryDay {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            narrative: default_narrative(day),
            stops: Vec::new(),
        }
    }
}

/// User-declared trip metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
}

impl TripConstraints {
    /// Overwrite only the fields present in `other`.
    pub fn merge(&mut self, other: TripConstraints) {
        if other.destination.is_some() {
            self.destination = other.destination;
        }
        if other.duration.is_some() {
            self.duration = other.duration;
        }
        if other.vibe.is_some() {
            self.vibe = other.vibe;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.destination.is_none() && self.duration.is_none() && self.vibe.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// A named, self-contained copy of a trip. Written whole, replaced whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub id: TripId,
    pub name: String,
    pub updated_at: i64,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub trip_constraints: TripConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl TripSnapshot {
    pub fn metadata(&self) -> TripMetadata {
        TripMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry for a stored trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMetadata {
    pub id: TripId,
    pub name: String,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_serialize_longitude_first() {
        let c = Coordinates::new(2.2945, 48.8584).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[2.2945,48.8584]");
        let back: Coordinates = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lng, 2.2945);
        assert_eq!(back.lat, 48.8584);
    }

    #[test]
    fn coordinates_reject_wrong_arity() {
        let one: &[f64] = &[1.0];
        assert_eq!(Coordinates::try_from(one), Err(CoordinateError::Arity(1)));
        let three: &[f64] = &[1.0, 2.0, 3.0];
        assert_eq!(Coordinates::try_from(three), Err(CoordinateError::Arity(3)));
    }

    #[test]
    fn coordinates_reject_nan() {
        assert_eq!(
            Coordinates::new(f64::NAN, 1.0),
            Err(CoordinateError::NotFinite)
        );
    }

    #[test]
    fn stop_ids_are_prefixed_and_unique() {
        let a = new_stop_id();
        let b = new_stop_id();
        assert!(a.starts_with("stp_"));
        assert_ne!(a, b);
        assert!(new_trip_id().starts_with("trip_"));
    }

    #[test]
    fn stop_uses_camel_case_and_defaults_day() {
        let stop: Stop =
            serde_json::from_str(r#"{"id":"s1","name":"Louvre","coordinates":[2.33,48.86]}"#)
                .unwrap();
        assert_eq!(stop.day_index, 1);
        assert!(stop.notes.is_none());

        let json = serde_json::to_value(&stop).unwrap();
        assert_eq!(json["dayIndex"], 1);
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn constraints_merge_keeps_absent_fields() {
        let mut c = TripConstraints {
            destination: Some("Kyoto".into()),
            duration: Some("3 days".into()),
            vibe: None,
        };
        c.merge(TripConstraints {
            vibe: Some("slow".into()),
            ..Default::default()
        });
        assert_eq!(c.destination.as_deref(), Some("Kyoto"));
        assert_eq!(c.duration.as_deref(), Some("3 days"));
        assert_eq!(c.vibe.as_deref(), Some("slow"));
    }

    #[test]
    fn theme_serializes_lowercase_and_toggles() {
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn snapshot_optional_fields_skipped() {
        let snap = TripSnapshot {
            id: "trip_1".into(),
            name: "Paris".into(),
            updated_at: 42,
            stops: vec![],
            itinerary: vec![],
            trip_constraints: TripConstraints::default(),
            center: None,
            zoom: None,
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["updatedAt"], 42);
        assert!(json.get("center").is_none());
        assert!(json.get("zoom").is_none());
        assert_eq!(snap.metadata().name, "Paris");
    }
}
