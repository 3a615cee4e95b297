use std::time::Duration;

use serde::Serialize;
use vox_core::Coordinates;

/// Name given to a map click that reverse geocoding could not name.
pub const PINNED_LOCATION: &str = "Pinned Location";

const FORWARD_URL: &str = "https://api.mapbox.com/search/geocode/v6/forward";
const REVERSE_URL: &str = "https://api.mapbox.com/search/geocode/v6/reverse";
const TIMEOUT: Duration = Duration::from_secs(5);
const LIMIT: &str = "5";
const FORWARD_TYPES: &str = "place,poi,address";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no Mapbox token configured (set VOX_MAPBOX_TOKEN or `vox config set mapbox_token <token>`)")]
    MissingToken,
    #[error("geocoding request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("unexpected geocoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A named point returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub coordinates: Coordinates,
}

pub trait PlaceSearch {
    /// Free-text search. An empty query yields no results.
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError>;

    /// Names for a point, best match first.
    fn reverse(&self, at: Coordinates) -> Result<Vec<Place>, GeocodeError>;
}

/// Name a clicked point. Never fails: lookups that error or come back empty
/// yield [`PINNED_LOCATION`].
pub fn pin_name(search: &dyn PlaceSearch, at: Coordinates) -> String {
    match search.reverse(at) {
        Ok(places) => match places.into_iter().next() {
            Some(place) => place.name,
            None => PINNED_LOCATION.to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, %at, "reverse geocoding failed, using fallback name");
            PINNED_LOCATION.to_string()
        }
    }
}

// ── Mapbox ──

/// Mapbox Geocoding v6 over blocking HTTP.
pub struct MapboxGeocoder {
    token: Option<String>,
    agent: ureq::Agent,
}

impl MapboxGeocoder {
    pub fn new(token: Option<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .new_agent();
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            agent,
        }
    }

    fn token(&self) -> Result<&str, GeocodeError> {
        self.token.as_deref().ok_or(GeocodeError::MissingToken)
    }

    fn fetch(
        &self,
        request: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
    ) -> Result<Vec<Place>, GeocodeError> {
        let text = request.call()?.body_mut().read_to_string()?;
        parse_features(&text)
    }
}

impl PlaceSearch for MapboxGeocoder {
    fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let token = self.token()?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(query, "forward geocoding");
        self.fetch(
            self.agent
                .get(FORWARD_URL)
                .query("q", query)
                .query("types", FORWARD_TYPES)
                .query("limit", LIMIT)
                .query("access_token", token),
        )
    }

    fn reverse(&self, at: Coordinates) -> Result<Vec<Place>, GeocodeError> {
        let token = self.token()?;
        tracing::debug!(%at, "reverse geocoding");
        self.fetch(
            self.agent
                .get(REVERSE_URL)
                .query("longitude", at.lng.to_string())
                .query("latitude", at.lat.to_string())
                .query("limit", "1")
                .query("access_token", token),
        )
    }
}

/// Pull places out of a geocoding FeatureCollection. Understands the v6
/// shape (`properties.full_address`, `geometry.coordinates`) and the older
/// v5 one (`place_name`, `center`). Features without a usable name or point
/// are skipped.
pub fn parse_features(body: &str) -> Result<Vec<Place>, GeocodeError> {
    let doc: serde_json::Value = serde_json::from_str(body)?;
    let Some(features) = doc.get("features").and_then(|f| f.as_array()) else {
        return Ok(Vec::new());
    };
    Ok(features.iter().filter_map(feature_to_place).collect())
}

fn feature_to_place(feature: &serde_json::Value) -> Option<Place> {
    let props = feature.get("properties");
    let name = props
        .and_then(|p| p.get("full_address").or_else(|| p.get("name")))
        .or_else(|| feature.get("place_name"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())?;
    let point = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .or_else(|| feature.get("center"))?
        .as_array()?;
    let pair: Vec<f64> = point.iter().filter_map(|v| v.as_f64()).collect();
    let coordinates = Coordinates::try_from(pair.as_slice()).ok()?;
    Some(Place {
        name: name.to_string(),
        coordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const V6_BODY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [2.2945, 48.8584]},
                "properties": {"name": "Eiffel Tower", "full_address": "Eiffel Tower, Paris, France"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [2.3376]},
                "properties": {"name": "Broken"}
            }
        ]
    }"#;

    #[test]
    fn parses_v6_features() {
        let places = parse_features(V6_BODY).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Eiffel Tower, Paris, France");
        assert_eq!(places[0].coordinates.lng, 2.2945);
        assert_eq!(places[0].coordinates.lat, 48.8584);
    }

    #[test]
    fn parses_v5_features() {
        let body = r#"{"features":[{"place_name":"Kyoto, Japan","center":[135.7681,35.0116]}]}"#;
        let places = parse_features(body).unwrap();
        assert_eq!(places[0].name, "Kyoto, Japan");
        assert_eq!(places[0].coordinates.lng, 135.7681);
    }

    #[test]
    fn missing_features_is_empty_and_garbage_is_error() {
        assert!(parse_features("{}").unwrap().is_empty());
        assert!(matches!(parse_features("<html>"), Err(GeocodeError::Decode(_))));
    }

    #[test]
    fn missing_token_fails_before_any_request() {
        let geo = MapboxGeocoder::new(Some("  ".into()));
        assert!(matches!(geo.search("Paris"), Err(GeocodeError::MissingToken)));
        assert!(matches!(
            geo.reverse(Coordinates { lng: 0.0, lat: 0.0 }),
            Err(GeocodeError::MissingToken)
        ));
    }

    struct Fake(Result<Vec<Place>, ()>);

    impl PlaceSearch for Fake {
        fn search(&self, _query: &str) -> Result<Vec<Place>, GeocodeError> {
            Ok(Vec::new())
        }

        fn reverse(&self, _at: Coordinates) -> Result<Vec<Place>, GeocodeError> {
            self.0.clone().map_err(|_| GeocodeError::MissingToken)
        }
    }

    #[test]
    fn pin_name_uses_first_result_or_fallback() {
        let at = Coordinates { lng: 1.0, lat: 2.0 };
        let named = Fake(Ok(vec![Place {
            name: "Cafe".into(),
            coordinates: at,
        }]));
        assert_eq!(pin_name(&named, at), "Cafe");
        assert_eq!(pin_name(&Fake(Ok(vec![])), at), PINNED_LOCATION);
        assert_eq!(pin_name(&Fake(Err(())), at), PINNED_LOCATION);
    }
}
