use serde::{Deserialize, Serialize};

use crate::types::{default_narrative, new_stop_id, Coordinates, CoordinateError, ItineraryDay, Stop};

/// A day as an agent or a plan file describes it: plain lat/lng numbers and
/// no ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(default)]
    pub stops: Vec<PlannedStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStop {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Turn plans into itinerary days with fresh stop ids. Fails only on
/// non-finite coordinates; day shape is left to `ItineraryStore::set_itinerary`.
pub fn into_itinerary(plans: Vec<DayPlan>) -> Result<Vec<ItineraryDay>, CoordinateError> {
    plans
        .into_iter()
        .map(|plan| {
            let day = plan.day.max(1);
            let stops = plan
                .stops
                .into_iter()
                .map(|p| {
                    Ok(Stop {
                        id: new_stop_id(),
                        name: p.name,
                        coordinates: Coordinates::new(p.lng, p.lat)?,
                        day_index: day,
                        notes: p.notes,
                    })
                })
                .collect::<Result<Vec<_>, CoordinateError>>()?;
            Ok(ItineraryDay {
                day,
                narrative: plan
                    .narrative
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| default_narrative(day)),
                stops,
            })
        })
        .collect()
}

/// Count of (days, stops) in a plan, for confirmations.
pub fn plan_size(plans: &[DayPlan]) -> (usize, usize) {
    (plans.len(), plans.iter().map(|p| p.stops.len()).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_from_yaml_becomes_days() {
        let yaml = r#"
- day: 1
  narrative: Old town
  stops:
    - { name: Alfama, lat: 38.711, lng: -9.13 }
    - { name: Se Cathedral, lat: 38.709, lng: -9.133, notes: "Go early" }
- day: 2
  stops:
    - { name: Belem Tower, lat: 38.691, lng: -9.215 }
"#;
        let plans: Vec<DayPlan> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(plan_size(&plans), (2, 3));

        let days = into_itinerary(plans).unwrap();
        assert_eq!(days[0].narrative, "Old town");
        assert_eq!(days[1].narrative, "Day 2");
        assert_eq!(days[0].stops[1].notes.as_deref(), Some("Go early"));
        assert_eq!(days[1].stops[0].day_index, 2);
        assert_eq!(days[0].stops[0].coordinates.lng, -9.13);
        assert_ne!(days[0].stops[0].id, days[0].stops[1].id);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let plans = vec![DayPlan {
            day: 1,
            narrative: None,
            stops: vec![PlannedStop {
                name: "nowhere".into(),
                lat: f64::INFINITY,
                lng: 0.0,
                notes: None,
            }],
        }];
        assert_eq!(into_itinerary(plans), Err(CoordinateError::NotFinite));
    }

    #[test]
    fn day_zero_becomes_day_one() {
        let days = into_itinerary(vec![DayPlan {
            day: 0,
            narrative: None,
            stops: vec![],
        }])
        .unwrap();
        assert_eq!(days[0].day, 1);
        assert_eq!(days[0].narrative, "Day 1");
    }
}
