//! Simulated drive along the flat stop list.
//!
//! No routing: the vehicle moves in a straight line between consecutive
//! stops, a fixed distance per frame.

use crate::types::{Coordinates, Stop};

/// Distance covered per frame when the caller gives no usable step.
pub const DEFAULT_STEP_KM: f64 = 0.5;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

fn lerp(a: Coordinates, b: Coordinates, t: f64) -> Coordinates {
    Coordinates {
        lng: a.lng + (b.lng - a.lng) * t,
        lat: a.lat + (b.lat - a.lat) * t,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveFrame {
    pub position: Coordinates,
    /// Index of the stop the current leg started from.
    pub leg: usize,
    /// Set when this frame lands on a stop.
    pub arrived: Option<usize>,
    pub traveled_km: f64,
}

#[derive(Debug, Clone)]
pub struct DriveSimulation {
    waypoints: Vec<Coordinates>,
    step_km: f64,
    leg: usize,
    progress_km: f64,
    traveled_km: f64,
    started: bool,
}

impl DriveSimulation {
    pub fn new(stops: &[Stop], step_km: f64) -> Self {
        let step_km = if step_km.is_finite() && step_km > 0.0 {
            step_km
        } else {
            DEFAULT_STEP_KM
        };
        Self {
            waypoints: stops.iter().map(|s| s.coordinates).collect(),
            step_km,
            leg: 0,
            progress_km: 0.0,
            traveled_km: 0.0,
            started: false,
        }
    }

    pub fn step_km(&self) -> f64 {
        self.step_km
    }

    /// Straight-line length of the whole route.
    pub fn total_km(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|w| haversine_km(w[0], w[1]))
            .sum()
    }
}

impl Iterator for DriveSimulation {
    type Item = DriveFrame;

    fn next(&mut self) -> Option<DriveFrame> {
        let first = *self.waypoints.first()?;
        if !self.started {
            self.started = true;
            return Some(DriveFrame {
                position: first,
                leg: 0,
                arrived: Some(0),
                traveled_km: 0.0,
            });
        }
        if self.leg + 1 >= self.waypoints.len() {
            return None;
        }

        let from = self.waypoints[self.leg];
        let to = self.waypoints[self.leg + 1];
        let leg_km = haversine_km(from, to);
        let remaining = leg_km - self.progress_km;

        if remaining <= self.step_km {
            self.traveled_km += remaining.max(0.0);
            let leg = self.leg;
            self.leg += 1;
            self.progress_km = 0.0;
            return Some(DriveFrame {
                position: to,
                leg,
                arrived: Some(leg + 1),
                traveled_km: self.traveled_km,
            });
        }

        self.progress_km += self.step_km;
        self.traveled_km += self.step_km;
        Some(DriveFrame {
            position: lerp(from, to, self.progress_km / leg_km),
            leg: self.leg,
            arrived: None,
            traveled_km: self.traveled_km,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, lng: f64, lat: f64) -> Stop {
        Stop {
            id: name.into(),
            name: name.into(),
            coordinates: Coordinates { lng, lat },
            day_index: 1,
            notes: None,
        }
    }

    #[test]
    fn visits_every_stop_in_order() {
        let stops = vec![
            stop("a", 0.0, 0.0),
            stop("b", 0.02, 0.0),
            stop("c", 0.02, 0.03),
        ];
        let frames: Vec<DriveFrame> = DriveSimulation::new(&stops, 0.5).collect();
        let arrivals: Vec<usize> = frames.iter().filter_map(|f| f.arrived).collect();
        assert_eq!(arrivals, vec![0, 1, 2]);

        let last = frames.last().unwrap();
        assert_eq!(last.position, stops[2].coordinates);
        let total = DriveSimulation::new(&stops, 0.5).total_km();
        assert!((last.traveled_km - total).abs() < 1e-9);
        assert!(frames.iter().any(|f| f.arrived.is_none()));
    }

    #[test]
    fn empty_route_yields_nothing() {
        assert_eq!(DriveSimulation::new(&[], 1.0).count(), 0);
    }

    #[test]
    fn single_stop_arrives_once() {
        let frames: Vec<_> = DriveSimulation::new(&[stop("a", 1.0, 1.0)], 1.0).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].arrived, Some(0));
    }

    #[test]
    fn zero_length_leg_arrives_immediately() {
        let stops = vec![stop("a", 5.0, 5.0), stop("b", 5.0, 5.0)];
        let frames: Vec<_> = DriveSimulation::new(&stops, 0.5).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].arrived, Some(1));
        assert_eq!(frames[1].traveled_km, 0.0);
    }

    #[test]
    fn bad_step_falls_back_to_default() {
        assert_eq!(DriveSimulation::new(&[], -1.0).step_km(), DEFAULT_STEP_KM);
        assert_eq!(DriveSimulation::new(&[], f64::NAN).step_km(), DEFAULT_STEP_KM);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_km(
            Coordinates { lng: 0.0, lat: 0.0 },
            Coordinates { lng: 0.0, lat: 1.0 },
        );
        assert!((d - 111.19).abs() < 0.1);
    }
}
