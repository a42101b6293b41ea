//! Waypoint routes flown by the scenario host.

use asas_core::spatial::{bearing, haversine_distance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// Ordered waypoints plus the index of the one being flown to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    active: usize,
    /// Lateral navigation engaged: track follows the active waypoint
    pub lnav: bool,
}

impl Route {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            active: 0,
            lnav: true,
        }
    }

    pub fn active_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.active)
    }

    pub fn is_finished(&self) -> bool {
        self.active >= self.waypoints.len()
    }

    /// Track (degrees) from a position to the active waypoint.
    pub fn track_to_active(&self, lat: f64, lon: f64) -> Option<f64> {
        self.active_waypoint()
            .map(|wp| bearing(lat, lon, wp.lat, wp.lon).to_degrees().rem_euclid(360.0))
    }

    /// Re-engage navigation towards the active waypoint.
    ///
    /// Returns the new track, or `None` when no waypoint is left.
    pub fn direct_to_active(&mut self, lat: f64, lon: f64) -> Option<f64> {
        let track = self.track_to_active(lat, lon)?;
        self.lnav = true;
        Some(track)
    }

    /// Move to the next waypoint once within `capture_m` of the active one.
    pub fn advance_if_reached(&mut self, lat: f64, lon: f64, capture_m: f64) -> bool {
        let reached = self
            .active_waypoint()
            .is_some_and(|wp| haversine_distance(lat, lon, wp.lat, wp.lon) <= capture_m);
        if reached {
            self.active += 1;
        }
        reached
    }
}
