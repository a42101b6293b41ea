//! Aircraft state owned by the simulation host.
//!
//! Traffic is kept as a struct of arrays so the pairwise kernel can scan
//! columns directly. Every column is resized together in [`Traffic::create`]
//! and [`Traffic::delete`].

use crate::spatial::track_components;
use serde::{Deserialize, Serialize};

/// Kinematic state of a single aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    /// Ground speed in m/s
    pub gs_mps: f64,
    /// Track angle in degrees, clockwise from north
    pub trk_deg: f64,
    /// Vertical speed in m/s (positive = climbing)
    #[serde(default)]
    pub vs_mps: f64,
}

impl AircraftState {
    /// Create a level aircraft at rest.
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, alt_m: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            alt_m,
            gs_mps: 0.0,
            trk_deg: 0.0,
            vs_mps: 0.0,
        }
    }

    /// Set track, ground speed and vertical speed.
    pub fn with_velocity(mut self, trk_deg: f64, gs_mps: f64, vs_mps: f64) -> Self {
        self.trk_deg = trk_deg;
        self.gs_mps = gs_mps;
        self.vs_mps = vs_mps;
        self
    }
}

/// Columns describing how other aircraft perceive each aircraft.
#[derive(Debug, Clone, Default)]
pub struct Surveillance {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub alt_m: Vec<f64>,
    pub gs_mps: Vec<f64>,
    pub trk_deg: Vec<f64>,
    pub vs_mps: Vec<f64>,
}

impl Surveillance {
    fn push(&mut self, state: &AircraftState) {
        self.lat.push(state.lat);
        self.lon.push(state.lon);
        self.alt_m.push(state.alt_m);
        self.gs_mps.push(state.gs_mps);
        self.trk_deg.push(state.trk_deg);
        self.vs_mps.push(state.vs_mps);
    }

    fn remove(&mut self, idx: usize) {
        self.lat.remove(idx);
        self.lon.remove(idx);
        self.alt_m.remove(idx);
        self.gs_mps.remove(idx);
        self.trk_deg.remove(idx);
        self.vs_mps.remove(idx);
    }
}

/// All aircraft in the simulation, one entry per aircraft in every column.
///
/// Columns are only grown and shrunk through [`Traffic::create`] and
/// [`Traffic::delete`]. Hosts write individual elements (or use
/// [`Traffic::set_position`]) but never resize or replace a column.
#[derive(Debug, Clone, Default)]
pub struct Traffic {
    pub id: Vec<String>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub alt_m: Vec<f64>,
    pub gs_mps: Vec<f64>,
    pub trk_deg: Vec<f64>,
    pub vs_mps: Vec<f64>,
    /// Simulation time at which each aircraft was created
    pub create_time_s: Vec<f64>,
    /// Whether avoidance guidance is engaged, written by the resume decision
    pub active: Vec<bool>,
    /// Perceived copy of the kinematic columns
    pub surveillance: Surveillance,
}

impl Traffic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aircraft.
    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Append an aircraft; the perceived copy starts equal to the true state.
    ///
    /// Returns the index of the new aircraft.
    pub fn create(&mut self, state: AircraftState, simt: f64) -> usize {
        self.lat.push(state.lat);
        self.lon.push(state.lon);
        self.alt_m.push(state.alt_m);
        self.gs_mps.push(state.gs_mps);
        self.trk_deg.push(state.trk_deg);
        self.vs_mps.push(state.vs_mps);
        self.create_time_s.push(simt);
        self.active.push(false);
        self.surveillance.push(&state);
        self.id.push(state.id);
        self.id.len() - 1
    }

    /// Remove the aircraft at `idx`. Returns false if the index is out of range.
    pub fn delete(&mut self, idx: usize) -> bool {
        if idx >= self.len() {
            return false;
        }
        self.id.remove(idx);
        self.lat.remove(idx);
        self.lon.remove(idx);
        self.alt_m.remove(idx);
        self.gs_mps.remove(idx);
        self.trk_deg.remove(idx);
        self.vs_mps.remove(idx);
        self.create_time_s.remove(idx);
        self.active.remove(idx);
        self.surveillance.remove(idx);
        true
    }

    /// Index of the aircraft with identifier `id`, if it still exists.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id.iter().position(|candidate| candidate == id)
    }

    /// Copy true state into the perceived columns.
    pub fn sync_surveillance(&mut self) {
        let s = &mut self.surveillance;
        s.lat.clone_from(&self.lat);
        s.lon.clone_from(&self.lon);
        s.alt_m.clone_from(&self.alt_m);
        s.gs_mps.clone_from(&self.gs_mps);
        s.trk_deg.clone_from(&self.trk_deg);
        s.vs_mps.clone_from(&self.vs_mps);
    }

    /// Move aircraft `idx` to a new true position. Returns false if the
    /// index is out of range.
    pub fn set_position(&mut self, idx: usize, lat: f64, lon: f64, alt_m: f64) -> bool {
        if idx >= self.len() {
            return false;
        }
        self.lat[idx] = lat;
        self.lon[idx] = lon;
        self.alt_m[idx] = alt_m;
        true
    }

    /// East/north ground speed components of aircraft `idx`.
    pub fn gs_east_north(&self, idx: usize) -> (f64, f64) {
        track_components(self.gs_mps[idx], self.trk_deg[idx])
    }
}
