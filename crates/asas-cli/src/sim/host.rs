//! Fixed-step traffic host driving the separation engine.

use super::route::Route;
use super::scenarios::Scenario;
use asas_core::spatial::offset_by_bearing;
use asas_core::{AreaError, ConflictEvent, SeparationEngine, Traffic};
use std::collections::HashMap;
use tracing::{debug, info};

/// Minimum waypoint capture radius in meters.
const MIN_CAPTURE_M: f64 = 500.0;

/// Result of one host step.
#[derive(Debug, Clone, Default)]
pub struct StepSummary {
    pub simt: f64,
    pub aircraft: usize,
    pub conflicts: usize,
    pub intrusions: usize,
    pub directives: usize,
    /// Aircraft removed this step after finishing their route
    pub retired: Vec<String>,
    pub events: Vec<ConflictEvent>,
}

pub struct SimHost {
    pub traffic: Traffic,
    routes: HashMap<String, Route>,
    engine: SeparationEngine,
    simt: f64,
    dt: f64,
}

impl SimHost {
    pub fn new(engine: SeparationEngine, dt: f64) -> Self {
        Self {
            traffic: Traffic::new(),
            routes: HashMap::new(),
            engine,
            simt: 0.0,
            dt,
        }
    }

    /// Create the scenario's aircraft and define its zones.
    pub fn load(&mut self, scenario: Scenario) -> Result<(), AreaError> {
        for area in scenario.zones {
            self.engine.define_zone(area)?;
        }
        for (state, route) in scenario.aircraft {
            self.routes.insert(state.id.clone(), route);
            self.traffic.create(state, self.simt);
        }
        info!(
            scenario = %scenario.name,
            aircraft = self.traffic.len(),
            zones = self.engine.zones().max_ring(),
            "scenario loaded"
        );
        Ok(())
    }

    pub fn simt(&self) -> f64 {
        self.simt
    }

    pub fn engine(&self) -> &SeparationEngine {
        &self.engine
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    /// Advance one time step: move, navigate, detect, apply directives.
    pub fn step(&mut self) -> StepSummary {
        self.simt += self.dt;
        self.advance_kinematics();
        self.traffic.sync_surveillance();

        let mut summary = StepSummary {
            simt: self.simt,
            ..StepSummary::default()
        };
        summary.retired = self.navigate();
        if !summary.retired.is_empty() {
            let ids: Vec<&str> = summary.retired.iter().map(String::as_str).collect();
            summary
                .events
                .extend(self.engine.retire_aircraft(&self.traffic, &ids, self.simt));
            for id in &summary.retired {
                if let Some(idx) = self.traffic.index_of(id) {
                    self.traffic.delete(idx);
                }
                self.routes.remove(id);
            }
        }

        let report = self.engine.tick(&mut self.traffic, self.simt);
        for directive in &report.resume.directives {
            self.resume_route(&directive.aircraft_id);
        }

        summary.aircraft = self.traffic.len();
        summary.conflicts = report.conflicts.len();
        summary.intrusions = report.intrusions.len();
        summary.directives = report.resume.directives.len();
        summary.events.extend(report.events);
        summary
    }

    fn advance_kinematics(&mut self) {
        let traf = &mut self.traffic;
        for i in 0..traf.len() {
            let distance_m = traf.gs_mps[i] * self.dt;
            let (lat, lon) =
                offset_by_bearing(traf.lat[i], traf.lon[i], distance_m, traf.trk_deg[i].to_radians());
            let alt_m = traf.alt_m[i] + traf.vs_mps[i] * self.dt;
            traf.set_position(i, lat, lon, alt_m);
        }
    }

    /// Steer unguided aircraft along their routes; returns finished aircraft.
    fn navigate(&mut self) -> Vec<String> {
        let traf = &mut self.traffic;
        let mut finished = Vec::new();
        for i in 0..traf.len() {
            let Some(route) = self.routes.get_mut(&traf.id[i]) else {
                continue;
            };
            let capture_m = (traf.gs_mps[i] * self.dt).max(MIN_CAPTURE_M);
            if route.advance_if_reached(traf.lat[i], traf.lon[i], capture_m) && route.is_finished() {
                finished.push(traf.id[i].clone());
                continue;
            }
            if traf.active[i] {
                // Under guidance: hold the current track.
                route.lnav = false;
            } else {
                // Guidance off, including suppressed pairs that never get a
                // resume directive: fly the route again.
                if !route.lnav {
                    debug!(aircraft = %traf.id[i], "guidance off, route following re-engaged");
                }
                if let Some(track) = route.direct_to_active(traf.lat[i], traf.lon[i]) {
                    traf.trk_deg[i] = track;
                }
            }
        }
        finished
    }

    fn resume_route(&mut self, id: &str) {
        let (Some(idx), Some(route)) = (self.traffic.index_of(id), self.routes.get_mut(id)) else {
            return;
        };
        if let Some(track) = route.direct_to_active(self.traffic.lat[idx], self.traffic.lon[idx]) {
            debug!(aircraft = id, track, "direct to active waypoint");
            self.traffic.trk_deg[idx] = track;
        }
    }
}
