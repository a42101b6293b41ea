//! Conflict and intrusion event records for the logging collaborator.

use crate::detection::{Geometry, PairTiming, Severity};
use crate::models::Traffic;
use crate::registry::{ConflictRegistry, PairKey, Transitions};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Conflict,
    Intrusion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Created,
    Deleted,
}

/// Kinematic state of one aircraft when an event was recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftSnapshot {
    pub id: String,
    pub create_time_s: f64,
    /// Conflict timing as seen by this aircraft, when geometry is available
    pub timing: Option<PairTiming>,
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    pub gs_mps: f64,
    pub vs_mps: f64,
    pub trk_deg: f64,
    pub active: bool,
}

/// One created or deleted conflict/intrusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictEvent {
    pub simt: f64,
    pub kind: EventKind,
    pub action: EventAction,
    pub pair: PairKey,
    /// `None` when the aircraft already left the simulation
    pub first: Option<AircraftSnapshot>,
    pub second: Option<AircraftSnapshot>,
    /// Worst intrusion of this pair, intrusion events only
    pub severity: Option<Severity>,
    /// Lifetime count of distinct pairs of this kind
    pub lifetime_count: u64,
}

fn snapshot(traffic: &Traffic, geometry: &Geometry, own: usize, other: Option<usize>) -> AircraftSnapshot {
    AircraftSnapshot {
        id: traffic.id[own].clone(),
        create_time_s: traffic.create_time_s[own],
        timing: other.and_then(|other| geometry.timing(own, other)),
        lat: traffic.lat[own],
        lon: traffic.lon[own],
        alt_m: traffic.alt_m[own],
        gs_mps: traffic.gs_mps[own],
        vs_mps: traffic.vs_mps[own],
        trk_deg: traffic.trk_deg[own],
        active: traffic.active[own],
    }
}

/// Build records for every transition, created before deleted.
///
/// `geometry` must come from the detection pass over the same `traffic`.
pub fn build_events(
    transitions: &Transitions,
    traffic: &Traffic,
    geometry: &Geometry,
    registry: &ConflictRegistry,
    simt: f64,
) -> Vec<ConflictEvent> {
    let mut events = Vec::new();
    let streams = [
        (EventKind::Conflict, &transitions.conflicts, registry.conflict_count()),
        (EventKind::Intrusion, &transitions.intrusions, registry.intrusion_count()),
    ];

    for (kind, diff, lifetime_count) in streams {
        let actions = [
            (EventAction::Created, &diff.created),
            (EventAction::Deleted, &diff.deleted),
        ];
        for (action, pairs) in actions {
            for pair in pairs {
                let (id_a, id_b) = pair.ids();
                let a = traffic.index_of(id_a);
                let b = traffic.index_of(id_b);
                events.push(ConflictEvent {
                    simt,
                    kind,
                    action,
                    pair: pair.clone(),
                    first: a.map(|a| snapshot(traffic, geometry, a, b)),
                    second: b.map(|b| snapshot(traffic, geometry, b, a)),
                    severity: match kind {
                        EventKind::Intrusion => registry.severity(pair),
                        EventKind::Conflict => None,
                    },
                    lifetime_count,
                });
            }
        }
    }

    events
}
