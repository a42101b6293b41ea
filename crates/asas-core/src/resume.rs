//! Resume-navigation decision.
//!
//! Every pair under active guidance is re-evaluated once per tick. While a
//! pair is still converging, inside the hard horizontal radius, or bouncing
//! on near-parallel tracks, both aircraft keep avoidance guidance engaged.
//! Once none of that holds the pair is released and both aircraft are told
//! to resume their route.

use crate::models::Traffic;
use crate::registry::{ConflictRegistry, PairKey};
use crate::rules::SeparationRules;
use crate::spatial::{east_north_offset, haversine_distance, heading_difference};
use crate::zones::{ZoneMap, CORE_ZONE, OUTSIDE_ZONES};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Splits traffic into arrival and departure flows.
///
/// Conflicts between aircraft of the same flow in non-adjacent rings are
/// artifacts of streams converging on a shared point and are suppressed.
pub trait FlowClassifier {
    fn is_arrival(&self, aircraft_id: &str) -> bool;
}

impl<F> FlowClassifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_arrival(&self, aircraft_id: &str) -> bool {
        self(aircraft_id)
    }
}

/// Odd numeric suffix = arrival, even or missing suffix = departure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixParity;

impl FlowClassifier for SuffixParity {
    fn is_arrival(&self, aircraft_id: &str) -> bool {
        aircraft_id
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .is_some_and(|digit| digit % 2 == 1)
    }
}

/// Instruction for the route collaborator: fly direct to the currently
/// active waypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeDirective {
    pub aircraft_id: String,
}

/// Lifecycle of a guided pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairState {
    /// Both aircraft under avoidance guidance
    Active,
    /// Guidance released and the pair purged from the guidance set
    Resolved,
}

/// Why a pair ended the tick in its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResumeOutcome {
    /// Zone context marks the conflict as a convergence artifact
    Suppressed { zone_a: u8, zone_b: u8 },
    /// Guidance stays engaged
    Engaged {
        past_cpa: bool,
        horizontal_los: bool,
        bouncing: bool,
    },
    /// Conflict over, both aircraft resume
    Resolved,
    /// At least one aircraft left the simulation
    Orphaned,
}

impl ResumeOutcome {
    pub fn state(&self) -> PairState {
        match self {
            Self::Suppressed { .. } | Self::Engaged { .. } => PairState::Active,
            Self::Resolved | Self::Orphaned => PairState::Resolved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairDecision {
    pub pair: PairKey,
    pub outcome: ResumeOutcome,
}

/// Result of one resume pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeReport {
    pub decisions: Vec<PairDecision>,
    /// At most one directive per aircraft, in issue order
    pub directives: Vec<ResumeDirective>,
}

impl ResumeReport {
    fn direct(&mut self, aircraft_id: &str) {
        if self.directives.iter().any(|d| d.aircraft_id == aircraft_id) {
            return;
        }
        info!(aircraft = aircraft_id, "resume route to active waypoint");
        self.directives.push(ResumeDirective {
            aircraft_id: aircraft_id.to_string(),
        });
    }
}

/// Decide guidance for every guided pair and set `traffic.active`.
pub fn resume_navigation(
    traffic: &mut Traffic,
    registry: &mut ConflictRegistry,
    zones: &ZoneMap,
    classifier: &dyn FlowClassifier,
    rules: &SeparationRules,
) -> ResumeReport {
    traffic.active.iter_mut().for_each(|flag| *flag = false);
    let mut report = ResumeReport::default();

    // Snapshot first: releasing mutates the guidance set.
    for pair in registry.guidance_pairs() {
        let (id_a, id_b) = pair.ids();
        let members = [(id_a, traffic.index_of(id_a)), (id_b, traffic.index_of(id_b))];
        let outcome = match (members[0].1, members[1].1) {
            (Some(a), Some(b)) => evaluate(traffic, a, b, zones, classifier, rules),
            _ => ResumeOutcome::Orphaned,
        };

        match outcome {
            ResumeOutcome::Suppressed { zone_a, zone_b } => {
                debug!(pair = %pair, zone_a, zone_b, "conflict suppressed by zone context");
                set_active(traffic, &members, false);
            }
            ResumeOutcome::Engaged { .. } => set_active(traffic, &members, true),
            ResumeOutcome::Resolved | ResumeOutcome::Orphaned => {
                if outcome == ResumeOutcome::Orphaned {
                    warn!(pair = %pair, "guided pair lost an aircraft, releasing");
                }
                // Only aircraft still in the simulation can resume.
                for (id, idx) in members {
                    if idx.is_some() {
                        report.direct(id);
                    }
                }
                registry.release(&pair);
            }
        }
        report.decisions.push(PairDecision { pair, outcome });
    }

    report
}

fn set_active(traffic: &mut Traffic, members: &[(&str, Option<usize>); 2], engaged: bool) {
    for idx in members.iter().filter_map(|(_, idx)| *idx) {
        traffic.active[idx] = engaged;
    }
}

fn evaluate(
    traffic: &Traffic,
    a: usize,
    b: usize,
    zones: &ZoneMap,
    classifier: &dyn FlowClassifier,
    rules: &SeparationRules,
) -> ResumeOutcome {
    let zone_ids = zones.classify(traffic, &[a, b]);
    let (zone_a, zone_b) = (zone_ids[0], zone_ids[1]);

    if zone_a == CORE_ZONE || zone_b == CORE_ZONE {
        return ResumeOutcome::Suppressed { zone_a, zone_b };
    }

    let same_flow = classifier.is_arrival(&traffic.id[a]) == classifier.is_arrival(&traffic.id[b]);
    if zones.zone_difference(zone_a, zone_b) > 1
        && same_flow
        && zone_a != OUTSIDE_ZONES
        && zone_b != OUTSIDE_ZONES
    {
        return ResumeOutcome::Suppressed { zone_a, zone_b };
    }

    // Relative position of b with respect to a, and relative velocity.
    let (dx, dy) = east_north_offset(traffic.lat[a], traffic.lon[a], traffic.lat[b], traffic.lon[b]);
    let (ua, va) = traffic.gs_east_north(a);
    let (ub, vb) = traffic.gs_east_north(b);
    let past_cpa = dx * (ub - ua) + dy * (vb - va) > 0.0;

    let hdist = haversine_distance(traffic.lat[a], traffic.lon[a], traffic.lat[b], traffic.lon[b]);
    let horizontal_los = hdist < rules.resolution_radius_m();

    let bouncing = horizontal_los
        && heading_difference(traffic.trk_deg[a], traffic.trk_deg[b]) < rules.bouncing_track_deg;

    if !past_cpa || horizontal_los || bouncing {
        ResumeOutcome::Engaged {
            past_cpa,
            horizontal_los,
            bouncing,
        }
    } else {
        ResumeOutcome::Resolved
    }
}
