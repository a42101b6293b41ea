//! State-based conflict detection.
//!
//! Every ordered aircraft pair `(own, other)` is evaluated from the own
//! aircraft's true state against the other aircraft's perceived state. The
//! horizontal closest point of approach gives a horizontal conflict window,
//! the altitude band crossings give a vertical one, and a conflict exists
//! when the two windows overlap inside the lookahead horizon.

use crate::models::Traffic;
use crate::noise::NoiseModel;
use crate::rules::SeparationRules;
use crate::spatial::{haversine_distance, offset_by_bearing, qdrdist, track_components};
use serde::Serialize;

/// Added to self-pair distance and CPA time so the diagonal never conflicts.
pub const SELF_PAIR_SENTINEL: f64 = 1e9;

/// Window bound assigned to pairs without a horizontal conflict.
pub const NO_CONFLICT_TIME: f64 = 1e8;

/// Floor for squared relative speed and vertical-speed difference.
const MIN_DENOMINATOR: f64 = 1e-6;

/// Dense row-major `n x n` matrix indexed by `(own, other)`.
#[derive(Debug, Clone, Default)]
pub struct PairMatrix {
    n: usize,
    values: Vec<f64>,
}

impl PairMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n],
        }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Value for `(own, other)`, or `None` when either index is out of range.
    pub fn get(&self, own: usize, other: usize) -> Option<f64> {
        (own < self.n && other < self.n).then(|| self.values[own * self.n + other])
    }

    fn set(&mut self, own: usize, other: usize, value: f64) {
        self.values[own * self.n + other] = value;
    }
}

/// Pairwise geometry computed for one tick.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Perceived bearing from own to other, degrees
    pub qdr_deg: PairMatrix,
    /// Perceived distance from own to other, meters (self-pairs carry the sentinel)
    pub dist_m: PairMatrix,
    /// Time to horizontal CPA, seconds
    pub tcpa_s: PairMatrix,
    /// Combined conflict window entry, seconds
    pub tin_s: PairMatrix,
    /// Combined conflict window exit, seconds
    pub tout_s: PairMatrix,
}

/// Conflict timing as seen by one aircraft of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairTiming {
    pub tin_s: f64,
    pub tout_s: f64,
    pub tcpa_s: f64,
}

impl Geometry {
    fn new(n: usize) -> Self {
        Self {
            qdr_deg: PairMatrix::new(n),
            dist_m: PairMatrix::new(n),
            tcpa_s: PairMatrix::new(n),
            tin_s: PairMatrix::new(n),
            tout_s: PairMatrix::new(n),
        }
    }

    /// Window and CPA time for `(own, other)`.
    pub fn timing(&self, own: usize, other: usize) -> Option<PairTiming> {
        Some(PairTiming {
            tin_s: self.tin_s.get(own, other)?,
            tout_s: self.tout_s.get(own, other)?,
            tcpa_s: self.tcpa_s.get(own, other)?,
        })
    }
}

/// Intrusion depth of a loss of separation, each in `(0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Severity {
    /// `min(horizontal, vertical)`
    pub combined: f64,
    pub horizontal: f64,
    pub vertical: f64,
}

impl Severity {
    /// Intrusion depth for separations `hdist_m` / `vdist_m` inside a zone of
    /// radius `rpz_m` and half-height `hpz_m`.
    pub fn from_separation(hdist_m: f64, vdist_m: f64, rpz_m: f64, hpz_m: f64) -> Self {
        let horizontal = 1.0 - hdist_m / rpz_m;
        let vertical = 1.0 - vdist_m / hpz_m;
        Self {
            combined: horizontal.min(vertical),
            horizontal,
            vertical,
        }
    }
}

/// One aircraft's view of a predicted conflict.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictPair {
    pub own: usize,
    pub other: usize,
    pub own_id: String,
    pub other_id: String,
    pub tcpa_s: f64,
    pub tin_s: f64,
    pub tout_s: f64,
    /// Own aircraft position projected along its current track to CPA
    pub cpa_lat: f64,
    pub cpa_lon: f64,
    pub cpa_alt_m: f64,
    /// Whether the pair is inside the protected zone right now
    pub los: bool,
}

/// Instantaneous loss of separation between two aircraft.
#[derive(Debug, Clone, Serialize)]
pub struct Intrusion {
    pub own: usize,
    pub other: usize,
    pub own_id: String,
    pub other_id: String,
    pub hdist_m: f64,
    pub vdist_m: f64,
    pub severity: Severity,
}

/// Result of one detection pass.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub geometry: Geometry,
    pub conflicts: Vec<ConflictPair>,
    pub intrusions: Vec<Intrusion>,
}

/// Instantaneous true horizontal and vertical separation of two aircraft.
pub fn true_separation(traffic: &Traffic, a: usize, b: usize) -> (f64, f64) {
    let hdist = haversine_distance(traffic.lat[a], traffic.lon[a], traffic.lat[b], traffic.lon[b]);
    let vdist = (traffic.alt_m[a] - traffic.alt_m[b]).abs();
    (hdist, vdist)
}

/// Run state-based detection over all ordered pairs.
pub fn detect(traffic: &Traffic, rules: &SeparationRules, noise: &mut NoiseModel) -> Detection {
    let n = traffic.len();
    let mut detection = Detection {
        geometry: Geometry::new(n),
        ..Detection::default()
    };
    if n == 0 {
        return detection;
    }

    let perceived = &traffic.surveillance;
    let r2 = rules.rpz_m * rules.rpz_m;
    let dh = rules.hpz_m;

    // Perceived altitude of every aircraft, with one error draw per aircraft.
    let perceived_alt: Vec<f64> = perceived
        .alt_m
        .iter()
        .map(|alt| alt + noise.altitude_error())
        .collect();

    for own in 0..n {
        let (u_own, v_own) = track_components(traffic.gs_mps[own], traffic.trk_deg[own]);

        for other in 0..n {
            let is_self = own == other;

            // Horizontal ---------------------------------------------------
            let (mut qdr, mut dist) = qdrdist(
                traffic.lat[own],
                traffic.lon[own],
                perceived.lat[other],
                perceived.lon[other],
            );
            qdr += noise.bearing_error();
            dist += noise.distance_error();
            if is_self {
                dist += SELF_PAIR_SENTINEL;
            }

            let qdr_rad = qdr.to_radians();
            // Position of other relative to own
            let dx = dist * qdr_rad.sin();
            let dy = dist * qdr_rad.cos();

            // Velocity of other relative to own
            let (u_other, v_other) =
                track_components(perceived.gs_mps[other], perceived.trk_deg[other]);
            let du = u_other - u_own;
            let dv = v_other - v_own;

            let mut dv2 = du * du + dv * dv;
            if dv2.abs() < MIN_DENOMINATOR {
                dv2 = MIN_DENOMINATOR;
            }
            let vrel = dv2.sqrt();

            let mut tcpa = -(du * dx + dv * dy) / dv2;
            if is_self {
                tcpa += SELF_PAIR_SENTINEL;
            }

            let dcpa2 = dist * dist - tcpa * tcpa * dv2;
            let horizontal_conflict = dcpa2 < r2;

            let dtin_hor = (r2 - dcpa2).max(0.0).sqrt() / vrel;
            let (tin_hor, tout_hor) = if horizontal_conflict {
                (tcpa - dtin_hor, tcpa + dtin_hor)
            } else {
                (NO_CONFLICT_TIME, -NO_CONFLICT_TIME)
            };

            // Vertical -----------------------------------------------------
            let dalt = perceived_alt[other] - traffic.alt_m[own];
            let mut dvs = perceived.vs_mps[other] - traffic.vs_mps[own];
            if dvs.abs() < MIN_DENOMINATOR {
                dvs = MIN_DENOMINATOR;
            }
            let tcross_hi = (dalt + dh) / -dvs;
            let tcross_lo = (dalt - dh) / -dvs;
            let tin_ver = tcross_hi.min(tcross_lo);
            let tout_ver = tcross_hi.max(tcross_lo);

            // Combined -----------------------------------------------------
            let tin = tin_ver.max(tin_hor);
            let tout = tout_ver.min(tout_hor);

            let geometry = &mut detection.geometry;
            geometry.qdr_deg.set(own, other, qdr);
            geometry.dist_m.set(own, other, dist);
            geometry.tcpa_s.set(own, other, tcpa);
            geometry.tin_s.set(own, other, tin);
            geometry.tout_s.set(own, other, tout);

            if is_self {
                continue;
            }

            // Loss of separation uses true state, independent of the window.
            let (hdist, vdist) = true_separation(traffic, own, other);
            let los = hdist < rules.rpz_m && vdist < dh;
            if los {
                detection.intrusions.push(Intrusion {
                    own,
                    other,
                    own_id: traffic.id[own].clone(),
                    other_id: traffic.id[other].clone(),
                    hdist_m: hdist,
                    vdist_m: vdist,
                    severity: Severity::from_separation(hdist, vdist, rules.rpz_m, dh),
                });
            }

            let is_conflict =
                horizontal_conflict && tin <= tout && tout > 0.0 && tin < rules.lookahead_s;
            if !is_conflict {
                continue;
            }

            let (cpa_lat, cpa_lon) = offset_by_bearing(
                traffic.lat[own],
                traffic.lon[own],
                tcpa * traffic.gs_mps[own],
                traffic.trk_deg[own].to_radians(),
            );
            detection.conflicts.push(ConflictPair {
                own,
                other,
                own_id: traffic.id[own].clone(),
                other_id: traffic.id[other].clone(),
                tcpa_s: tcpa,
                tin_s: tin,
                tout_s: tout,
                cpa_lat,
                cpa_lon,
                cpa_alt_m: traffic.alt_m[own] + tcpa * traffic.vs_mps[own],
                los,
            });
        }
    }

    detection
}
