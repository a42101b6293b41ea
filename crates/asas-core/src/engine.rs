//! Per-tick separation-assurance pipeline.
//!
//! detection -> registry -> resume decision -> event records. The engine
//! owns the state that persists between ticks; the host passes its traffic
//! in by reference on every call.

use crate::detection::{detect, ConflictPair, Geometry, Intrusion};
use crate::error::{AreaError, ConfigError};
use crate::events::{build_events, ConflictEvent};
use crate::models::Traffic;
use crate::noise::NoiseModel;
use crate::registry::{ConflictRegistry, PairKey};
use crate::resume::{resume_navigation, FlowClassifier, ResumeReport, SuffixParity};
use crate::rules::SeparationRules;
use crate::zones::{Area, ZoneMap};
use tracing::{debug, info};

/// Everything one tick produced.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub simt: f64,
    /// One entry per aircraft that sees a conflict
    pub conflicts: Vec<ConflictPair>,
    /// One entry per aircraft currently in loss of separation
    pub intrusions: Vec<Intrusion>,
    pub events: Vec<ConflictEvent>,
    pub resume: ResumeReport,
    pub conflict_count: u64,
    pub intrusion_count: u64,
}

/// Conflict detection and resolution state for one simulation.
pub struct SeparationEngine {
    rules: SeparationRules,
    zones: ZoneMap,
    registry: ConflictRegistry,
    noise: NoiseModel,
    classifier: Box<dyn FlowClassifier>,
    /// Geometry of the latest tick, used for retirement records
    geometry: Geometry,
}

impl SeparationEngine {
    /// Validate `rules` and build an engine with no zones defined.
    pub fn new(rules: SeparationRules) -> Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Self {
            zones: ZoneMap::new(rules.zones.clone()),
            noise: NoiseModel::new(&rules.noise),
            rules,
            registry: ConflictRegistry::new(),
            classifier: Box::new(SuffixParity),
            geometry: Geometry::default(),
        })
    }

    /// Replace the arrival/departure classification.
    pub fn with_classifier(mut self, classifier: impl FlowClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn define_zone(&mut self, area: Area) -> Result<(), AreaError> {
        self.zones.define(area)
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    pub fn registry(&self) -> &ConflictRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &SeparationRules {
        &self.rules
    }

    /// Run one detection and decision pass at simulation time `simt`.
    pub fn tick(&mut self, traffic: &mut Traffic, simt: f64) -> TickReport {
        let detection = detect(traffic, &self.rules, &mut self.noise);
        let in_experiment = self.rules.experiment_window.contains(simt);

        self.registry.begin_tick();
        for conflict in &detection.conflicts {
            let key = PairKey::new(&conflict.own_id, &conflict.other_id);
            if self.registry.register(&key, None, in_experiment).first_conflict {
                info!(pair = %key, tin = conflict.tin_s, tcpa = conflict.tcpa_s, "new conflict");
            }
        }
        for intrusion in &detection.intrusions {
            let key = PairKey::new(&intrusion.own_id, &intrusion.other_id);
            // LOS is judged apart from the conflict window; it never adds guidance.
            if self
                .registry
                .register_intrusion(&key, intrusion.severity, in_experiment)
            {
                info!(
                    pair = %key,
                    severity = intrusion.severity.combined,
                    "new loss of separation"
                );
            }
        }

        let resume = resume_navigation(
            traffic,
            &mut self.registry,
            &self.zones,
            self.classifier.as_ref(),
            &self.rules,
        );

        let transitions = self.registry.diff_against_previous();
        let events = build_events(
            &transitions,
            traffic,
            &detection.geometry,
            &self.registry,
            simt,
        );

        debug!(
            simt,
            conflicts = self.registry.current_conflicts().len(),
            intrusions = self.registry.current_intrusions().len(),
            guided = self.registry.guidance_pairs().len(),
            "detection pass"
        );

        self.geometry = detection.geometry;
        TickReport {
            simt,
            conflicts: detection.conflicts,
            intrusions: detection.intrusions,
            events,
            resume,
            conflict_count: self.registry.conflict_count(),
            intrusion_count: self.registry.intrusion_count(),
        }
    }

    /// Close every current conflict and intrusion of aircraft about to be
    /// deleted, while their state is still in `traffic`.
    ///
    /// Call before the host removes the aircraft.
    pub fn retire_aircraft(&mut self, traffic: &Traffic, ids: &[&str], simt: f64) -> Vec<ConflictEvent> {
        for id in ids {
            self.registry.forget_aircraft(id);
        }
        let transitions = self.registry.diff_against_previous();
        build_events(&transitions, traffic, &self.geometry, &self.registry, simt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventAction, EventKind};
    use crate::models::AircraftState;

    #[test]
    fn invalid_rules_fail_fast() {
        let rules = SeparationRules {
            hpz_m: -1.0,
            ..SeparationRules::default()
        };
        assert!(SeparationEngine::new(rules).is_err());
    }

    #[test]
    fn empty_traffic_ticks_cleanly() {
        let mut engine = SeparationEngine::new(SeparationRules::default()).unwrap();
        let report = engine.tick(&mut Traffic::new(), 0.0);
        assert!(report.conflicts.is_empty());
        assert!(report.events.is_empty());
        assert_eq!(report.conflict_count, 0);
    }

    #[test]
    fn retirement_logs_deletion_with_snapshots() {
        let mut traf = Traffic::new();
        traf.create(AircraftState::new("AC01", 0.0, 0.0, 1000.0), 0.0);
        traf.create(AircraftState::new("AC02", 0.0, 0.001, 1000.0), 0.0);

        let mut engine = SeparationEngine::new(SeparationRules::default()).unwrap();
        let report = engine.tick(&mut traf, 1.0);
        assert_eq!(report.intrusion_count, 1);
        assert!(report
            .events
            .iter()
            .any(|e| e.kind == EventKind::Intrusion && e.action == EventAction::Created));

        let events = engine.retire_aircraft(&traf, &["AC02"], 2.0);
        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.action, EventAction::Deleted);
            let second = event.second.as_ref().unwrap();
            assert_eq!(second.id, "AC02");
            assert!(second.timing.is_some());
        }
        assert!(engine.registry().current_conflicts().is_empty());
    }

    #[test]
    fn intrusion_without_conflict_is_not_guided() {
        let mut traf = Traffic::new();
        traf.create(AircraftState::new("AC01", 0.0, 0.0, 1000.0), 0.0);
        traf.create(AircraftState::new("AC02", 0.0, 0.01, 1000.0), 0.0);
        // Surveillance places each aircraft far from where it really is.
        traf.surveillance.lat[0] = -5.0;
        traf.surveillance.lat[1] = 5.0;

        let mut engine = SeparationEngine::new(SeparationRules::default()).unwrap();
        let report = engine.tick(&mut traf, 1.0);

        assert!(report.conflicts.is_empty());
        assert_eq!(report.intrusions.len(), 2);
        assert_eq!(report.conflict_count, 0);
        assert_eq!(report.intrusion_count, 1);
        assert!(engine.registry().guidance_pairs().is_empty());
        assert!(engine.registry().current_conflicts().is_empty());
        assert_eq!(traf.active, vec![false, false]);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind, EventKind::Intrusion);
        assert_eq!(report.events[0].action, EventAction::Created);
        assert!(report.events[0].severity.is_some());
    }

    #[test]
    fn custom_classifier_is_used() {
        let engine = SeparationEngine::new(SeparationRules::default())
            .unwrap()
            .with_classifier(|id: &str| id.ends_with('A'));
        assert!(engine.classifier.is_arrival("KL1A"));
    }
}
