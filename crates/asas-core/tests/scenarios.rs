//! End-to-end detection and resolution scenarios.

use asas_core::rules::SurveillanceNoise;
use asas_core::spatial::{offset_by_bearing, FT, KTS, NM};
use asas_core::{
    detect, AircraftState, Area, AreaShape, ResumeDirective, ResumeOutcome, SeparationEngine,
    SeparationRules, Traffic,
};
use asas_core::noise::NoiseModel;
use asas_core::PairKey;

fn rules() -> SeparationRules {
    SeparationRules {
        rpz_m: 5.0 * NM,
        hpz_m: 1000.0 * FT,
        lookahead_s: 300.0,
        ..SeparationRules::default()
    }
}

/// Two aircraft on reciprocal tracks along the equator, 200 kt each.
fn reciprocal(separation_nm: f64) -> Traffic {
    let half = separation_nm * NM / 2.0;
    let (lat1, lon1) = offset_by_bearing(0.0, 0.0, half, 270f64.to_radians());
    let (lat2, lon2) = offset_by_bearing(0.0, 0.0, half, 90f64.to_radians());
    let mut traf = Traffic::new();
    traf.create(
        AircraftState::new("AC101", lat1, lon1, 10_000.0 * FT).with_velocity(90.0, 200.0 * KTS, 0.0),
        0.0,
    );
    traf.create(
        AircraftState::new("AC102", lat2, lon2, 10_000.0 * FT).with_velocity(270.0, 200.0 * KTS, 0.0),
        0.0,
    );
    traf
}

/// Aircraft converging on (0, 0) at right angles, `dist_nm` out.
fn crossing(dist_nm: f64) -> Traffic {
    let (lat1, lon1) = offset_by_bearing(0.0, 0.0, dist_nm * NM, 180f64.to_radians());
    let (lat2, lon2) = offset_by_bearing(0.0, 0.0, dist_nm * NM, 270f64.to_radians());
    let mut traf = Traffic::new();
    traf.create(
        AircraftState::new("AC201", lat1, lon1, 6000.0 * FT).with_velocity(0.0, 250.0 * KTS, 0.0),
        0.0,
    );
    traf.create(
        AircraftState::new("AC202", lat2, lon2, 6000.0 * FT).with_velocity(90.0, 250.0 * KTS, 0.0),
        0.0,
    );
    traf
}

#[test]
fn scenario_a_reciprocal_tracks_conflict_within_lookahead() {
    let mut traf = reciprocal(10.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();
    let report = engine.tick(&mut traf, 0.0);

    assert_eq!(report.conflicts.len(), 2);
    for conflict in &report.conflicts {
        assert!(conflict.tin_s < conflict.tout_s);
        assert!(conflict.tin_s < 300.0 && conflict.tout_s > 0.0);
        assert!(!conflict.los);
    }
    assert_eq!(report.conflict_count, 1);
    assert_eq!(report.intrusion_count, 0);
    assert_eq!(traf.active, vec![true, true]);
}

#[test]
fn scenario_b_wide_separation_enters_after_lookahead() {
    let mut traf = reciprocal(50.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();
    let report = engine.tick(&mut traf, 0.0);

    assert!(report.conflicts.is_empty());
    assert_eq!(report.conflict_count, 0);
    let detection = detect(&traf, &rules(), &mut NoiseModel::disabled());
    let tin = detection.geometry.tin_s.get(0, 1).unwrap();
    assert!(tin >= 300.0, "tin {tin}");
    assert_eq!(traf.active, vec![false, false]);
}

#[test]
fn scenario_c_core_zone_suppresses_guidance() {
    let mut traf = reciprocal(10.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();
    engine
        .define_zone(
            Area::new(
                "INNERCIRCLE",
                AreaShape::Circle {
                    lat: traf.lat[0],
                    lon: traf.lon[0],
                    radius_m: 1.0 * NM,
                },
            )
            .unwrap(),
        )
        .unwrap();

    let report = engine.tick(&mut traf, 0.0);
    assert_eq!(report.conflicts.len(), 2);
    assert_eq!(traf.active, vec![false, false]);
    assert!(matches!(
        report.resume.decisions[0].outcome,
        ResumeOutcome::Suppressed { .. }
    ));
    assert!(report.resume.directives.is_empty());
    assert!(engine
        .registry()
        .is_guided(&PairKey::new("AC101", "AC102")));
}

#[test]
fn scenario_d_passed_cpa_resolves_with_one_directive_each() {
    let mut traf = crossing(10.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();

    let report = engine.tick(&mut traf, 0.0);
    assert_eq!(report.conflicts.len(), 2);
    assert_eq!(traf.active, vec![true, true]);

    // Both aircraft 10 nmi past the crossing point, still on their tracks.
    let (lat1, lon1) = offset_by_bearing(0.0, 0.0, 10.0 * NM, 0.0);
    let (lat2, lon2) = offset_by_bearing(0.0, 0.0, 10.0 * NM, 90f64.to_radians());
    let alt = traf.alt_m[0];
    traf.set_position(0, lat1, lon1, alt);
    traf.set_position(1, lat2, lon2, alt);
    traf.sync_surveillance();

    let report = engine.tick(&mut traf, 150.0);
    assert!(report.conflicts.is_empty());
    assert_eq!(report.resume.decisions.len(), 1);
    assert_eq!(report.resume.decisions[0].outcome, ResumeOutcome::Resolved);
    assert_eq!(
        report.resume.directives,
        vec![
            ResumeDirective { aircraft_id: "AC201".into() },
            ResumeDirective { aircraft_id: "AC202".into() },
        ]
    );
    assert_eq!(traf.active, vec![false, false]);
    assert!(engine.registry().guidance_pairs().is_empty());
}

#[test]
fn scenario_e_removed_aircraft_releases_pair_same_tick() {
    let mut traf = reciprocal(10.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();
    engine.tick(&mut traf, 0.0);

    let events = engine.retire_aircraft(&traf, &["AC101"], 1.0);
    assert_eq!(events.len(), 1);
    traf.delete(0);

    let report = engine.tick(&mut traf, 1.0);
    assert_eq!(report.resume.decisions[0].outcome, ResumeOutcome::Orphaned);
    assert_eq!(
        report.resume.directives,
        vec![ResumeDirective { aircraft_id: "AC102".into() }]
    );
    assert!(engine.registry().guidance_pairs().is_empty());
    assert_eq!(traf.active, vec![false]);
}

#[test]
fn self_pairs_never_conflict() {
    let mut traf = crossing(3.0);
    // Noise on every channel still leaves the diagonal alone.
    let mut noisy = rules();
    noisy.noise = SurveillanceNoise {
        enabled: true,
        bearing_std_deg: 2.0,
        distance_std_m: 200.0,
        altitude_std_m: 30.0,
        seed: Some(42),
    };
    let mut engine = SeparationEngine::new(noisy).unwrap();
    for step in 0..5 {
        let report = engine.tick(&mut traf, step as f64);
        assert!(report.conflicts.iter().all(|c| c.own != c.other));
        assert!(report.intrusions.iter().all(|i| i.own != i.other));
    }
}

#[test]
fn pair_classification_is_symmetric_without_noise() {
    let mut traf = Traffic::new();
    let specs = [
        ("AC301", 0.00, 0.00, 90.0, 220.0, 0.0),
        ("AC302", 0.02, 0.15, 250.0, 240.0, 0.0),
        ("AC303", -0.10, 0.05, 10.0, 180.0, 5.0),
        ("AC304", 0.30, 0.30, 200.0, 260.0, -5.0),
        ("AC305", 0.05, -0.20, 80.0, 200.0, 0.0),
    ];
    for (id, lat, lon, trk, gs_kt, vs) in specs {
        traf.create(
            AircraftState::new(id, lat, lon, 8000.0 * FT).with_velocity(trk, gs_kt * KTS, vs),
            0.0,
        );
    }

    let detection = detect(&traf, &rules(), &mut NoiseModel::disabled());
    let flagged = |i: usize, j: usize| detection.conflicts.iter().any(|c| c.own == i && c.other == j);
    for i in 0..traf.len() {
        for j in 0..traf.len() {
            assert_eq!(flagged(i, j), flagged(j, i), "pair ({i}, {j})");
            if i != j && flagged(i, j) {
                let a = detection.geometry.tcpa_s.get(i, j).unwrap();
                let b = detection.geometry.tcpa_s.get(j, i).unwrap();
                assert!((a - b).abs() < 0.5, "tcpa {a} vs {b}");
            }
        }
    }
    assert!(!detection.conflicts.is_empty());
}

#[test]
fn los_follows_instantaneous_state_not_window() {
    // Already 2 nmi apart and diverging: window opened in the past.
    let (lat, lon) = offset_by_bearing(0.0, 0.0, 2.0 * NM, 90f64.to_radians());
    let mut traf = Traffic::new();
    traf.create(
        AircraftState::new("AC401", 0.0, 0.0, 5000.0).with_velocity(270.0, 200.0 * KTS, 0.0),
        0.0,
    );
    traf.create(
        AircraftState::new("AC402", lat, lon, 5100.0).with_velocity(90.0, 200.0 * KTS, 0.0),
        0.0,
    );

    let detection = detect(&traf, &rules(), &mut NoiseModel::disabled());
    assert_eq!(detection.intrusions.len(), 2);
    assert!(detection.geometry.tin_s.get(0, 1).unwrap() < 0.0);

    // Scenario A is a conflict with a future window but no intrusion.
    let detection = detect(&reciprocal(10.0), &rules(), &mut NoiseModel::disabled());
    assert!(!detection.conflicts.is_empty());
    assert!(detection.intrusions.is_empty());
}

#[test]
fn experiment_window_limits_statistics_sets() {
    let mut traf = reciprocal(10.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();
    engine.tick(&mut traf, 100.0);
    assert!(engine.registry().experiment_conflicts().is_empty());
    engine.tick(&mut traf, 2500.0);
    assert_eq!(engine.registry().experiment_conflicts().len(), 1);
    assert_eq!(engine.registry().all_conflicts().len(), 1);
}

#[test]
fn experiment_window_limits_intrusion_sets() {
    let mut traf = Traffic::new();
    traf.create(AircraftState::new("AC501", 0.0, 0.0, 3000.0), 0.0);
    traf.create(AircraftState::new("AC502", 0.0, 0.01, 3000.0), 0.0);
    let mut engine = SeparationEngine::new(rules()).unwrap();

    engine.tick(&mut traf, 100.0);
    let key = PairKey::new("AC501", "AC502");
    assert!(engine.registry().all_intrusions().contains(&key));
    assert!(engine.registry().experiment_intrusions().is_empty());

    engine.tick(&mut traf, 2500.0);
    assert!(engine.registry().experiment_intrusions().contains(&key));
    assert_eq!(engine.registry().intrusion_count(), 1);
}

#[test]
fn heavy_surveillance_noise_never_guides_non_conflicts() {
    // Close pair in true LOS; range errors far larger than the radius.
    let mut traf = Traffic::new();
    traf.create(AircraftState::new("AC601", 0.0, 0.0, 3000.0), 0.0);
    traf.create(AircraftState::new("AC602", 0.0, 0.01, 3000.0), 0.0);
    let mut noisy = rules();
    noisy.noise = SurveillanceNoise {
        enabled: true,
        distance_std_m: 1.0e6,
        seed: Some(3),
        ..SurveillanceNoise::default()
    };
    let mut engine = SeparationEngine::new(noisy).unwrap();

    let mut flagged = std::collections::BTreeSet::new();
    for step in 0..20 {
        let report = engine.tick(&mut traf, step as f64);
        for c in &report.conflicts {
            flagged.insert(PairKey::new(&c.own_id, &c.other_id));
        }
        assert_eq!(report.intrusions.len(), 2);
        assert_eq!(report.conflict_count as usize, flagged.len());
        for pair in engine.registry().guidance_pairs() {
            assert!(flagged.contains(&pair));
        }
        let guided = engine.registry().is_guided(&PairKey::new("AC601", "AC602"));
        assert_eq!(traf.active.iter().any(|&a| a), guided);
    }
    assert_eq!(engine.registry().intrusion_count(), 1);
}
