//! Pre-defined traffic scenarios.

use super::route::{Route, Waypoint};
use asas_core::spatial::{offset_by_bearing, FT, KTS, NM};
use asas_core::{AircraftState, Area, AreaShape, AreaError};

/// A named scenario: aircraft with routes plus the zones to define.
pub struct Scenario {
    pub name: String,
    pub aircraft: Vec<(AircraftState, Route)>,
    pub zones: Vec<Area>,
}

/// Aircraft starting `offset_m` from the center on `from_deg`, flying
/// through the center to the opposite side.
fn through_center(
    id: &str,
    center_lat: f64,
    center_lon: f64,
    offset_m: f64,
    from_deg: f64,
    alt_m: f64,
    gs_mps: f64,
) -> (AircraftState, Route) {
    let (start_lat, start_lon) =
        offset_by_bearing(center_lat, center_lon, offset_m, from_deg.to_radians());
    let (end_lat, end_lon) = offset_by_bearing(
        center_lat,
        center_lon,
        offset_m,
        (from_deg + 180.0).to_radians(),
    );
    let track = (from_deg + 180.0).rem_euclid(360.0);

    let state = AircraftState::new(id, start_lat, start_lon, alt_m).with_velocity(track, gs_mps, 0.0);
    let route = Route::new(vec![
        Waypoint::new(format!("{id}-MID"), center_lat, center_lon),
        Waypoint::new(format!("{id}-EXIT"), end_lat, end_lon),
    ]);
    (state, route)
}

/// Two aircraft on reciprocal tracks through the center.
pub fn create_head_on_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    let offset_m = 20.0 * NM;
    Scenario {
        name: "head_on".to_string(),
        aircraft: vec![
            through_center("AC001", center_lat, center_lon, offset_m, 270.0, 10_000.0 * FT, 250.0 * KTS),
            through_center("AC002", center_lat, center_lon, offset_m, 90.0, 10_000.0 * FT, 250.0 * KTS),
        ],
        zones: Vec::new(),
    }
}

/// Two aircraft crossing at right angles over the center.
///
/// - AC001: flying west to east through center
/// - AC002: flying south to north through center
pub fn create_crossing_scenario(center_lat: f64, center_lon: f64) -> Scenario {
    let offset_m = 20.0 * NM;
    Scenario {
        name: "crossing".to_string(),
        aircraft: vec![
            through_center("AC001", center_lat, center_lon, offset_m, 270.0, 8000.0 * FT, 250.0 * KTS),
            through_center("AC002", center_lat, center_lon, offset_m, 180.0, 8000.0 * FT, 250.0 * KTS),
        ],
        zones: Vec::new(),
    }
}

/// Arrival streams converging on a central point through six rings.
///
/// Odd identifiers are arrivals. Rings are 10 nmi wide, the inner circle
/// has a 5 nmi radius.
pub fn create_converging_scenario(center_lat: f64, center_lon: f64) -> Result<Scenario, AreaError> {
    let rings = 6u8;
    let mut zones = Vec::with_capacity(rings as usize + 1);
    for ring in 1..=rings {
        let radius_m = (5.0 + 10.0 * (rings + 1 - ring) as f64) * NM;
        zones.push(Area::new(
            format!("ZONE{ring}"),
            AreaShape::Circle {
                lat: center_lat,
                lon: center_lon,
                radius_m,
            },
        )?);
    }
    zones.push(Area::new(
        "INNERCIRCLE",
        AreaShape::Circle {
            lat: center_lat,
            lon: center_lon,
            radius_m: 5.0 * NM,
        },
    )?);

    // Staggered entry distances put the streams in different rings.
    let streams: [(f64, f64); 4] = [(0.0, 60.0), (90.0, 42.0), (180.0, 55.0), (270.0, 38.0)];
    let aircraft = streams
        .iter()
        .enumerate()
        .map(|(i, &(from_deg, dist_nm))| {
            let id = format!("AC{:03}", 2 * i + 1);
            let (lat, lon) =
                offset_by_bearing(center_lat, center_lon, dist_nm * NM, from_deg.to_radians());
            let track = (from_deg + 180.0).rem_euclid(360.0);
            let state =
                AircraftState::new(&id, lat, lon, 6000.0 * FT).with_velocity(track, 220.0 * KTS, 0.0);
            let route = Route::new(vec![Waypoint::new(
                format!("{id}-IAF"),
                center_lat,
                center_lon,
            )]);
            (state, route)
        })
        .collect();

    Ok(Scenario {
        name: "converging".to_string(),
        aircraft,
        zones,
    })
}
