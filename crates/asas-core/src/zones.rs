//! Named areas and the concentric zone classifier.
//!
//! Zones are numbered rings around a convergence point: ring 1 is the
//! outermost, higher numbers lie further in. The core area inside the
//! innermost ring overrides every ring.

use crate::error::AreaError;
use crate::models::Traffic;
use crate::rules::ZoneLayout;
use crate::spatial::haversine_distance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Zone index of an aircraft outside every ring.
pub const OUTSIDE_ZONES: u8 = 0;

/// Zone index of an aircraft inside the core area.
pub const CORE_ZONE: u8 = 11;

/// Horizontal footprint of an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AreaShape {
    /// Lat/lon aligned box between two corners
    Box {
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    },
    Circle {
        lat: f64,
        lon: f64,
        radius_m: f64,
    },
    /// Vertices as [lat, lon] pairs; closing the ring is optional
    Polygon { vertices: Vec<[f64; 2]> },
}

/// A named area with an optional altitude band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
    pub shape: AreaShape,
    /// Lower altitude limit in meters (floor)
    #[serde(default = "neg_infinity")]
    pub bottom_m: f64,
    /// Upper altitude limit in meters (ceiling)
    #[serde(default = "infinity")]
    pub top_m: f64,
}

fn neg_infinity() -> f64 {
    f64::NEG_INFINITY
}

fn infinity() -> f64 {
    f64::INFINITY
}

impl Area {
    /// Area without altitude limits.
    pub fn new(name: impl Into<String>, shape: AreaShape) -> Result<Self, AreaError> {
        Self::with_band(name, shape, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Area limited to altitudes between `bottom_m` and `top_m`.
    pub fn with_band(
        name: impl Into<String>,
        shape: AreaShape,
        bottom_m: f64,
        top_m: f64,
    ) -> Result<Self, AreaError> {
        let area = Self {
            name: name.into(),
            shape,
            bottom_m,
            top_m,
        };
        area.validate()?;
        Ok(area)
    }

    /// Check the definition is usable.
    pub fn validate(&self) -> Result<(), AreaError> {
        if self.bottom_m > self.top_m {
            return Err(AreaError::InvertedBand {
                name: self.name.clone(),
                bottom_m: self.bottom_m,
                top_m: self.top_m,
            });
        }
        match &self.shape {
            AreaShape::Circle { radius_m, .. } if !(*radius_m > 0.0) => Err(AreaError::BadRadius {
                name: self.name.clone(),
                radius_m: *radius_m,
            }),
            AreaShape::Polygon { vertices } if vertices.len() < 3 => {
                Err(AreaError::TooFewVertices {
                    name: self.name.clone(),
                    got: vertices.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Check if a point is inside this area.
    pub fn contains(&self, lat: f64, lon: f64, alt_m: f64) -> bool {
        // Check altitude bounds first
        if alt_m < self.bottom_m || alt_m > self.top_m {
            return false;
        }

        match &self.shape {
            AreaShape::Box {
                lat1,
                lon1,
                lat2,
                lon2,
            } => {
                lat >= lat1.min(*lat2)
                    && lat <= lat1.max(*lat2)
                    && lon >= lon1.min(*lon2)
                    && lon <= lon1.max(*lon2)
            }
            AreaShape::Circle {
                lat: clat,
                lon: clon,
                radius_m,
            } => haversine_distance(*clat, *clon, lat, lon) <= *radius_m,
            AreaShape::Polygon { vertices } => polygon_contains(vertices, lat, lon),
        }
    }
}

/// Ray casting: count intersections with polygon edges.
fn polygon_contains(polygon: &[[f64; 2]], lat: f64, lon: f64) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let yi = polygon[i][0];
        let xi = polygon[i][1];
        let yj = polygon[j][0];
        let xj = polygon[j][1];

        if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Registry of named areas, used for zone classification.
#[derive(Debug, Clone, Default)]
pub struct ZoneMap {
    layout: ZoneLayout,
    areas: HashMap<String, Area>,
}

impl ZoneMap {
    pub fn new(layout: ZoneLayout) -> Self {
        Self {
            layout,
            areas: HashMap::new(),
        }
    }

    /// Add or replace an area.
    pub fn define(&mut self, area: Area) -> Result<(), AreaError> {
        area.validate()?;
        self.areas.insert(area.name.clone(), area);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Area> {
        self.areas.remove(name)
    }

    pub fn contains_area(&self, name: &str) -> bool {
        self.areas.contains_key(name)
    }

    /// Whether a point lies in the named area. Unknown names never match.
    pub fn is_inside(&self, name: &str, lat: f64, lon: f64, alt_m: f64) -> bool {
        self.areas
            .get(name)
            .is_some_and(|area| area.contains(lat, lon, alt_m))
    }

    pub fn layout(&self) -> &ZoneLayout {
        &self.layout
    }

    /// Highest ring number that is actually defined, or 0 without rings.
    pub fn max_ring(&self) -> u8 {
        (1..=self.layout.rings)
            .rev()
            .find(|&ring| self.contains_area(&self.layout.ring_name(ring)))
            .unwrap_or(OUTSIDE_ZONES)
    }

    /// Zone index of a single position.
    pub fn zone_of(&self, lat: f64, lon: f64, alt_m: f64) -> u8 {
        if self.is_inside(&self.layout.core_name, lat, lon, alt_m) {
            return CORE_ZONE;
        }
        // Later rings are nested inside earlier ones, so the last match wins.
        (1..=self.layout.rings)
            .filter(|&ring| self.is_inside(&self.layout.ring_name(ring), lat, lon, alt_m))
            .last()
            .unwrap_or(OUTSIDE_ZONES)
    }

    /// Zone index of each aircraft in `indices`.
    pub fn classify(&self, traffic: &Traffic, indices: &[usize]) -> Vec<u8> {
        indices
            .iter()
            .map(|&idx| self.zone_of(traffic.lat[idx], traffic.lon[idx], traffic.alt_m[idx]))
            .collect()
    }

    /// Number of rings between two zones.
    ///
    /// Ring 1 and the highest defined ring are adjacent: the numbering wraps
    /// around the convergence point.
    pub fn zone_difference(&self, a: u8, b: u8) -> u8 {
        let max_ring = self.max_ring();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == 1 && hi == max_ring && lo != hi {
            return 1;
        }
        hi - lo
    }
}
