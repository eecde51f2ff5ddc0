// Geofence rule - decides whether a coordinate falls inside the metropolitan
// area the group accepts listings from.
//
// Pure numeric geodesy, no I/O.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair as delivered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// The geographic region listings must be located in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_km: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        // Riyadh metropolitan area.
        Self {
            center_lat: 24.7136,
            center_lon: 46.6753,
            radius_km: 70.0,
        }
    }
}

impl RegionConfig {
    /// True iff `point` lies within `radius_km` of the region center.
    pub fn within_region(&self, point: Coordinate) -> bool {
        let center = Coordinate {
            lat: self.center_lat,
            lon: self.center_lon,
        };
        haversine_km(center, point) <= self.radius_km
    }
}

/// Great-circle distance between two points in kilometers, using the
/// haversine formula. Total over the whole coordinate domain, including
/// degenerate and antipodal pairs.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `h` a hair above 1.0 for antipodal points; clamp so
    // asin stays defined.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}
