//! Haversine travel estimates with a zone-table fallback.
//!
//! Uses great-circle distance scaled by a road-detour factor when both ends
//! carry coordinates. Otherwise falls back to the coarse zone grid, which is
//! always available.

use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, Employee, Location, Snapshot};
use crate::traits::TravelEstimator;
use crate::zones::{DEFAULT_SPEED_KMH, ZoneTable};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance is roughly 40% longer than the straight line.
const DEFAULT_ROAD_FACTOR: f64 = 1.4;

/// Optimizer accounting never books a transfer shorter than this.
pub const MIN_TRAVEL_MINUTES: u32 = 5;

/// Optimizer accounting never books a transfer longer than this.
pub const MAX_TRAVEL_MINUTES: u32 = 30;

/// Haversine/zone travel estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeoDistance {
    pub zones: ZoneTable,
    /// Assumed average urban speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier from great-circle to road distance.
    pub road_factor: f64,
}

impl Default for GeoDistance {
    fn default() -> Self {
        Self {
            zones: ZoneTable::default(),
            speed_kmh: DEFAULT_SPEED_KMH,
            road_factor: DEFAULT_ROAD_FACTOR,
        }
    }
}

impl GeoDistance {
    pub fn new(zones: ZoneTable) -> Self {
        Self {
            zones,
            ..Self::default()
        }
    }

    /// Estimator driving at the snapshot's configured average speed, if any.
    pub fn for_snapshot(snapshot: &Snapshot) -> Self {
        let speed = snapshot
            .wage_settings
            .as_ref()
            .map(|settings| settings.avg_speed)
            .filter(|speed| speed.is_finite() && *speed > 0.0);

        match speed {
            Some(speed_kmh) => Self {
                speed_kmh,
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    /// Calculate haversine distance between two points in kilometers.
    pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
        let (lat1, lng1) = from.as_tuple();
        let (lat2, lng2) = to.as_tuple();

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Road distance between two coordinate pairs.
    fn road_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        Self::haversine_km(from, to) * self.road_factor
    }

    /// Convert distance in km to whole travel minutes.
    fn km_to_minutes(&self, km: f64) -> u32 {
        let minutes = (km / self.speed_kmh * 60.0).round();
        if minutes.is_finite() && minutes > 0.0 {
            minutes as u32
        } else {
            0
        }
    }

    fn clamp_minutes(minutes: u32) -> u32 {
        minutes.clamp(MIN_TRAVEL_MINUTES, MAX_TRAVEL_MINUTES)
    }
}

impl TravelEstimator for GeoDistance {
    fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    fn distance_km(&self, from: &Location, to: &Location) -> f64 {
        match (from.coordinates, to.coordinates) {
            (Some(a), Some(b)) => self.road_km(a, b),
            _ => self.zones.distance(&from.zone, &to.zone),
        }
    }

    fn travel_minutes(&self, from: &Location, to: &Location) -> u32 {
        Self::clamp_minutes(self.km_to_minutes(self.distance_km(from, to)))
    }

    fn home_travel_minutes(&self, employee: &Employee, location: &Location) -> u32 {
        if let (Some(home), Some(target)) = (employee.coordinates, location.coordinates) {
            return self
                .km_to_minutes(self.road_km(home, target))
                .max(MIN_TRAVEL_MINUTES);
        }

        match employee.home_zone.as_deref() {
            Some(home_zone) if !home_zone.is_empty() && !location.zone.is_empty() => {
                let km = self.zones.distance(home_zone, &location.zone);
                Self::clamp_minutes(self.km_to_minutes(km))
            }
            _ => 0,
        }
    }
}
