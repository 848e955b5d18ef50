//! Seams between the optimizer and its travel estimates.
//!
//! The optimizer is generic over [`TravelEstimator`] so callers can swap the
//! built-in haversine/zone model for a road-network backed one.

use crate::model::{Employee, Location};
use crate::zones::{DEFAULT_DISTANCE_KM, ZoneTable};

/// Travel time booked when either end of a leg has no known location.
pub const UNRESOLVED_TRAVEL_MINUTES: u32 = 15;

/// Provides distance and travel-time estimates between locations.
pub trait TravelEstimator {
    /// Zone table backing coarse estimates.
    fn zones(&self) -> &ZoneTable;

    /// Road distance in km between two locations.
    fn distance_km(&self, from: &Location, to: &Location) -> f64;

    /// Travel time in minutes between two locations.
    fn travel_minutes(&self, from: &Location, to: &Location) -> u32;

    /// Travel time from an employee's home to a location.
    ///
    /// Returns 0 when neither coordinates nor zones allow an estimate; callers
    /// must treat that as "unknown", not as a free trip.
    fn home_travel_minutes(&self, employee: &Employee, location: &Location) -> u32;

    /// Coarse distance in km between two zones.
    fn zone_distance(&self, from: &str, to: &str) -> f64 {
        self.zones().distance(from, to)
    }

    /// Distance of a leg whose ends may be unresolvable.
    fn leg_km(&self, from: Option<&Location>, to: Option<&Location>) -> f64 {
        match (from, to) {
            (Some(from), Some(to)) => self.distance_km(from, to),
            _ => DEFAULT_DISTANCE_KM,
        }
    }

    /// Travel time of a leg whose ends may be unresolvable.
    fn leg_minutes(&self, from: Option<&Location>, to: Option<&Location>) -> u32 {
        match (from, to) {
            (Some(from), Some(to)) => self.travel_minutes(from, to),
            _ => UNRESOLVED_TRAVEL_MINUTES,
        }
    }
}
