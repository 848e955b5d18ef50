//! Plain data records consumed by the optimizer.
//!
//! A [`Snapshot`] is loaded fresh for every optimization request by the
//! persistence layer. The optimizer only reads it; results are returned as a
//! separate delta (see [`crate::report`]).

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::cost::WageSettings;

/// Zone name used when a visit's zone cannot be resolved.
pub const UNKNOWN_ZONE: &str = "unbekannt";

/// Geographic coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// Recurrence cadence of a visit. Only affects workload accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rhythm {
    #[default]
    Weekly,
    Biweekly,
    #[serde(alias = "every3weeks")]
    ThreeWeekly,
    #[serde(alias = "every4weeks")]
    FourWeekly,
}

impl Rhythm {
    /// Recurrence period in weeks.
    pub fn period_weeks(&self) -> u32 {
        match self {
            Rhythm::Weekly => 1,
            Rhythm::Biweekly => 2,
            Rhythm::ThreeWeekly => 3,
            Rhythm::FourWeekly => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Car,
    Public,
}

/// A scheduled visit ("event") at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub day_index: u8,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Zone stored on the visit itself; the location's zone takes precedence.
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub location_ref: Option<String>,
    #[serde(default)]
    pub service_types: Vec<String>,
    #[serde(default)]
    pub rhythm: Rhythm,
    #[serde(default)]
    pub tour_ref: Option<String>,
    /// Synthetic transit leg between two real visits. Never optimized.
    #[serde(default)]
    pub is_travel: bool,
}

impl Visit {
    /// Service duration in minutes. Inverted windows count as zero.
    pub fn duration(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Duration weighted by rhythm, used for weekly workload accounting.
    pub fn effective_minutes(&self) -> f64 {
        self.duration() as f64 / self.rhythm.period_weeks() as f64
    }

    /// Half-open `[start, end)` overlap on the same day.
    pub fn overlaps(&self, other: &Visit) -> bool {
        self.day_index == other.day_index
            && self.start.minutes() < other.end.minutes()
            && other.start.minutes() < self.end.minutes()
    }
}

/// A pool item: the place a visit happens at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub zone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub service_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub employee_ref: Option<String>,
    #[serde(default)]
    pub weekly_hours_limit: Option<f64>,
    #[serde(default)]
    pub preferred_types: Option<Vec<String>>,
}

impl Tour {
    /// Preferred service types, if the tour declares a non-empty set.
    pub fn preferred_types(&self) -> Option<&[String]> {
        self.preferred_types
            .as_deref()
            .filter(|types| !types.is_empty())
    }
}

fn default_weekly_hours() -> f64 {
    40.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub home_zone: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub transport_mode: TransportMode,
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours: f64,
    #[serde(default)]
    pub wage_group_ref: Option<String>,
}

impl Employee {
    pub fn target_minutes(&self) -> f64 {
        self.weekly_hours * 60.0
    }
}

/// Read-only input bundle for one optimization request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub visits: Vec<Visit>,
    #[serde(default)]
    pub tours: Vec<Tour>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub wage_settings: Option<WageSettings>,
}

impl Snapshot {
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    pub fn tour(&self, id: &str) -> Option<&Tour> {
        self.tours.iter().find(|tour| tour.id == id)
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    pub fn tour_employee(&self, tour: &Tour) -> Option<&Employee> {
        tour.employee_ref.as_deref().and_then(|id| self.employee(id))
    }

    pub fn visit_location(&self, visit: &Visit) -> Option<&Location> {
        visit.location_ref.as_deref().and_then(|id| self.location(id))
    }

    /// Zone of a visit: its location's zone, then its own, then [`UNKNOWN_ZONE`].
    pub fn visit_zone<'a>(&'a self, visit: &'a Visit) -> &'a str {
        self.visit_location(visit)
            .map(|location| location.zone.as_str())
            .or(visit.zone.as_deref())
            .filter(|zone| !zone.is_empty())
            .unwrap_or(UNKNOWN_ZONE)
    }

    /// Service types a visit can be matched on: the location's, else the visit's own tags.
    pub fn visit_types<'a>(&'a self, visit: &'a Visit) -> &'a [String] {
        match self.visit_location(visit) {
            Some(location) => &location.service_types,
            None => &visit.service_types,
        }
    }

    /// Real (non-travel) visits.
    pub fn real_visits(&self) -> impl Iterator<Item = &Visit> {
        self.visits.iter().filter(|visit| !visit.is_travel)
    }
}
