//! Test fixtures for tour-optimizer.
//!
//! Provides one location per Gelsenkirchen district plus builders for
//! visits, tours and employees.

#![allow(dead_code)]

use tour_optimizer::model::{Employee, Location, Rhythm, Snapshot, Tour, TransportMode, Visit};
use tour_optimizer::report::OptimizationReport;

/// Districts with a fixture location, id `loc-<district>`.
pub const DISTRICTS: &[&str] = &[
    "Bismarck",
    "Buer",
    "Erle",
    "Resse",
    "Rotthausen",
    "Schalke",
    "Ückendorf",
    "Außerhalb",
];

pub fn location_id(district: &str) -> String {
    format!("loc-{}", district.to_lowercase())
}

pub fn location(district: &str, service_types: &[&str]) -> Location {
    Location {
        id: location_id(district),
        title: format!("Klient {}", district),
        zone: district.to_string(),
        address: None,
        coordinates: None,
        service_types: service_types.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn gelsenkirchen_locations() -> Vec<Location> {
    DISTRICTS.iter().map(|district| location(district, &[])).collect()
}

/// Builder for test visits with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestVisit {
    visit: Visit,
}

impl TestVisit {
    /// A 30 minute weekly Monday visit at 08:00.
    pub fn new(id: &str) -> Self {
        Self {
            visit: Visit {
                id: id.to_string(),
                title: String::new(),
                day_index: 0,
                start: "08:00".parse().unwrap(),
                end: "08:30".parse().unwrap(),
                zone: None,
                location_ref: None,
                service_types: Vec::new(),
                rhythm: Rhythm::Weekly,
                tour_ref: None,
                is_travel: false,
            },
        }
    }

    pub fn day(mut self, day_index: u8) -> Self {
        self.visit.day_index = day_index;
        self
    }

    pub fn at(mut self, start: &str, end: &str) -> Self {
        self.visit.start = start.parse().unwrap();
        self.visit.end = end.parse().unwrap();
        self
    }

    /// Places the visit at the fixture location of `district`.
    pub fn in_district(mut self, district: &str) -> Self {
        self.visit.location_ref = Some(location_id(district));
        self
    }

    pub fn zone(mut self, zone: &str) -> Self {
        self.visit.zone = Some(zone.to_string());
        self
    }

    pub fn rhythm(mut self, rhythm: Rhythm) -> Self {
        self.visit.rhythm = rhythm;
        self
    }

    pub fn on_tour(mut self, tour_id: &str) -> Self {
        self.visit.tour_ref = Some(tour_id.to_string());
        self
    }

    pub fn tagged(mut self, service_type: &str) -> Self {
        self.visit.service_types.push(service_type.to_string());
        self
    }

    pub fn travel(mut self) -> Self {
        self.visit.is_travel = true;
        self
    }

    pub fn build(self) -> Visit {
        self.visit
    }
}

/// Builder for test tours.
#[derive(Clone, Debug)]
pub struct TestTour {
    tour: Tour,
}

impl TestTour {
    pub fn new(id: &str) -> Self {
        Self {
            tour: Tour {
                id: id.to_string(),
                name: format!("Tour {}", id),
                employee_ref: None,
                weekly_hours_limit: None,
                preferred_types: None,
            },
        }
    }

    pub fn employee(mut self, employee_id: &str) -> Self {
        self.tour.employee_ref = Some(employee_id.to_string());
        self
    }

    pub fn weekly_limit(mut self, hours: f64) -> Self {
        self.tour.weekly_hours_limit = Some(hours);
        self
    }

    pub fn prefers(mut self, service_type: &str) -> Self {
        self.tour
            .preferred_types
            .get_or_insert_with(Vec::new)
            .push(service_type.to_string());
        self
    }

    pub fn build(self) -> Tour {
        self.tour
    }
}

/// Builder for test employees. Defaults to a 40 hour week without home zone.
#[derive(Clone, Debug)]
pub struct TestEmployee {
    employee: Employee,
}

impl TestEmployee {
    pub fn new(id: &str) -> Self {
        Self {
            employee: Employee {
                id: id.to_string(),
                name: format!("Mitarbeiter {}", id),
                home_zone: None,
                coordinates: None,
                transport_mode: TransportMode::Car,
                weekly_hours: 40.0,
                wage_group_ref: None,
            },
        }
    }

    pub fn home(mut self, zone: &str) -> Self {
        self.employee.home_zone = Some(zone.to_string());
        self
    }

    pub fn weekly_hours(mut self, hours: f64) -> Self {
        self.employee.weekly_hours = hours;
        self
    }

    pub fn wage_group(mut self, group: &str) -> Self {
        self.employee.wage_group_ref = Some(group.to_string());
        self
    }

    pub fn build(self) -> Employee {
        self.employee
    }
}

pub fn snapshot(visits: Vec<TestVisit>, tours: Vec<TestTour>, employees: Vec<TestEmployee>) -> Snapshot {
    Snapshot {
        visits: visits.into_iter().map(TestVisit::build).collect(),
        tours: tours.into_iter().map(TestTour::build).collect(),
        employees: employees.into_iter().map(TestEmployee::build).collect(),
        locations: gelsenkirchen_locations(),
        wage_settings: None,
    }
}

/// Writes a report's assignments and timings back, the way the persistence
/// layer does.
pub fn apply(snapshot: &Snapshot, report: &OptimizationReport) -> Snapshot {
    let mut next = snapshot.clone();
    for visit in next.visits.iter_mut() {
        if let Some(tour_id) = report.tour_of(&visit.id) {
            visit.tour_ref = Some(tour_id.to_string());
        }
        if let Some(adjusted) = report
            .adjusted_visits
            .iter()
            .flatten()
            .find(|adjusted| adjusted.id == visit.id)
        {
            visit.start = adjusted.start;
            visit.end = adjusted.end;
        }
    }
    next
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
