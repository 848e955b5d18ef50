//! Optimization results and the read-only potential analysis.

use serde::{Deserialize, Serialize};

use crate::cost;
use crate::model::{Employee, Snapshot, Tour, Visit};
use crate::timing::AdjustedVisit;
use crate::traits::TravelEstimator;

/// Shown instead of an employee name for tours without a resolvable employee.
pub const NO_EMPLOYEE: &str = "no employee";

/// Consecutive visits further apart than this are checked for excess gaps.
const GAP_CHECK_MINUTES: i64 = 30;

/// Waiting time beyond travel that counts as an optimization opportunity.
const EXCESS_GAP_MINUTES: i64 = 15;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn day_name(day_index: u8) -> &'static str {
    DAY_NAMES.get(day_index as usize).copied().unwrap_or("day")
}

/// A visit placed on a tour, with the score that won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub visit_id: String,
    pub tour_id: String,
    pub score: f64,
}

/// Work placed on one tour during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourWorkload {
    pub tour_id: String,
    pub tour_name: String,
    /// Visit ids in route order.
    pub visit_ids: Vec<String>,
    pub total_minutes: f64,
    pub total_hours: f64,
    pub employee_name: String,
    /// Driven distance between consecutive same-day stops.
    pub travel_km: f64,
    /// Labor plus mileage cost.
    pub estimated_cost: f64,
}

impl TourWorkload {
    pub fn new<T>(
        tour: &Tour,
        employee: Option<&Employee>,
        route: &[&Visit],
        total_minutes: f64,
        snapshot: &Snapshot,
        estimator: &T,
    ) -> Self
    where
        T: TravelEstimator + ?Sized,
    {
        let travel_km: f64 = route
            .windows(2)
            .filter(|pair| pair[0].day_index == pair[1].day_index)
            .map(|pair| {
                estimator.leg_km(
                    snapshot.visit_location(pair[0]),
                    snapshot.visit_location(pair[1]),
                )
            })
            .sum();

        let settings = snapshot.wage_settings.as_ref();
        let rate = cost::hourly_rate(employee, settings);
        let labor = cost::labor_cost(total_minutes, rate, settings);
        let mileage = settings.map_or(0.0, |s| s.mileage_cost(travel_km));

        Self {
            tour_id: tour.id.clone(),
            tour_name: if tour.name.is_empty() { tour.id.clone() } else { tour.name.clone() },
            visit_ids: route.iter().map(|visit| visit.id.clone()).collect(),
            total_minutes,
            total_hours: round2(total_minutes / 60.0),
            employee_name: employee
                .map(|e| e.name.clone())
                .unwrap_or_else(|| NO_EMPLOYEE.to_string()),
            travel_km: round2(travel_km),
            estimated_cost: round2(labor + mileage),
        }
    }

    pub fn is_used(&self) -> bool {
        !self.visit_ids.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationStats {
    pub total_visits: usize,
    pub assigned_visits: usize,
    pub unassigned_visits: usize,
    pub tours_used: usize,
    pub total_tours: usize,
}

/// Outcome of one optimization run. The caller persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    pub assignments: Vec<Assignment>,
    /// Visits no tour could take.
    pub unassigned: Vec<String>,
    pub workloads: Vec<TourWorkload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_visits: Option<Vec<AdjustedVisit>>,
    pub stats: OptimizationStats,
}

impl OptimizationReport {
    pub fn new(
        assignments: Vec<Assignment>,
        unassigned: Vec<String>,
        workloads: Vec<TourWorkload>,
        adjusted_visits: Option<Vec<AdjustedVisit>>,
    ) -> Self {
        let stats = OptimizationStats {
            total_visits: assignments.len() + unassigned.len(),
            assigned_visits: assignments.len(),
            unassigned_visits: unassigned.len(),
            tours_used: workloads.iter().filter(|w| w.is_used()).count(),
            total_tours: workloads.len(),
        };

        Self {
            assignments,
            unassigned,
            workloads,
            adjusted_visits,
            stats,
        }
    }

    /// Tour a visit was assigned to in this run.
    pub fn tour_of(&self, visit_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.visit_id == visit_id)
            .map(|a| a.tour_id.as_str())
    }

    pub fn workload(&self, tour_id: &str) -> Option<&TourWorkload> {
        self.workloads.iter().find(|w| w.tour_id == tour_id)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Potential analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    Unassigned { count: usize },
    #[serde(rename_all = "camelCase")]
    LargeGap { tour_id: String, excess_minutes: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub day_index: u8,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    fn new(day_index: u8, kind: IssueKind) -> Self {
        let day = day_name(day_index);
        let message = match &kind {
            IssueKind::Unassigned { count } => format!("{} unassigned visit(s) on {}", count, day),
            IssueKind::LargeGap { excess_minutes, .. } => {
                format!("Large gap ({}min) on {}", excess_minutes, day)
            }
        };
        Self {
            day_index,
            kind,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    EmptyTours { count: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialReport {
    pub has_potential: bool,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
    /// Sum of excess waiting minutes over all large gaps.
    pub total_potential_savings: i64,
    pub summary: String,
}

/// Scans the snapshot's schedule for unassigned visits, excess waiting time
/// and unused tours. Nothing is modified.
pub fn analyze_potential<T>(snapshot: &Snapshot, estimator: &T) -> PotentialReport
where
    T: TravelEstimator + ?Sized,
{
    let real: Vec<&Visit> = snapshot.real_visits().collect();
    if real.is_empty() {
        return PotentialReport {
            has_potential: false,
            issues: Vec::new(),
            recommendations: Vec::new(),
            total_potential_savings: 0,
            summary: summary(0),
        };
    }

    let mut issues = Vec::new();
    let mut savings = 0;

    for day in 0..7u8 {
        let day_visits: Vec<&Visit> = real.iter().copied().filter(|v| v.day_index == day).collect();
        if day_visits.is_empty() {
            continue;
        }

        let unassigned = day_visits.iter().filter(|v| assigned_tour(v).is_none()).count();
        if unassigned > 0 {
            issues.push(Issue::new(day, IssueKind::Unassigned { count: unassigned }));
        }

        for (tour_id, mut tour_visits) in group_by_tour(&day_visits) {
            tour_visits.sort_by_key(|v| v.start);

            for pair in tour_visits.windows(2) {
                let gap = pair[1].start.minutes() as i64 - pair[0].end.minutes() as i64;
                if gap <= GAP_CHECK_MINUTES {
                    continue;
                }

                let (Some(from), Some(to)) = (
                    snapshot.visit_location(pair[0]),
                    snapshot.visit_location(pair[1]),
                ) else {
                    continue;
                };

                let excess = gap - estimator.travel_minutes(from, to) as i64;
                if excess > EXCESS_GAP_MINUTES {
                    issues.push(Issue::new(
                        day,
                        IssueKind::LargeGap {
                            tour_id: tour_id.to_string(),
                            excess_minutes: excess,
                        },
                    ));
                    savings += excess;
                }
            }
        }
    }

    let empty_tours = snapshot
        .tours
        .iter()
        .filter(|tour| !real.iter().any(|v| assigned_tour(v) == Some(tour.id.as_str())))
        .count();

    let mut recommendations = Vec::new();
    if empty_tours > 0 {
        recommendations.push(Recommendation::EmptyTours {
            count: empty_tours,
            message: format!("{} unused tour(s) available", empty_tours),
        });
    }

    PotentialReport {
        has_potential: !issues.is_empty() || !recommendations.is_empty(),
        summary: summary(issues.len()),
        issues,
        recommendations,
        total_potential_savings: savings,
    }
}

fn assigned_tour(visit: &Visit) -> Option<&str> {
    visit.tour_ref.as_deref().filter(|id| !id.is_empty())
}

/// Groups assigned visits by tour, tours in order of first appearance.
fn group_by_tour<'a>(visits: &[&'a Visit]) -> Vec<(&'a str, Vec<&'a Visit>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Visit>)> = Vec::new();
    for &visit in visits {
        let Some(tour_id) = assigned_tour(visit) else {
            continue;
        };
        match groups.iter_mut().find(|(id, _)| *id == tour_id) {
            Some((_, group)) => group.push(visit),
            None => groups.push((tour_id, vec![visit])),
        }
    }
    groups
}

fn summary(issue_count: usize) -> String {
    if issue_count > 0 {
        format!("{} optimization opportunit(ies) found", issue_count)
    } else {
        "No optimization opportunities found".to_string()
    }
}
