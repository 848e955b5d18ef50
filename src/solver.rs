//! Greedy tour assignment.
//!
//! Visits are grouped by zone and, within each zone, processed by start time.
//! Each visit goes to the tour with the strictly lowest finite score; the
//! first tour wins ties. Assigned routes are then sequenced and, on request,
//! their timings adjusted.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cost;
use crate::error::OptimizeError;
use crate::haversine::GeoDistance;
use crate::model::{Employee, Snapshot, Tour, Visit};
use crate::options::{Objective, OptimizeRequest, Scope, ScoringWeights, TypeSeparation};
use crate::report::{Assignment, OptimizationReport, TourWorkload};
use crate::sequencer;
use crate::timing;
use crate::traits::TravelEstimator;
use crate::zones::OUTSIDE_ZONE;

/// Working state of one candidate tour during a run.
#[derive(Debug, Clone)]
struct TourState<'a> {
    tour: &'a Tour,
    employee: Option<&'a Employee>,
    /// Visits placed in this run, in assignment order.
    visits: Vec<&'a Visit>,
    /// Weekly minutes including work carried over from outside the scope.
    total_minutes: f64,
    /// Minutes placed in this run.
    run_minutes: f64,
    last_zone: Option<&'a str>,
}

impl<'a> TourState<'a> {
    /// Most recently placed visit on the candidate's day. Scores measure the
    /// leg and the gap from here.
    fn last_visit(&self, visit: &Visit) -> Option<&'a Visit> {
        self.visits
            .iter()
            .rev()
            .copied()
            .find(|placed| placed.day_index == visit.day_index)
    }

    fn conflicts_with(&self, visit: &Visit) -> bool {
        self.visits.iter().any(|placed| placed.overlaps(visit))
    }
}

struct Optimizer<'a, T: ?Sized> {
    snapshot: &'a Snapshot,
    request: &'a OptimizeRequest,
    weights: &'a ScoringWeights,
    estimator: &'a T,
}

/// Runs one optimization with the built-in haversine/zone estimator and
/// default scoring weights. Travel times use the snapshot's configured
/// average speed when it has wage settings.
pub fn optimize_default(
    snapshot: &Snapshot,
    request: &OptimizeRequest,
) -> Result<OptimizationReport, OptimizeError> {
    optimize(snapshot, request, &ScoringWeights::default(), &GeoDistance::for_snapshot(snapshot))
}

/// Assigns the visits selected by `request.scope` to tours and returns the
/// resulting delta. The snapshot is not modified.
pub fn optimize<T>(
    snapshot: &Snapshot,
    request: &OptimizeRequest,
    weights: &ScoringWeights,
    estimator: &T,
) -> Result<OptimizationReport, OptimizeError>
where
    T: TravelEstimator + ?Sized,
{
    request.scope.validate()?;

    let optimizer = Optimizer {
        snapshot,
        request,
        weights,
        estimator,
    };
    optimizer.run()
}

/// Runs the seven day-scoped optimizations of a week in parallel.
///
/// Every run reads the same snapshot and nothing else, so the reports equal
/// seven sequential [`optimize`] calls. The template's scope is ignored.
pub fn optimize_week<T>(
    snapshot: &Snapshot,
    template: &OptimizeRequest,
    weights: &ScoringWeights,
    estimator: &T,
) -> Result<Vec<OptimizationReport>, OptimizeError>
where
    T: TravelEstimator + Sync + ?Sized,
{
    (0..7u8)
        .into_par_iter()
        .map(|day| {
            let request = OptimizeRequest {
                scope: Scope::Day(day),
                ..template.clone()
            };
            optimize(snapshot, &request, weights, estimator)
        })
        .collect()
}

impl<'a, T> Optimizer<'a, T>
where
    T: TravelEstimator + ?Sized,
{
    fn run(&self) -> Result<OptimizationReport, OptimizeError> {
        let (candidates, selected) = self.select()?;
        if selected.is_empty() {
            info!(scope = ?self.request.scope, "no visits to optimize");
            return Ok(OptimizationReport::new(
                Vec::new(),
                Vec::new(),
                self.workloads(&self.initial_states(&candidates, &selected).0),
                self.request.adjust_timings.then(Vec::new),
            ));
        }

        let (mut states, mut employee_minutes) = self.initial_states(&candidates, &selected);

        let mut assignments = Vec::new();
        let mut unassigned = Vec::new();

        for (zone, zone_visits) in group_by_zone(self.snapshot, &selected) {
            for visit in zone_visits {
                match self.best_tour(visit, zone, &states, &employee_minutes) {
                    Some((index, score)) => {
                        let state = &mut states[index];
                        let minutes = visit.effective_minutes();

                        state.visits.push(visit);
                        state.total_minutes += minutes;
                        state.run_minutes += minutes;
                        state.last_zone = Some(zone);
                        if let Some(employee) = state.employee {
                            *employee_minutes.entry(employee.id.as_str()).or_default() += minutes;
                        }

                        debug!(visit = %visit.id, tour = %state.tour.id, score, "assigned visit");
                        assignments.push(Assignment {
                            visit_id: visit.id.clone(),
                            tour_id: state.tour.id.clone(),
                            score,
                        });
                    }
                    None => {
                        debug!(visit = %visit.id, zone, "no feasible tour for visit");
                        unassigned.push(visit.id.clone());
                    }
                }
            }
        }

        let routes: Vec<Vec<&Visit>> = states
            .iter()
            .map(|state| sequencer::sequence_by_day(&state.visits, self.snapshot, self.estimator))
            .collect();

        let adjusted: Option<Vec<_>> = self.request.adjust_timings.then(|| {
            states
                .iter()
                .zip(&routes)
                .flat_map(|(state, route)| timing::adjust(route, state.employee, self.snapshot, self.estimator))
                .collect()
        });

        let workloads = states
            .iter()
            .zip(&routes)
            .map(|(state, route)| {
                TourWorkload::new(state.tour, state.employee, route, state.run_minutes, self.snapshot, self.estimator)
            })
            .collect();

        let report = OptimizationReport::new(assignments, unassigned, workloads, adjusted);
        info!(
            scope = ?self.request.scope,
            objective = %self.request.objective,
            total = report.stats.total_visits,
            assigned = report.stats.assigned_visits,
            unassigned = report.stats.unassigned_visits,
            tours_used = report.stats.tours_used,
            "optimization finished"
        );
        Ok(report)
    }

    /// Candidate tours and in-scope visits for the request.
    fn select(&self) -> Result<(Vec<&'a Tour>, Vec<&'a Visit>), OptimizeError> {
        let snapshot = self.snapshot;
        match &self.request.scope {
            Scope::Day(day) => Ok((
                snapshot.tours.iter().collect(),
                snapshot.real_visits().filter(|v| v.day_index == *day).collect(),
            )),
            Scope::Tour(tour_id) => {
                let tour = snapshot
                    .tour(tour_id)
                    .ok_or_else(|| OptimizeError::TourNotFound(tour_id.clone()))?;
                Ok((
                    vec![tour],
                    snapshot
                        .real_visits()
                        .filter(|v| v.tour_ref.as_deref() == Some(tour_id.as_str()))
                        .collect(),
                ))
            }
        }
    }

    /// Builds tour states and per-employee committed minutes, seeded with
    /// assigned work outside the scope.
    fn initial_states(
        &self,
        candidates: &[&'a Tour],
        selected: &[&'a Visit],
    ) -> (Vec<TourState<'a>>, HashMap<&'a str, f64>) {
        let snapshot = self.snapshot;
        let mut tour_minutes: HashMap<&str, f64> = HashMap::new();
        let mut employee_minutes: HashMap<&'a str, f64> = HashMap::new();

        for visit in snapshot.real_visits() {
            if selected.iter().any(|s| std::ptr::eq(*s, visit)) {
                continue;
            }
            let Some(tour) = visit.tour_ref.as_deref().and_then(|id| snapshot.tour(id)) else {
                continue;
            };

            let minutes = visit.effective_minutes();
            *tour_minutes.entry(tour.id.as_str()).or_default() += minutes;
            if let Some(employee) = snapshot.tour_employee(tour) {
                *employee_minutes.entry(employee.id.as_str()).or_default() += minutes;
            }
        }

        let states = candidates
            .iter()
            .map(|&tour| {
                let employee = snapshot.tour_employee(tour);
                if employee.is_none() && tour.employee_ref.is_some() {
                    warn!(tour = %tour.id, "tour references an unknown employee");
                }
                TourState {
                    tour,
                    employee,
                    visits: Vec::new(),
                    total_minutes: tour_minutes.get(tour.id.as_str()).copied().unwrap_or(0.0),
                    run_minutes: 0.0,
                    last_zone: None,
                }
            })
            .collect();

        (states, employee_minutes)
    }

    /// Index and score of the tour that takes `visit`, if any can.
    fn best_tour(
        &self,
        visit: &Visit,
        zone: &str,
        states: &[TourState<'a>],
        employee_minutes: &HashMap<&str, f64>,
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, state) in states.iter().enumerate() {
            let score = self.score(visit, zone, state, employee_minutes);
            if score.is_finite() && best.is_none_or(|(_, best_score)| score < best_score) {
                best = Some((index, score));
            }
        }
        best
    }

    /// Score of placing `visit` on a tour. Lower is better, infinity means
    /// the tour cannot take the visit.
    fn score(&self, visit: &Visit, zone: &str, state: &TourState<'a>, employee_minutes: &HashMap<&str, f64>) -> f64 {
        let w = self.weights;
        let snapshot = self.snapshot;
        let tour = state.tour;
        let effective = visit.effective_minutes();

        // hard constraints first, they override everything else
        if let Some(limit) = tour.weekly_hours_limit.filter(|limit| *limit > 0.0) {
            if state.total_minutes + effective > limit * 60.0 {
                return f64::INFINITY;
            }
        }
        if state.conflicts_with(visit) {
            return f64::INFINITY;
        }

        let mut score = self.base_score(visit, zone, state);
        if !score.is_finite() {
            return f64::INFINITY;
        }

        if let Some(preferred) = tour.preferred_types() {
            let matches = snapshot
                .visit_types(visit)
                .iter()
                .any(|kind| preferred.contains(kind));
            if !matches {
                match self.request.type_separation {
                    TypeSeparation::Strict => return f64::INFINITY,
                    TypeSeparation::Flexible => score *= w.type_mismatch_penalty,
                }
            }
        }

        let same_zone = state
            .visits
            .iter()
            .filter(|placed| snapshot.visit_zone(placed) == zone)
            .count();
        if same_zone >= 2 {
            score *= w.zone_bonus_multiple;
        } else if same_zone == 1 {
            score *= w.zone_bonus_single;
        }

        if let Some(last_zone) = state.last_zone {
            if last_zone != zone
                && last_zone != OUTSIDE_ZONE
                && zone != OUTSIDE_ZONE
                && self.estimator.zone_distance(last_zone, zone) > w.zone_switch_threshold_km
            {
                score *= w.zone_switch_penalty;
            }
        }

        if let Some(employee) = state.employee {
            let committed = employee_minutes.get(employee.id.as_str()).copied().unwrap_or(0.0);
            let projected = committed + effective;
            let target = employee.target_minutes();

            if target > 0.0 {
                let balance = ((target - projected) / target).clamp(-1.0, 1.0);
                score *= 1.0 + balance * w.hour_balance_weight;
            }
            if projected > target * w.overage_threshold {
                score *= w.overage_penalty;
            }
        }

        score
    }

    /// Objective-specific part of the score.
    fn base_score(&self, visit: &Visit, zone: &str, state: &TourState<'a>) -> f64 {
        let w = self.weights;
        let duration = visit.duration() as f64;
        let home_zone_match = state
            .employee
            .and_then(|e| e.home_zone.as_deref())
            .is_some_and(|home| home == zone);
        let home_minutes = if home_zone_match { w.home_travel_same_zone } else { w.home_travel_other_zone };

        let last = state.last_visit(visit);

        match self.request.objective {
            Objective::Time => match last {
                Some(last) => {
                    let gap = visit.start.minutes() as f64 - last.end.minutes() as f64;
                    if gap < 0.0 {
                        return f64::INFINITY;
                    }
                    let gap_penalty = if gap > w.gap_threshold_minutes { gap / w.gap_penalty_divisor } else { 0.0 };
                    self.travel_minutes(last, visit) + duration + gap_penalty
                }
                None => home_minutes + duration + w.empty_tour_penalty,
            },
            Objective::Distance => match last {
                Some(last) => self
                    .estimator
                    .leg_km(self.snapshot.visit_location(last), self.snapshot.visit_location(visit)),
                None if home_zone_match => w.home_distance_same_zone,
                None => w.home_distance_other_zone,
            },
            Objective::Cost => {
                let rate = cost::hourly_rate(state.employee, self.snapshot.wage_settings.as_ref());
                match last {
                    Some(last) => (state.run_minutes + self.travel_minutes(last, visit) + duration) * rate,
                    None => (home_minutes + duration) * rate,
                }
            }
        }
    }

    fn travel_minutes(&self, from: &Visit, to: &Visit) -> f64 {
        self.estimator.leg_minutes(
            self.snapshot.visit_location(from),
            self.snapshot.visit_location(to),
        ) as f64
    }

    fn workloads(&self, states: &[TourState<'a>]) -> Vec<TourWorkload> {
        states
            .iter()
            .map(|state| TourWorkload::new(state.tour, state.employee, &[], 0.0, self.snapshot, self.estimator))
            .collect()
    }
}

/// Groups visits by zone, zones in order of first appearance, each group
/// sorted by start time.
fn group_by_zone<'a>(snapshot: &'a Snapshot, visits: &[&'a Visit]) -> Vec<(&'a str, Vec<&'a Visit>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Visit>)> = Vec::new();
    for &visit in visits {
        let zone = snapshot.visit_zone(visit);
        match groups.iter_mut().find(|(name, _)| *name == zone) {
            Some((_, group)) => group.push(visit),
            None => groups.push((zone, vec![visit])),
        }
    }

    for (_, group) in groups.iter_mut() {
        group.sort_by_key(|visit| visit.start);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, Rhythm};

    fn location(id: &str, zone: &str) -> Location {
        Location {
            id: id.to_string(),
            title: String::new(),
            zone: zone.to_string(),
            address: None,
            coordinates: None,
            service_types: Vec::new(),
        }
    }

    fn visit(id: &str, location: &str, start: &str, end: &str) -> Visit {
        Visit {
            id: id.to_string(),
            title: String::new(),
            day_index: 0,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            zone: None,
            location_ref: Some(location.to_string()),
            service_types: Vec::new(),
            rhythm: Rhythm::Weekly,
            tour_ref: None,
            is_travel: false,
        }
    }

    #[test]
    fn test_group_by_zone_order() {
        let snapshot = Snapshot {
            locations: vec![location("b", "Buer"), location("e", "Erle")],
            ..Snapshot::default()
        };
        let v1 = visit("v1", "e", "10:00", "10:30");
        let v2 = visit("v2", "b", "08:00", "08:30");
        let v3 = visit("v3", "e", "07:00", "07:30");

        let groups = group_by_zone(&snapshot, &[&v1, &v2, &v3]);
        let zones: Vec<&str> = groups.iter().map(|(zone, _)| *zone).collect();
        assert_eq!(zones, vec!["Erle", "Buer"]);

        let erle: Vec<&str> = groups[0].1.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(erle, vec!["v3", "v1"]);
    }

    #[test]
    fn test_last_visit_is_latest_placed_on_same_day() {
        let tour = Tour {
            id: "t".to_string(),
            name: String::new(),
            employee_ref: None,
            weekly_hours_limit: None,
            preferred_types: None,
        };
        let early = visit("early", "b", "08:00", "08:30");
        let late = visit("late", "b", "14:00", "14:30");
        let mut other_day = visit("other", "b", "16:00", "16:30");
        other_day.day_index = 1;
        let state = TourState {
            tour: &tour,
            employee: None,
            visits: vec![&late, &early, &other_day],
            total_minutes: 90.0,
            run_minutes: 90.0,
            last_zone: Some("Buer"),
        };

        let candidate = visit("c", "b", "12:00", "12:30");
        assert_eq!(state.last_visit(&candidate).map(|v| v.id.as_str()), Some("early"));

        let mut tuesday = visit("tue", "b", "07:00", "07:30");
        tuesday.day_index = 1;
        assert_eq!(state.last_visit(&tuesday).map(|v| v.id.as_str()), Some("other"));

        let mut friday = visit("fri", "b", "07:00", "07:30");
        friday.day_index = 4;
        assert!(state.last_visit(&friday).is_none());
    }
}
