//! Nearest-neighbor ordering of a tour's visits.
//!
//! Starts at the earliest visit and repeatedly moves to the unused visit with
//! the lowest combined zone distance and waiting time. Overlapping candidates
//! are heavily discouraged but not blocked.

use std::collections::BTreeMap;

use crate::model::{Snapshot, Visit};
use crate::traits::TravelEstimator;

/// Added to a candidate's score when it would start before the current visit ends.
const OVERLAP_PENALTY: f64 = 1000.0;

/// Waiting minutes are divided by this before being added to the distance.
const GAP_DIVISOR: f64 = 10.0;

/// Orders one route's visits by nearest neighbor.
///
/// Visits without a resolvable location are appended at the end in their
/// input order. The result is always a permutation of the input.
pub fn sequence<'a, T>(visits: &[&'a Visit], snapshot: &Snapshot, estimator: &T) -> Vec<&'a Visit>
where
    T: TravelEstimator + ?Sized,
{
    if visits.len() < 2 {
        return visits.to_vec();
    }

    let (mut routable, unresolved): (Vec<&'a Visit>, Vec<&'a Visit>) = visits
        .iter()
        .copied()
        .partition(|visit| snapshot.visit_location(visit).is_some());

    routable.sort_by_key(|visit| (visit.day_index, visit.start));

    let mut ordered = Vec::with_capacity(visits.len());
    let mut used = vec![false; routable.len()];

    if let Some(&first) = routable.first() {
        used[0] = true;
        ordered.push(first);

        let mut current = first;
        while ordered.len() < routable.len() {
            let current_zone = snapshot.visit_zone(current);
            let current_end = current.end.minutes() as f64;

            let mut nearest: Option<(usize, f64)> = None;
            for (index, candidate) in routable.iter().enumerate() {
                if used[index] {
                    continue;
                }

                let distance = estimator.zone_distance(current_zone, snapshot.visit_zone(candidate));
                let gap = candidate.start.minutes() as f64 - current_end;
                let score = if gap >= 0.0 {
                    distance + gap / GAP_DIVISOR
                } else {
                    distance + OVERLAP_PENALTY
                };

                if nearest.is_none_or(|(_, best)| score < best) {
                    nearest = Some((index, score));
                }
            }

            let Some((index, _)) = nearest else {
                break;
            };
            used[index] = true;
            current = routable[index];
            ordered.push(current);
        }
    }

    ordered.extend(unresolved);
    ordered
}

/// Sequences a multi-day tour one day at a time, days in ascending order.
pub fn sequence_by_day<'a, T>(visits: &[&'a Visit], snapshot: &Snapshot, estimator: &T) -> Vec<&'a Visit>
where
    T: TravelEstimator + ?Sized,
{
    let mut by_day: BTreeMap<u8, Vec<&'a Visit>> = BTreeMap::new();
    for visit in visits {
        by_day.entry(visit.day_index).or_default().push(visit);
    }

    by_day
        .values()
        .flat_map(|day_visits| sequence(day_visits, snapshot, estimator))
        .collect()
}
