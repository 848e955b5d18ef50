//! Rewrites visit times so gaps between stops match travel time.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::{ClockTime, MAX_MINUTES, ceil_to};
use crate::model::{Employee, Snapshot, Visit};
use crate::traits::TravelEstimator;

/// Adjusted start times snap to this grid (minutes).
const TIME_STEP_MINUTES: u32 = 5;

/// New timing for a visit. Day and duration are those of the source visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedVisit {
    pub id: String,
    pub day_index: u8,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl AdjustedVisit {
    pub fn duration(&self) -> u32 {
        self.end.minutes() - self.start.minutes()
    }
}

/// Recomputes start/end times for an already sequenced route.
///
/// The first visit of each day may move earlier by the employee's home travel
/// time. Every following visit starts at the previous visit's end plus travel,
/// rounded up to five minutes. Durations are never changed.
pub fn adjust<T>(
    sequenced: &[&Visit],
    employee: Option<&Employee>,
    snapshot: &Snapshot,
    estimator: &T,
) -> Vec<AdjustedVisit>
where
    T: TravelEstimator + ?Sized,
{
    let mut adjusted = Vec::with_capacity(sequenced.len());
    let mut previous: Option<(&Visit, u32)> = None;

    for visit in sequenced {
        let duration = visit.duration();
        let location = snapshot.visit_location(visit);

        let start = match previous {
            Some((prev, prev_end)) if prev.day_index == visit.day_index => {
                let travel = estimator.leg_minutes(snapshot.visit_location(prev), location);
                ceil_to(prev_end + travel, TIME_STEP_MINUTES)
            }
            _ => first_start(visit, employee, snapshot, estimator),
        };

        let latest_start = MAX_MINUTES - duration.min(MAX_MINUTES);
        let start = if start > latest_start {
            warn!(visit = %visit.id, start, "adjusted visit runs past the end of the schedule, clamping");
            latest_start
        } else {
            start
        };

        let end = start + duration;
        adjusted.push(AdjustedVisit {
            id: visit.id.clone(),
            day_index: visit.day_index,
            start: ClockTime::from_minutes(start),
            end: ClockTime::from_minutes(end),
        });
        previous = Some((visit, end));
    }

    adjusted
}

/// Start of a day's first visit, pulled earlier by home travel time when possible.
fn first_start<T>(visit: &Visit, employee: Option<&Employee>, snapshot: &Snapshot, estimator: &T) -> u32
where
    T: TravelEstimator + ?Sized,
{
    let current = visit.start.minutes();

    let (Some(employee), Some(location)) = (employee, snapshot.visit_location(visit)) else {
        return current;
    };

    let travel = estimator.home_travel_minutes(employee, location);
    if travel == 0 || travel >= current {
        return current;
    }

    let suggested = ceil_to(current - travel, TIME_STEP_MINUTES);
    if suggested < current { suggested } else { current }
}
