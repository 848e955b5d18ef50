//! Invocation parameters and tunable scoring weights.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;

/// Quantity the assignment score approximates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    #[default]
    Time,
    Distance,
    Cost,
}

impl FromStr for Objective {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "time" => Ok(Objective::Time),
            "distance" => Ok(Objective::Distance),
            "cost" => Ok(Objective::Cost),
            other => Err(OptimizeError::UnknownObjective(other.to_string())),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Objective::Time => "time",
            Objective::Distance => "distance",
            Objective::Cost => "cost",
        })
    }
}

/// How a tour's preferred service types treat non-matching visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSeparation {
    /// Non-matching visits are never placed on the tour.
    Strict,
    /// Non-matching visits are penalized.
    #[default]
    Flexible,
}

impl FromStr for TypeSeparation {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "strict" => Ok(TypeSeparation::Strict),
            "flexible" => Ok(TypeSeparation::Flexible),
            other => Err(OptimizeError::UnknownTypeSeparation(other.to_string())),
        }
    }
}

/// Which visits and tours a run covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "target")]
pub enum Scope {
    /// All visits of one weekday across all tours.
    Day(u8),
    /// All visits of one tour across every day.
    Tour(String),
}

impl Scope {
    pub fn validate(&self) -> Result<(), OptimizeError> {
        match self {
            Scope::Day(day) if *day > 6 => Err(OptimizeError::InvalidDayIndex(*day)),
            _ => Ok(()),
        }
    }
}

/// A validated optimization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default)]
    pub objective: Objective,
    #[serde(default)]
    pub type_separation: TypeSeparation,
    pub scope: Scope,
    /// Rewrite visit times to reflect travel gaps.
    #[serde(default)]
    pub adjust_timings: bool,
}

impl OptimizeRequest {
    pub fn for_day(day: u8) -> Self {
        Self {
            objective: Objective::default(),
            type_separation: TypeSeparation::default(),
            scope: Scope::Day(day),
            adjust_timings: false,
        }
    }

    pub fn for_tour(tour_id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Tour(tour_id.into()),
            ..Self::for_day(0)
        }
    }

    pub fn objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn type_separation(mut self, type_separation: TypeSeparation) -> Self {
        self.type_separation = type_separation;
        self
    }

    pub fn adjust_timings(mut self, adjust: bool) -> Self {
        self.adjust_timings = adjust;
        self
    }

    /// Builds a request from loosely typed caller parameters.
    ///
    /// Missing objective and type separation fall back to their defaults; the
    /// scope defaults to `day` and then requires a day index.
    pub fn from_parts(
        objective: Option<&str>,
        type_separation: Option<&str>,
        scope: Option<&str>,
        day_index: Option<i64>,
        tour_id: Option<&str>,
    ) -> Result<Self, OptimizeError> {
        let objective = objective.map(str::parse::<Objective>).transpose()?.unwrap_or_default();
        let type_separation = type_separation
            .map(str::parse::<TypeSeparation>)
            .transpose()?
            .unwrap_or_default();

        let scope = match scope.map(str::trim).unwrap_or("day") {
            "day" => {
                let day = day_index.ok_or(OptimizeError::MissingScopeTarget("day index"))?;
                let day = u8::try_from(day).map_err(|_| OptimizeError::InvalidDayIndex(u8::MAX))?;
                Scope::Day(day)
            }
            "tour" => {
                let tour = tour_id
                    .filter(|id| !id.is_empty())
                    .ok_or(OptimizeError::MissingScopeTarget("tour id"))?;
                Scope::Tour(tour.to_string())
            }
            other => return Err(OptimizeError::UnknownScope(other.to_string())),
        };
        scope.validate()?;

        Ok(Self {
            objective,
            type_separation,
            scope,
            adjust_timings: false,
        })
    }
}

/// Tunable constants of the assignment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringWeights {
    /// Multiplier for visits whose types miss a flexible tour's preference.
    pub type_mismatch_penalty: f64,
    /// Multiplier when the tour already has one visit in the zone.
    pub zone_bonus_single: f64,
    /// Multiplier when the tour already has two or more visits in the zone.
    pub zone_bonus_multiple: f64,
    /// Multiplier for switching to a distant zone.
    pub zone_switch_penalty: f64,
    /// Zone distance above which a switch counts as distant.
    pub zone_switch_threshold_km: f64,
    /// Maximum relative adjustment from hour balancing.
    pub hour_balance_weight: f64,
    /// Fraction of the weekly target above which the overage penalty applies.
    pub overage_threshold: f64,
    pub overage_penalty: f64,
    /// Gaps longer than this (minutes) are penalized.
    pub gap_threshold_minutes: f64,
    /// Gap minutes are divided by this to form the penalty.
    pub gap_penalty_divisor: f64,
    /// Flat penalty for opening an idle tour.
    pub empty_tour_penalty: f64,
    pub home_travel_same_zone: f64,
    pub home_travel_other_zone: f64,
    pub home_distance_same_zone: f64,
    pub home_distance_other_zone: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            type_mismatch_penalty: 1.3,
            zone_bonus_single: 0.8,
            zone_bonus_multiple: 0.7,
            zone_switch_penalty: 1.1,
            zone_switch_threshold_km: 5.0,
            hour_balance_weight: 0.2,
            overage_threshold: 1.2,
            overage_penalty: 1.5,
            gap_threshold_minutes: 60.0,
            gap_penalty_divisor: 10.0,
            empty_tour_penalty: 30.0,
            home_travel_same_zone: 5.0,
            home_travel_other_zone: 15.0,
            home_distance_same_zone: 2.0,
            home_distance_other_zone: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() {
        assert_eq!("cost".parse::<Objective>().unwrap(), Objective::Cost);
        assert_eq!("strict".parse::<TypeSeparation>().unwrap(), TypeSeparation::Strict);
        assert_eq!(
            "fastest".parse::<Objective>(),
            Err(OptimizeError::UnknownObjective("fastest".to_string()))
        );
        assert!("loose".parse::<TypeSeparation>().is_err());
    }

    #[test]
    fn test_from_parts_defaults() {
        let request = OptimizeRequest::from_parts(None, None, None, Some(2), None).unwrap();
        assert_eq!(request.objective, Objective::Time);
        assert_eq!(request.type_separation, TypeSeparation::Flexible);
        assert_eq!(request.scope, Scope::Day(2));
    }

    #[test]
    fn test_from_parts_rejects_bad_day() {
        assert_eq!(
            OptimizeRequest::from_parts(None, None, Some("day"), Some(7), None),
            Err(OptimizeError::InvalidDayIndex(7))
        );
        assert!(OptimizeRequest::from_parts(None, None, Some("day"), Some(-1), None).is_err());
        assert_eq!(
            OptimizeRequest::from_parts(None, None, Some("day"), None, None),
            Err(OptimizeError::MissingScopeTarget("day index"))
        );
    }

    #[test]
    fn test_from_parts_tour_scope() {
        let request =
            OptimizeRequest::from_parts(Some("distance"), Some("strict"), Some("tour"), None, Some("t1")).unwrap();
        assert_eq!(request.scope, Scope::Tour("t1".to_string()));
        assert_eq!(request.objective, Objective::Distance);

        assert_eq!(
            OptimizeRequest::from_parts(None, None, Some("tour"), None, None),
            Err(OptimizeError::MissingScopeTarget("tour id"))
        );
        assert_eq!(
            OptimizeRequest::from_parts(None, None, Some("week"), Some(1), None),
            Err(OptimizeError::UnknownScope("week".to_string()))
        );
    }

    #[test]
    fn test_default_weights_match_documented_constants() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.type_mismatch_penalty, 1.3);
        assert_eq!(weights.zone_bonus_single, 0.8);
        assert_eq!(weights.zone_bonus_multiple, 0.7);
        assert_eq!(weights.empty_tour_penalty, 30.0);
    }
}
