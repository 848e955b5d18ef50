//! Labor cost rates derived from wage-group settings.

use serde::{Deserialize, Serialize};

use crate::model::Employee;
use crate::zones::DEFAULT_SPEED_KMH;

/// Hourly rate used whenever no wage group can be resolved.
pub const DEFAULT_HOURLY_RATE: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WageGroup {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_hourly_rate")]
    pub hourly_rate: f64,
}

impl WageGroup {
    pub fn new(id: &str, name: &str, hourly_rate: f64) -> Self {
        Self {
            id: id.to_string(),
            name: Some(name.to_string()),
            hourly_rate,
        }
    }
}

fn default_hourly_rate() -> f64 {
    DEFAULT_HOURLY_RATE
}

/// Business constants for cost estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WageSettings {
    pub wage_groups: Vec<WageGroup>,
    /// Average travel speed in km/h.
    pub avg_speed: f64,
    /// Mileage allowance per driven km.
    pub km_rate: f64,
    /// Multiplier from gross wage to employer cost.
    pub employer_factor: f64,
}

impl Default for WageSettings {
    fn default() -> Self {
        Self {
            wage_groups: vec![
                WageGroup::new("fachkraft", "Fachkraft", 18.0),
                WageGroup::new("hilfskraft", "Hilfskraft", 14.0),
                WageGroup::new("azubi", "Auszubildende/r", 10.0),
            ],
            avg_speed: DEFAULT_SPEED_KMH,
            km_rate: 0.30,
            employer_factor: 1.5,
        }
    }
}

impl WageSettings {
    pub fn wage_group(&self, id: &str) -> Option<&WageGroup> {
        self.wage_groups.iter().find(|group| group.id == id)
    }

    /// Mileage cost for `km` driven.
    pub fn mileage_cost(&self, km: f64) -> f64 {
        km * self.km_rate
    }
}

/// Hourly rate of an employee. Missing configuration degrades to
/// [`DEFAULT_HOURLY_RATE`].
pub fn hourly_rate(employee: Option<&Employee>, settings: Option<&WageSettings>) -> f64 {
    let (Some(employee), Some(settings)) = (employee, settings) else {
        return DEFAULT_HOURLY_RATE;
    };

    employee
        .wage_group_ref
        .as_deref()
        .and_then(|id| settings.wage_group(id))
        .map(|group| group.hourly_rate)
        .unwrap_or(DEFAULT_HOURLY_RATE)
}

/// Labor cost of `minutes` of work at `rate`, including the employer factor.
pub fn labor_cost(minutes: f64, rate: f64, settings: Option<&WageSettings>) -> f64 {
    let factor = settings.map(|s| s.employer_factor).unwrap_or(1.0);
    minutes / 60.0 * rate * factor
}
