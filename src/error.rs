//! Errors raised for invalid invocation parameters.
//!
//! Data-quality problems in the snapshot never surface here; the optimizer
//! degrades those to documented defaults instead.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("invalid day index {0}, expected 0-6")]
    InvalidDayIndex(u8),
    #[error("tour {0} not found")]
    TourNotFound(String),
    #[error("unknown optimization objective '{0}', expected time, distance or cost")]
    UnknownObjective(String),
    #[error("unknown type separation '{0}', expected strict or flexible")]
    UnknownTypeSeparation(String),
    #[error("unknown optimization scope '{0}', expected day or tour")]
    UnknownScope(String),
    #[error("scope requires a {0}")]
    MissingScopeTarget(&'static str),
    #[error("invalid clock time '{0}', expected HH:MM")]
    InvalidClockTime(String),
}
