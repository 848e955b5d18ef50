//! tour-optimizer core
//!
//! Assigns home-care visits to tours, orders each tour's route and adjusts
//! visit timings to realistic travel gaps. Works on an in-memory snapshot and
//! returns a delta; loading and persisting data is up to the caller.

pub mod clock;
pub mod cost;
pub mod error;
pub mod haversine;
pub mod model;
pub mod options;
pub mod report;
pub mod sequencer;
pub mod solver;
pub mod timing;
pub mod traits;
pub mod zones;

pub use error::OptimizeError;
pub use options::{Objective, OptimizeRequest, Scope, ScoringWeights, TypeSeparation};
pub use report::OptimizationReport;
pub use solver::{optimize, optimize_default, optimize_week};
