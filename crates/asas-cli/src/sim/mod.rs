//! Simulation host for scenario runs.
//!
//! Provides waypoint routes, predefined scenarios, the stepping host and
//! the event log writer.

mod host;
mod log;
mod route;
mod scenarios;

pub use host::{SimHost, StepSummary};
pub use log::EventLog;
pub use route::{Route, Waypoint};
pub use scenarios::{
    create_converging_scenario, create_crossing_scenario, create_head_on_scenario, Scenario,
};
