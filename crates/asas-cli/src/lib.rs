//! ASAS CLI - scenario host for the separation-assurance core.
//!
//! Provides a small traffic simulation that owns aircraft state and routes,
//! runs the core every step, executes resume directives and writes event
//! records:
//! - run_scenario: runs a named scenario and writes a JSON lines event log

pub mod config;
pub mod sim;

pub use config::Config;
