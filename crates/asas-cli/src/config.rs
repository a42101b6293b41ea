//! CLI configuration from environment.

use std::env;
use std::path::PathBuf;

/// Default tracing directive when `ASAS_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "asas_core=info,asas_cli=info";

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file with separation rules; built-in defaults when absent
    pub rules_path: Option<PathBuf>,
    /// JSON lines event log destination
    pub events_path: PathBuf,
    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            rules_path: env::var("ASAS_RULES_PATH").ok().map(PathBuf::from),
            events_path: env::var("ASAS_EVENTS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("conflict_events.jsonl")),
            log_filter: env::var("ASAS_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}
