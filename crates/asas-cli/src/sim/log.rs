//! JSON lines writer for conflict and intrusion events.

use anyhow::{Context, Result};
use asas_core::{ConflictEvent, SeparationRules};
use chrono::Utc;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only event log. The first line is a header describing the run.
pub struct EventLog {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl EventLog {
    pub fn create(path: &Path, scenario: &str, rules: &SeparationRules) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("creating event log {}", path.display()))?;
        let mut log = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        };
        let header = json!({
            "started_at": Utc::now().to_rfc3339(),
            "scenario": scenario,
            "rules": rules,
        });
        log.write_line(&header)?;
        Ok(log)
    }

    pub fn append(&mut self, events: &[ConflictEvent]) -> Result<()> {
        for event in events {
            self.write_line(event)?;
            self.written += 1;
        }
        Ok(())
    }

    /// Number of events written, excluding the header.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("flushing event log {}", self.path.display()))
    }

    fn write_line<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value).context("serializing event")?;
        self.writer
            .write_all(b"\n")
            .with_context(|| format!("writing event log {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asas_core::{AircraftState, SeparationEngine, Traffic};

    #[test]
    fn writes_header_and_events() {
        let path = std::env::temp_dir().join(format!("asas-events-{}.jsonl", std::process::id()));
        let rules = SeparationRules::default();
        let mut engine = SeparationEngine::new(rules.clone()).unwrap();
        let mut traf = Traffic::new();
        traf.create(AircraftState::new("AC01", 0.0, 0.0, 1000.0), 0.0);
        traf.create(AircraftState::new("AC02", 0.0, 0.001, 1000.0), 0.0);
        let report = engine.tick(&mut traf, 1.0);

        let mut log = EventLog::create(&path, "unit", &rules).unwrap();
        log.append(&report.events).unwrap();
        assert_eq!(log.written(), report.events.len());
        log.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), report.events.len() + 1);
        assert_eq!(lines[0]["scenario"], "unit");
        assert_eq!(lines[1]["pair"], "AC01 AC02");
        std::fs::remove_file(&path).unwrap();
    }
}
