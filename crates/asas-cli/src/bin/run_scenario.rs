//! Run a traffic scenario through the separation engine.

use anyhow::{Context, Result};
use asas_cli::sim::{
    create_converging_scenario, create_crossing_scenario, create_head_on_scenario, EventLog,
    SimHost,
};
use asas_cli::Config;
use asas_core::{SeparationEngine, SeparationRules};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Available test scenarios
#[derive(Debug, Clone, ValueEnum)]
enum ScenarioType {
    /// Two aircraft on reciprocal tracks
    HeadOn,
    /// Two aircraft crossing at right angles
    Crossing,
    /// Arrival streams converging through zone rings
    Converging,
}

/// Separation-assurance scenario runner
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario to simulate
    #[arg(long, value_enum, default_value = "crossing")]
    scenario: ScenarioType,

    /// Center latitude
    #[arg(long, default_value_t = 52.3086)]
    lat: f64,

    /// Center longitude
    #[arg(long, default_value_t = 4.7639)]
    lon: f64,

    /// Simulated duration in seconds
    #[arg(long, default_value_t = 900.0)]
    duration: f64,

    /// Time step in seconds
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Separation rules JSON (overrides ASAS_RULES_PATH)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Event log destination (overrides ASAS_EVENTS_PATH)
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(rules) = args.rules {
        config.rules_path = Some(rules);
    }
    if let Some(events) = args.events {
        config.events_path = events;
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_new(&config.log_filter).context("invalid log filter")?)
        .init();

    anyhow::ensure!(args.dt > 0.0, "time step must be positive, got {}", args.dt);

    let rules = match &config.rules_path {
        Some(path) => SeparationRules::from_json_file(path)?,
        None => SeparationRules::default(),
    };
    let engine = SeparationEngine::new(rules)?;

    let scenario = match args.scenario {
        ScenarioType::HeadOn => create_head_on_scenario(args.lat, args.lon),
        ScenarioType::Crossing => create_crossing_scenario(args.lat, args.lon),
        ScenarioType::Converging => create_converging_scenario(args.lat, args.lon)?,
    };
    let name = scenario.name.clone();

    println!("Scenario: {name}");
    println!("  Aircraft: {}", scenario.aircraft.len());
    println!("  Duration: {}s, step: {}s", args.duration, args.dt);
    for (state, _) in &scenario.aircraft {
        println!("  - {}", state.id);
    }
    println!();

    let mut host = SimHost::new(engine, args.dt);
    host.load(scenario)?;
    let mut log = EventLog::create(&config.events_path, &name, host.engine().rules())?;

    let mut directives = 0usize;
    while host.simt() < args.duration && !host.traffic.is_empty() {
        let summary = host.step();
        directives += summary.directives;
        for event in &summary.events {
            println!(
                "[{:7.1}] {:?} {:?} {}",
                event.simt, event.kind, event.action, event.pair
            );
        }
        log.append(&summary.events)?;
    }

    let registry = host.engine().registry();
    println!("\nSimulation complete at t={:.1}s", host.simt());
    println!("  Conflicts:  {}", registry.conflict_count());
    println!("  Intrusions: {}", registry.intrusion_count());
    println!("  Resume directives: {directives}");
    println!("  Events written: {} -> {}", log.written(), log.path().display());
    log.finish()
}
