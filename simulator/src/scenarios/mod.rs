pub mod run_all;
pub mod sweep_runner;

use flowstats::SweepOutcome;
use std::path::PathBuf;

use crate::simulation_registry::SimulationRegistry;
use sweep_runner::{ScenarioError, SweepRunner};

/// Directory holding one `<scenario>/config.toml` per registered scenario
pub const SCENARIOS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/scenarios");
/// Directory receiving one `<scenario>/` results folder per run
pub const RESULTS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/results");

pub fn config_path(scenario: &str) -> PathBuf {
    PathBuf::from(SCENARIOS_DIR).join(scenario).join("config.toml")
}

/// Runs a registered scenario by its directory name
pub fn run_scenario(scenario: &str) -> Result<SweepOutcome, ScenarioError> {
    let registry = SimulationRegistry::new();
    let config = registry
        .get_by_scenario(scenario)
        .ok_or_else(|| ScenarioError::UnknownScenario(scenario.to_string()))?;
    SweepRunner::new(config.scenario, config_path(config.scenario), RESULTS_DIR).run()
}
