use flowstats::utils::logging;
use std::time::Instant;

use super::run_scenario;
use super::sweep_runner::ScenarioError;
use crate::simulation_registry::SimulationRegistry;

/// Runs every registered scenario sequentially, stopping at the first failure
pub fn run_all() -> Result<(), ScenarioError> {
    let start_time = Instant::now();
    let registry = SimulationRegistry::new();

    logging::log("SIMULATOR", "=== Starting All Scenarios ===");
    for config in registry.scenarios() {
        logging::log("SIMULATOR", &format!("=== Running {} ===", config.name));
        run_scenario(config.scenario)?;
        logging::log("SIMULATOR", &format!("{} completed successfully", config.name));
    }

    let total_time = start_time.elapsed();
    logging::log("SIMULATOR", "=== All Scenarios Completed Successfully ===");
    logging::log("SIMULATOR", &format!("Total execution time: {:.2?}", total_time));

    println!("All scenarios completed successfully!");
    println!("Total execution time: {:.2?}", total_time);
    Ok(())
}
