//! Central registry for all scenarios of the flow statistics simulator.
//! Maps simulation types to their scenario directory and description for easy lookup.

use std::collections::HashMap;

use super::interface::SimulationType;

/// Registration of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub name: &'static str,
    /// Directory under the scenarios folder holding `config.toml`, also the results folder name
    pub scenario: &'static str,
}

/// Registry that holds all scenario configurations
pub struct SimulationRegistry {
    simulations: HashMap<SimulationType, SimulationConfig>,
}

impl SimulationRegistry {
    pub fn new() -> Self {
        let mut simulations = HashMap::new();

        simulations.insert(SimulationType::CbrMobility, SimulationConfig {
            name: "CBR with Mobility",
            scenario: "cbr_mobility",
        });
        simulations.insert(SimulationType::CbrNoMobility, SimulationConfig {
            name: "CBR without Mobility",
            scenario: "cbr_no_mobility",
        });
        simulations.insert(SimulationType::BurstMobility, SimulationConfig {
            name: "Burst with Mobility",
            scenario: "burst_mobility",
        });
        simulations.insert(SimulationType::BurstNoMobility, SimulationConfig {
            name: "Burst without Mobility",
            scenario: "burst_no_mobility",
        });
        simulations.insert(SimulationType::BurstNoMobilityLarge, SimulationConfig {
            name: "Burst without Mobility (from 35 nodes)",
            scenario: "burst_no_mobility_large",
        });
        simulations.insert(SimulationType::BurstShort, SimulationConfig {
            name: "Short Burst",
            scenario: "burst_short",
        });

        Self { simulations }
    }

    pub fn get(&self, simulation_type: &SimulationType) -> Option<&SimulationConfig> {
        self.simulations.get(simulation_type)
    }

    pub fn get_by_scenario(&self, scenario: &str) -> Option<&SimulationConfig> {
        self.scenarios().into_iter().find(|config| config.scenario == scenario)
    }

    /// Registered scenarios in menu order
    pub fn scenarios(&self) -> Vec<&SimulationConfig> {
        SimulationType::SCENARIOS
            .iter()
            .filter_map(|simulation_type| self.get(simulation_type))
            .collect()
    }
}

impl Default for SimulationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
