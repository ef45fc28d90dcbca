//! Configuration loader and validator for the flow statistics simulator.
//! Handles parsing, validation, and conversion of scenario configuration files into sweep plans.

use flowstats::types::constants::DEFAULT_MAX_NODES;
use flowstats::SweepPlan;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// Main Configuration Structs
// ------------------------------------------------------------------------------------------------

/// Main configuration struct for one scenario.
///
/// A scenario is a node-count sweep: every configuration of the sweep is simulated
/// `num_repetitions` times and the flow statistics of those repetitions are aggregated.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    /// Shape of the node-count sweep
    pub sweep: SweepConfig,
    /// Topology limits and simulated time
    pub network: NetworkConfig,
    /// Application traffic offered by every station
    pub traffic: TrafficConfig,
}

/// Configuration of the node-count sweep.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SweepConfig {
    /// Number of stations in the first configuration
    pub start_nodes: u32,
    /// Stations added from one configuration to the next
    pub node_step: u32,
    /// Number of configurations in the sweep
    pub num_configurations: usize,
    /// Independently seeded repetitions per configuration
    pub num_repetitions: usize,
    /// Offset of every repetition seed
    #[serde(default)]
    pub base_seed: u64,
}

/// Configuration of the simulated network.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Largest node count a configuration may use
    #[serde(default = "default_max_nodes")]
    pub max_nodes: u32,
    /// Simulated time of one repetition, in seconds
    pub duration_seconds: f64,
    /// Time the client applications start, in seconds
    pub app_start_seconds: f64,
}

fn default_max_nodes() -> u32 {
    DEFAULT_MAX_NODES
}

/// Traffic pattern of the station applications
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrafficPattern {
    /// UDP constant bit rate, one flow per station
    Cbr,
    /// TCP on/off bursts, a data flow and an ACK flow per station
    Burst,
}

impl TrafficPattern {
    /// Flows the classifier reports for each station
    pub fn flows_per_node(self) -> u32 {
        match self {
            TrafficPattern::Cbr => 1,
            TrafficPattern::Burst => 2,
        }
    }
}

/// Configuration of the offered traffic.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TrafficConfig {
    pub pattern: TrafficPattern,
    /// Whether stations random-walk around their grid position
    pub mobility: bool,
}

// ------------------------------------------------------------------------------------------------
// Error Types and Validation
// ------------------------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

fn validate_sweep(sweep: &SweepConfig, traffic: &TrafficConfig) -> Result<(), ConfigError> {
    if sweep.start_nodes == 0 {
        return Err(ConfigError::ValidationError("Start node count must be positive".into()));
    }
    if sweep.node_step == 0 {
        return Err(ConfigError::ValidationError("Node step must be positive".into()));
    }
    if sweep.num_configurations == 0 {
        return Err(ConfigError::ValidationError("Number of configurations must be positive".into()));
    }
    if sweep.num_repetitions < 2 {
        return Err(ConfigError::ValidationError(
            "At least two repetitions are needed for a sample standard deviation".into(),
        ));
    }
    if sweep.start_nodes * traffic.pattern.flows_per_node() < 2 {
        return Err(ConfigError::ValidationError(
            "At least two flows are needed for the network-wide dispersion".into(),
        ));
    }
    Ok(())
}

fn validate_network(network: &NetworkConfig) -> Result<(), ConfigError> {
    if network.max_nodes == 0 {
        return Err(ConfigError::ValidationError("Maximum node count must be positive".into()));
    }
    if network.app_start_seconds < 0.0 {
        return Err(ConfigError::ValidationError("Application start time must be non-negative".into()));
    }
    if network.duration_seconds <= network.app_start_seconds {
        return Err(ConfigError::ValidationError(
            "Simulation duration must be longer than the application start time".into(),
        ));
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Configuration Implementation Methods
// ------------------------------------------------------------------------------------------------

impl ScenarioConfig {
    /// Reads, parses and validates a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path)?;
        Self::parse(&config_str)
    }

    /// Parses and validates scenario TOML
    pub fn parse(config_str: &str) -> Result<Self, ConfigError> {
        let config: ScenarioConfig = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Node limits are left to the sweep controller, which checks them per configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sweep(&self.sweep, &self.traffic)?;
        validate_network(&self.network)
    }

    pub fn sweep_plan(&self) -> SweepPlan {
        SweepPlan {
            start_nodes: self.sweep.start_nodes,
            node_step: self.sweep.node_step,
            num_configurations: self.sweep.num_configurations,
            repetitions: self.sweep.num_repetitions,
            flows_per_node: self.traffic.pattern.flows_per_node(),
            max_nodes: self.network.max_nodes,
            base_seed: self.sweep.base_seed,
        }
    }

    /// Simulated time during which the applications send, in seconds
    pub fn active_seconds(&self) -> f64 {
        self.network.duration_seconds - self.network.app_start_seconds
    }
}
