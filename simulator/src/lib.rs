pub mod config;
pub mod interface;
pub mod network;
pub mod scenarios;
pub mod simulation_registry;

pub use config::{ConfigError, ScenarioConfig, TrafficPattern};
pub use network::SyntheticFlowSimulator;
pub use scenarios::sweep_runner::{ScenarioError, SweepRunner};
