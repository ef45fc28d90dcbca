pub mod types;
pub mod flow_accumulator;
pub mod config_aggregator;
pub mod report;
pub mod sweep;
pub mod utils;

#[cfg(any(test, feature = "test"))]
pub mod testing;

pub use config_aggregator::{ConfigurationAggregator, ConfigurationSummary, NetworkSummary};
pub use flow_accumulator::{sample_std_dev, shifted_mean, FlowAccumulator, FlowSummary, StatsError};
pub use report::{ReportEmitter, ReportError};
pub use sweep::{FlowSimulator, SimulatorError, SweepController, SweepError, SweepOutcome, SweepPlan, SweepPoint, SweepProgress};
pub use types::{DerivedMetric, FlowId, FlowRecord, RawCounter, Statistic};
