//! Aggregation of all flows of one configuration into per-flow and network-wide figures.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::flow_accumulator::{sample_std_dev, shifted_mean, FlowAccumulator, FlowSummary, StatsError};
use crate::types::{DerivedMetric, FlowId, FlowRecord, Statistic};

#[cfg(test)]
mod tests;

/// Network-wide mean and dispersion of each derived metric across the flows of a configuration
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    pub flows: usize,
    /// Indexed by [`DerivedMetric::index`]
    pub derived: [Statistic; DerivedMetric::ALL.len()],
}

impl NetworkSummary {
    pub fn derived(&self, metric: DerivedMetric) -> Statistic {
        self.derived[metric.index()]
    }
}

/// Finalized statistics of one configuration, ready for the report
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationSummary {
    /// Node count the configuration was run with
    pub nodes: u32,
    pub repetitions: usize,
    /// One entry per flow, in ascending flow order
    pub flows: Vec<FlowSummary>,
    pub network: NetworkSummary,
}

/// Owns one [`FlowAccumulator`] per flow of a configuration
pub struct ConfigurationAggregator {
    nodes: u32,
    repetitions: usize,
    /// Ordered by flow identity, which is also the report order
    flows: BTreeMap<FlowId, FlowAccumulator>,
    /// Repetitions ingested so far
    ingested: usize,
}

impl ConfigurationAggregator {
    pub fn new(nodes: u32, repetitions: usize) -> Self {
        Self {
            nodes,
            repetitions,
            flows: BTreeMap::new(),
            ingested: 0,
        }
    }

    pub fn nodes(&self) -> u32 {
        self.nodes
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Number of distinct flows discovered so far
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn ingested_repetitions(&self) -> usize {
        self.ingested
    }

    pub fn accumulator(&self, flow_id: FlowId) -> Option<&FlowAccumulator> {
        self.flows.get(&flow_id)
    }

    /// Routes every record of one repetition to its flow's accumulator.
    ///
    /// New flows are only accepted in repetition 0. After the records are routed, every
    /// known flow must have been observed in this repetition.
    pub fn ingest(&mut self, repetition: usize, records: &[FlowRecord]) -> Result<(), StatsError> {
        if repetition >= self.repetitions {
            return Err(StatsError::RepetitionOutOfRange {
                repetition,
                repetitions: self.repetitions,
            });
        }

        for record in records {
            match self.flows.get_mut(&record.flow_id) {
                Some(accumulator) => accumulator.record(repetition, record)?,
                None if repetition == 0 => {
                    let mut accumulator = FlowAccumulator::new(record, self.repetitions);
                    accumulator.record(repetition, record)?;
                    self.flows.insert(record.flow_id, accumulator);
                }
                None => {
                    return Err(StatsError::LateFlow {
                        flow_id: record.flow_id,
                        repetition,
                    })
                }
            }
        }

        if let Some(missing) = self.flows.values().find(|flow| !flow.is_recorded(repetition)) {
            return Err(StatsError::MissingObservation {
                flow_id: missing.flow_id(),
                repetition,
            });
        }

        self.ingested += 1;
        tracing::debug!(
            "Ingested repetition {} of {} with {} flows",
            repetition + 1,
            self.repetitions,
            records.len()
        );
        Ok(())
    }

    /// Computes every flow's statistics and rolls the derived metrics up network-wide.
    ///
    /// The network figures are the mean and sample stddev of the per-flow report values.
    pub fn finalize(&self) -> Result<ConfigurationSummary, StatsError> {
        if self.flows.is_empty() {
            return Err(StatsError::NoFlows);
        }

        let flows = self
            .flows
            .values()
            .map(FlowAccumulator::summary)
            .collect::<Result<Vec<_>, _>>()?;

        let mut derived = [Statistic { mean: 0.0, std_dev: 0.0 }; DerivedMetric::ALL.len()];
        for metric in DerivedMetric::ALL {
            let values: Vec<f64> = flows.iter().map(|flow| flow.derived(metric).mean).collect();
            let mean = shifted_mean(&values);
            derived[metric.index()] = Statistic {
                mean,
                std_dev: sample_std_dev(&values, mean)?,
            };
        }

        Ok(ConfigurationSummary {
            nodes: self.nodes,
            repetitions: self.repetitions,
            network: NetworkSummary {
                flows: flows.len(),
                derived,
            },
            flows,
        })
    }
}
