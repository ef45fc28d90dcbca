//! Sweep controller driving the external simulator through every configuration.
//!
//! Configurations run strictly one after another and each repetition blocks on the
//! simulator. A configuration's aggregator lives only for that configuration.

use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

use crate::config_aggregator::{ConfigurationAggregator, ConfigurationSummary};
use crate::flow_accumulator::StatsError;
use crate::report::{ReportEmitter, ReportError};
use crate::types::constants::DEFAULT_MAX_NODES;
use crate::types::FlowRecord;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Simulation run failed: {0}")]
    RunFailed(String),
    #[error("Invalid simulation parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration with {nodes} nodes exceeds the supported maximum of {max_nodes}")]
    LimitExceeded { nodes: u32, max_nodes: u32 },
    #[error("Inconsistent flow data for {nodes} nodes: {source}")]
    Stats {
        nodes: u32,
        #[source]
        source: StatsError,
    },
    #[error("Simulation of {nodes} nodes failed in repetition {repetition}: {source}")]
    Simulator {
        nodes: u32,
        repetition: usize,
        #[source]
        source: SimulatorError,
    },
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One point of the sweep as seen by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// 0-based position in the sweep
    pub index: usize,
    /// Number of wireless stations
    pub nodes: u32,
    /// Number of flows the classifier is expected to report
    pub flows: u32,
}

/// The external network simulator: one call is one independently seeded repetition
pub trait FlowSimulator {
    fn run(&mut self, point: &SweepPoint, seed: u64) -> Result<Vec<FlowRecord>, SimulatorError>;
}

/// Shape of a node-count sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub start_nodes: u32,
    pub node_step: u32,
    pub num_configurations: usize,
    pub repetitions: usize,
    /// Flows per station: 1 for one-way traffic, 2 when the reverse stream is its own flow
    pub flows_per_node: u32,
    pub max_nodes: u32,
    pub base_seed: u64,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            start_nodes: 5,
            node_step: 5,
            num_configurations: 8,
            repetitions: 10,
            flows_per_node: 2,
            max_nodes: DEFAULT_MAX_NODES,
            base_seed: 0,
        }
    }
}

impl SweepPlan {
    /// The configurations of the sweep in execution order
    pub fn points(&self) -> Vec<SweepPoint> {
        (0..self.num_configurations)
            .map(|index| {
                let nodes = self.start_nodes + self.node_step * index as u32;
                SweepPoint {
                    index,
                    nodes,
                    flows: nodes * self.flows_per_node,
                }
            })
            .collect()
    }

    /// Seed of repetition `repetition` of configuration `point`, distinct across the sweep
    pub fn seed(&self, point: &SweepPoint, repetition: usize) -> u64 {
        self.base_seed + (point.index * self.repetitions + repetition) as u64 + 1
    }

    /// Total number of simulator runs in the sweep
    pub fn total_runs(&self) -> usize {
        self.num_configurations * self.repetitions
    }
}

/// Progress notifications for the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepProgress {
    ConfigurationStarted(SweepPoint),
    RepetitionCompleted { point: SweepPoint, repetition: usize },
    ConfigurationCompleted(SweepPoint),
}

/// Summaries of every configuration that completed
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub configurations: Vec<ConfigurationSummary>,
}

pub struct SweepController {
    plan: SweepPlan,
}

impl SweepController {
    pub fn new(plan: SweepPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    /// Runs the sweep, writing one report block per configuration to `sink`
    pub fn run<S, W>(&self, simulator: &mut S, sink: W) -> Result<SweepOutcome, SweepError>
    where
        S: FlowSimulator + ?Sized,
        W: Write,
    {
        self.run_with_progress(simulator, sink, |_| {})
    }

    /// Like [`SweepController::run`], reporting progress after every step.
    ///
    /// Stops at the first error. Blocks of configurations completed before the error
    /// have already been written.
    pub fn run_with_progress<S, W, P>(
        &self,
        simulator: &mut S,
        sink: W,
        mut progress: P,
    ) -> Result<SweepOutcome, SweepError>
    where
        S: FlowSimulator + ?Sized,
        W: Write,
        P: FnMut(SweepProgress),
    {
        let mut emitter = ReportEmitter::new(sink);
        let mut configurations = Vec::with_capacity(self.plan.num_configurations);

        for point in self.plan.points() {
            if point.nodes > self.plan.max_nodes {
                tracing::warn!(
                    "Rejecting configuration with {} nodes, maximum is {}",
                    point.nodes,
                    self.plan.max_nodes
                );
                return Err(SweepError::LimitExceeded {
                    nodes: point.nodes,
                    max_nodes: self.plan.max_nodes,
                });
            }

            tracing::info!(
                "Running configuration {}/{} with {} nodes ({} flows), {} repetitions",
                point.index + 1,
                self.plan.num_configurations,
                point.nodes,
                point.flows,
                self.plan.repetitions
            );
            progress(SweepProgress::ConfigurationStarted(point));

            let summary = self.run_configuration(simulator, &point, &mut progress)?;
            emitter.emit(&summary)?;
            progress(SweepProgress::ConfigurationCompleted(point));
            configurations.push(summary);
        }

        Ok(SweepOutcome { configurations })
    }

    fn run_configuration<S, P>(
        &self,
        simulator: &mut S,
        point: &SweepPoint,
        progress: &mut P,
    ) -> Result<ConfigurationSummary, SweepError>
    where
        S: FlowSimulator + ?Sized,
        P: FnMut(SweepProgress),
    {
        let mut aggregator = ConfigurationAggregator::new(point.nodes, self.plan.repetitions);

        for repetition in 0..self.plan.repetitions {
            let seed = self.plan.seed(point, repetition);
            let records = simulator.run(point, seed).map_err(|source| SweepError::Simulator {
                nodes: point.nodes,
                repetition,
                source,
            })?;
            tracing::debug!(
                "Repetition {}/{} for {} nodes returned {} flow records (seed {})",
                repetition + 1,
                self.plan.repetitions,
                point.nodes,
                records.len(),
                seed
            );

            aggregator
                .ingest(repetition, &records)
                .map_err(|source| SweepError::Stats { nodes: point.nodes, source })?;
            progress(SweepProgress::RepetitionCompleted { point: *point, repetition });
        }

        aggregator
            .finalize()
            .map_err(|source| SweepError::Stats { nodes: point.nodes, source })
    }
}
