//! Per-flow accumulation of raw counters across the repetitions of one configuration.
//!
//! Running sums give the reported means; the retained per-repetition records give the
//! dispersion. Sums are kept as offsets from the first recorded value, so repetitions
//! that agree yield that value back exactly as their mean. Derived ratios are computed twice on purpose: once from the mean counters
//! (ratio of totals over the whole experiment) and once per repetition (run-to-run
//! variability). Zero denominators are not special-cased and surface as `NaN`/`inf`.

use serde::Serialize;
use std::net::Ipv4Addr;
use thiserror::Error;

use crate::types::{DerivedMetric, FlowId, FlowRecord, RawCounter, Statistic};


const RAW_COUNTERS: usize = RawCounter::ALL.len();
const DERIVED_METRICS: usize = DerivedMetric::ALL.len();

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("Sample standard deviation needs at least two values, got {0}")]
    InsufficientSamples(usize),
    #[error("Repetition {repetition} is out of range for {repetitions} repetitions")]
    RepetitionOutOfRange { repetition: usize, repetitions: usize },
    #[error("Flow {flow_id} was already recorded for repetition {repetition}")]
    DuplicateObservation { flow_id: FlowId, repetition: usize },
    #[error("Flow {flow_id} was not observed in repetition {repetition}")]
    MissingObservation { flow_id: FlowId, repetition: usize },
    #[error("Flow {flow_id} first appeared in repetition {repetition}, flows must all appear in repetition 0")]
    LateFlow { flow_id: FlowId, repetition: usize },
    #[error("Record for flow {found} routed to the accumulator of flow {expected}")]
    FlowMismatch { expected: FlowId, found: FlowId },
    #[error("Configuration finished without any flow")]
    NoFlows,
}

/// Per-flow means and dispersions once every repetition has been recorded
#[derive(Debug, Clone, Serialize)]
pub struct FlowSummary {
    pub flow_id: FlowId,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Indexed by [`RawCounter::index`]
    pub raw: [Statistic; RAW_COUNTERS],
    /// Indexed by [`DerivedMetric::index`]
    pub derived: [Statistic; DERIVED_METRICS],
}

impl FlowSummary {
    pub fn raw(&self, counter: RawCounter) -> Statistic {
        self.raw[counter.index()]
    }

    pub fn derived(&self, metric: DerivedMetric) -> Statistic {
        self.derived[metric.index()]
    }
}

/// Accumulates the records of a single flow across repetitions
#[derive(Debug, Clone)]
pub struct FlowAccumulator {
    flow_id: FlowId,
    /// Captured from the first record and never re-checked
    source: Ipv4Addr,
    destination: Ipv4Addr,
    /// Counters of the first recorded repetition, the origin of `offsets`
    origin: Option<[f64; RAW_COUNTERS]>,
    /// Running sum of every raw counter minus its origin, indexed by [`RawCounter::index`]
    offsets: [f64; RAW_COUNTERS],
    /// One slot per repetition; `None` until that repetition is recorded
    repetitions: Vec<Option<FlowRecord>>,
    recorded: usize,
}

impl FlowAccumulator {
    /// Creates an accumulator for `repetitions` repetitions, taking identity and
    /// addresses from the first record seen for this flow
    pub fn new(first_record: &FlowRecord, repetitions: usize) -> Self {
        Self {
            flow_id: first_record.flow_id,
            source: first_record.source,
            destination: first_record.destination,
            origin: None,
            offsets: [0.0; RAW_COUNTERS],
            repetitions: vec![None; repetitions],
            recorded: 0,
        }
    }

    pub fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    pub fn source(&self) -> Ipv4Addr {
        self.source
    }

    pub fn destination(&self) -> Ipv4Addr {
        self.destination
    }

    /// Number of repetitions recorded so far
    pub fn recorded_repetitions(&self) -> usize {
        self.recorded
    }

    /// Whether `repetition` has already been recorded for this flow
    pub fn is_recorded(&self, repetition: usize) -> bool {
        matches!(self.repetitions.get(repetition), Some(Some(_)))
    }

    /// Adds one repetition's counters to the running sums and retains them for dispersion
    pub fn record(&mut self, repetition: usize, record: &FlowRecord) -> Result<(), StatsError> {
        if record.flow_id != self.flow_id {
            return Err(StatsError::FlowMismatch {
                expected: self.flow_id,
                found: record.flow_id,
            });
        }
        let total = self.repetitions.len();
        let slot = self
            .repetitions
            .get_mut(repetition)
            .ok_or(StatsError::RepetitionOutOfRange {
                repetition,
                repetitions: total,
            })?;
        if slot.is_some() {
            return Err(StatsError::DuplicateObservation {
                flow_id: self.flow_id,
                repetition,
            });
        }

        let counters = record.counters();
        let origin = *self.origin.get_or_insert(counters);
        for ((offset, value), origin) in self.offsets.iter_mut().zip(counters).zip(origin) {
            *offset += value - origin;
        }
        *slot = Some(record.clone());
        self.recorded += 1;
        Ok(())
    }

    /// Mean of `counter` over the repetitions recorded so far; `NaN` before the first one
    pub fn mean_raw(&self, counter: RawCounter) -> f64 {
        let i = counter.index();
        match self.origin {
            Some(origin) => origin[i] + self.offsets[i] / self.recorded as f64,
            None => f64::NAN,
        }
    }

    fn mean_counters(&self) -> [f64; RAW_COUNTERS] {
        RawCounter::ALL.map(|counter| self.mean_raw(counter))
    }

    /// Every retained record in repetition order, failing on the first unobserved slot
    fn observed_records(&self) -> Result<Vec<&FlowRecord>, StatsError> {
        self.repetitions
            .iter()
            .enumerate()
            .map(|(repetition, slot)| {
                slot.as_ref().ok_or(StatsError::MissingObservation {
                    flow_id: self.flow_id,
                    repetition,
                })
            })
            .collect()
    }

    /// Repetitions with no record for this flow, in ascending order
    pub fn missing_repetitions(&self) -> Vec<usize> {
        self.repetitions
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(repetition, _)| repetition)
            .collect()
    }

    /// Mean and sample standard deviation of one raw counter across all repetitions
    pub fn raw_statistic(&self, counter: RawCounter) -> Result<Statistic, StatsError> {
        let records = self.observed_records()?;
        let values: Vec<f64> = records.iter().map(|record| record.counter(counter)).collect();
        let mean = self.mean_raw(counter);
        Ok(Statistic {
            mean,
            std_dev: sample_std_dev(&values, mean)?,
        })
    }

    /// Report value and run-to-run dispersion of every derived metric.
    ///
    /// The report value applies the ratio formulas to the mean counters. The dispersion
    /// applies the same formulas to each repetition's own counters and measures their
    /// spread around the report value.
    pub fn derived_ratios(&self) -> Result<[Statistic; DERIVED_METRICS], StatsError> {
        let records = self.observed_records()?;
        let report = derived_values(&self.mean_counters());
        let per_repetition: Vec<[f64; DERIVED_METRICS]> = records
            .iter()
            .map(|record| derived_values(&record.counters()))
            .collect();

        let mut ratios = [Statistic { mean: 0.0, std_dev: 0.0 }; DERIVED_METRICS];
        for metric in DerivedMetric::ALL {
            let i = metric.index();
            let values: Vec<f64> = per_repetition.iter().map(|values| values[i]).collect();
            ratios[i] = Statistic {
                mean: report[i],
                std_dev: sample_std_dev(&values, report[i])?,
            };
        }
        Ok(ratios)
    }

    /// Raw and derived statistics for the report
    pub fn summary(&self) -> Result<FlowSummary, StatsError> {
        let mut raw = [Statistic { mean: 0.0, std_dev: 0.0 }; RAW_COUNTERS];
        for counter in RawCounter::ALL {
            raw[counter.index()] = self.raw_statistic(counter)?;
        }
        Ok(FlowSummary {
            flow_id: self.flow_id,
            source: self.source,
            destination: self.destination,
            raw,
            derived: self.derived_ratios()?,
        })
    }
}

/// Applies the derived-metric formulas to one set of raw counters
fn derived_values(counters: &[f64; RAW_COUNTERS]) -> [f64; DERIVED_METRICS] {
    let c = |counter: RawCounter| counters[counter.index()];

    let rx_packets = c(RawCounter::RxPackets);
    let lost_packets = c(RawCounter::LostPackets);

    let mut values = [0.0; DERIVED_METRICS];
    values[DerivedMetric::MeanDelay.index()] = c(RawCounter::DelaySum) / rx_packets;
    values[DerivedMetric::MeanJitter.index()] = c(RawCounter::JitterSum) / (rx_packets - 1.0);
    values[DerivedMetric::MeanTransmittedPacketSize.index()] =
        c(RawCounter::TxBytes) / c(RawCounter::TxPackets);
    values[DerivedMetric::MeanReceivedPacketSize.index()] = c(RawCounter::RxBytes) / rx_packets;
    values[DerivedMetric::MeanTransmittedBitrate.index()] = 8.0 * c(RawCounter::TxBytes)
        / (c(RawCounter::TimeLastTxPacket) - c(RawCounter::TimeFirstTxPacket));
    values[DerivedMetric::MeanReceivedBitrate.index()] = 8.0 * c(RawCounter::RxBytes)
        / (c(RawCounter::TimeLastRxPacket) - c(RawCounter::TimeFirstRxPacket));
    values[DerivedMetric::MeanPacketLossRatio.index()] = lost_packets / (rx_packets + lost_packets);
    values
}

/// Arithmetic mean computed as `v0 + Σ(v − v0) / n`, exact when every value is equal
pub fn shifted_mean(values: &[f64]) -> f64 {
    match values.first() {
        Some(&origin) => {
            origin + values.iter().map(|value| value - origin).sum::<f64>() / values.len() as f64
        }
        None => f64::NAN,
    }
}

/// Unbiased sample standard deviation `sqrt(Σ(v − mean)² / (n − 1))` of `values` around `mean`.
///
/// `mean` is taken as given and is not required to be the arithmetic mean of `values`.
pub fn sample_std_dev(values: &[f64], mean: f64) -> Result<f64, StatsError> {
    if values.len() < 2 {
        return Err(StatsError::InsufficientSamples(values.len()));
    }
    let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Ok((squares / (values.len() - 1) as f64).sqrt())
}
