//! Semicolon-delimited rendering of finalized configurations.
//!
//! Each block starts with the configuration's node and repetition counts, followed by
//! the column header, one row per flow and a closing `Network` row. Every field is
//! terminated by the delimiter and blocks are separated by a blank line.

use std::io::Write;
use thiserror::Error;

use crate::config_aggregator::{ConfigurationSummary, NetworkSummary};
use crate::flow_accumulator::FlowSummary;
use crate::types::constants::{DISPERSION_COLUMN, REPORT_DELIMITER};
use crate::types::{DerivedMetric, RawCounter, Statistic};

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes report blocks to a text sink
pub struct ReportEmitter<W: Write> {
    sink: W,
    blocks: usize,
}

impl<W: Write> ReportEmitter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, blocks: 0 }
    }

    /// Number of blocks written so far
    pub fn blocks_written(&self) -> usize {
        self.blocks
    }

    /// Writes the block of one finalized configuration
    pub fn emit(&mut self, summary: &ConfigurationSummary) -> Result<(), ReportError> {
        writeln!(self.sink, "{}", fields(["Nodes".to_string(), summary.nodes.to_string()]))?;
        writeln!(
            self.sink,
            "{}",
            fields(["Repetitions".to_string(), summary.repetitions.to_string()])
        )?;
        writeln!(self.sink, "{}", header_row())?;
        for flow in &summary.flows {
            writeln!(self.sink, "{}", flow_row(flow))?;
        }
        writeln!(self.sink, "{}", network_row(&summary.network))?;
        writeln!(self.sink)?;
        self.sink.flush()?;
        self.blocks += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Joins fields with the delimiter, terminating the last one as well
fn fields<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for value in values {
        line.push_str(value.as_ref());
        line.push(REPORT_DELIMITER);
    }
    line
}

fn statistic_fields(statistic: Statistic) -> [String; 2] {
    [statistic.mean.to_string(), statistic.std_dev.to_string()]
}

/// Column header naming every raw counter and derived metric, each followed by its dispersion
pub fn header_row() -> String {
    let mut columns = vec!["Flow", "Source", "Destination"];
    for counter in RawCounter::ALL {
        columns.push(counter.column_name());
        columns.push(DISPERSION_COLUMN);
    }
    for metric in DerivedMetric::ALL {
        columns.push(metric.column_name());
        columns.push(DISPERSION_COLUMN);
    }
    fields(columns)
}

pub fn flow_row(flow: &FlowSummary) -> String {
    let mut columns = vec![
        flow.flow_id.to_string(),
        flow.source.to_string(),
        flow.destination.to_string(),
    ];
    columns.extend(flow.raw.iter().flat_map(|statistic| statistic_fields(*statistic)));
    columns.extend(flow.derived.iter().flat_map(|statistic| statistic_fields(*statistic)));
    fields(columns)
}

/// Network-wide row, aligned with the flow rows: raw-counter columns stay empty
pub fn network_row(network: &NetworkSummary) -> String {
    let mut columns = vec!["Network".to_string(), String::new(), String::new()];
    columns.extend(std::iter::repeat(String::new()).take(RawCounter::ALL.len() * 2));
    columns.extend(network.derived.iter().flat_map(|statistic| statistic_fields(*statistic)));
    fields(columns)
}

/// JSON form of a finalized configuration; non-finite numbers become `null`
pub fn summary_to_json(summary: &ConfigurationSummary) -> Result<serde_json::Value, ReportError> {
    Ok(serde_json::to_value(summary)?)
}
