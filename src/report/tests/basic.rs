use crate::config_aggregator::{ConfigurationAggregator, ConfigurationSummary};
use crate::report::{flow_row, header_row, network_row, summary_to_json, ReportEmitter};
use crate::testing::FlowRecordBuilder;
use crate::types::{DerivedMetric, FlowRecord, RawCounter};

/// Columns per row: identity, two addresses, then a value and dispersion per metric
const COLUMNS: usize = 3 + 2 * (RawCounter::ALL.len() + DerivedMetric::ALL.len());

fn two_flow_summary(silent_second_flow: bool) -> ConfigurationSummary {
    let mut aggregator = ConfigurationAggregator::new(1, 2);
    for repetition in 0..2 {
        let second: FlowRecord = if silent_second_flow {
            FlowRecordBuilder::new(2).times(2.0, 0.0, 6.0, 0.0).bytes(800, 0).packets(8, 0, 8).build()
        } else {
            FlowRecordBuilder::new(2).times(2.0, 2.5, 6.0, 6.5).bytes(800, 800).packets(8, 8, 0).build()
        };
        let records = vec![
            FlowRecordBuilder::new(1)
                .times(2.0, 2.5, 10.0, 10.5)
                .delays(0.5, 0.25, 0.125)
                .bytes(1000, 1000)
                .packets(10, 10, 0)
                .build(),
            second,
        ];
        aggregator.ingest(repetition, &records).unwrap();
    }
    aggregator.finalize().unwrap()
}

fn split(line: &str) -> Vec<&str> {
    let trimmed = line.strip_suffix(';').expect("Every row ends with the delimiter");
    trimmed.split(';').collect()
}

#[test]
fn test_header_names_every_column() {
    let header = header_row();
    let columns = split(&header);
    assert_eq!(columns.len(), COLUMNS);
    assert_eq!(&columns[..5], &["Flow", "Source", "Destination", "timeFirstTxPacket", "dp"]);
    assert_eq!(columns[COLUMNS - 2], "MeanPacketLossRatio");
    assert_eq!(columns[COLUMNS - 1], "dp");
    assert_eq!(columns.iter().filter(|column| **column == "dp").count(), 19);
}

#[test]
fn test_flow_row_layout() {
    let summary = two_flow_summary(false);
    let row = flow_row(&summary.flows[0]);
    let columns = split(&row);

    assert_eq!(columns.len(), COLUMNS);
    assert_eq!(columns[0], "1");
    assert_eq!(columns[1], "192.168.0.2");
    assert_eq!(columns[2], "10.0.0.2");
    // timeFirstTxPacket mean and dispersion
    assert_eq!(columns[3], "2");
    assert_eq!(columns[4], "0");
    // MeanTransmittedPacketSize follows the raw counters and the delay/jitter pairs
    let tx_size = 3 + 2 * RawCounter::ALL.len() + 2 * DerivedMetric::MeanTransmittedPacketSize.index();
    assert_eq!(columns[tx_size], "100");
}

#[test]
fn test_non_finite_values_are_rendered_verbatim() {
    let summary = two_flow_summary(true);
    let columns_owned = flow_row(&summary.flows[1]);
    let columns = split(&columns_owned);
    let rx_size = 3 + 2 * RawCounter::ALL.len() + 2 * DerivedMetric::MeanReceivedPacketSize.index();
    assert_eq!(columns[rx_size], "NaN");
    assert_eq!(columns[rx_size + 1], "NaN");
}

#[test]
fn test_network_row_is_aligned() {
    let summary = two_flow_summary(false);
    let row = network_row(&summary.network);
    let columns = split(&row);

    assert_eq!(columns.len(), COLUMNS);
    assert_eq!(columns[0], "Network");
    assert!(columns[1..3 + 2 * RawCounter::ALL.len()].iter().all(|column| column.is_empty()));
    let tx_size = 3 + 2 * RawCounter::ALL.len() + 2 * DerivedMetric::MeanTransmittedPacketSize.index();
    assert_eq!(columns[tx_size], "100");
    assert_eq!(columns[tx_size + 1], "0");
}

/// Tests the full block layout:
/// - node and repetition preamble
/// - header, flow rows and network row
/// - blank separator between blocks
#[test]
fn test_emitter_writes_blocks() {
    let summary = two_flow_summary(false);
    let mut emitter = ReportEmitter::new(Vec::new());
    emitter.emit(&summary).unwrap();
    emitter.emit(&summary).unwrap();
    assert_eq!(emitter.blocks_written(), 2);

    let output = String::from_utf8(emitter.into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2 * 7);
    assert_eq!(lines[0], "Nodes;1;");
    assert_eq!(lines[1], "Repetitions;2;");
    assert_eq!(lines[2], header_row());
    assert!(lines[3].starts_with("1;"));
    assert!(lines[4].starts_with("2;"));
    assert!(lines[5].starts_with("Network;"));
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "Nodes;1;");
    assert!(output.ends_with("\n\n"));
}

#[test]
fn test_json_summary_maps_non_finite_to_null() {
    let summary = two_flow_summary(true);
    let json = summary_to_json(&summary).unwrap();

    assert_eq!(json["nodes"], 1);
    assert_eq!(json["repetitions"], 2);
    assert_eq!(json["flows"].as_array().unwrap().len(), 2);
    let rx_size = &json["flows"][1]["derived"][DerivedMetric::MeanReceivedPacketSize.index()];
    assert!(rx_size["mean"].is_null());
    assert_eq!(json["flows"][0]["source"], "192.168.0.2");
}
