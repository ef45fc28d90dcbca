use crate::config_aggregator::ConfigurationAggregator;
use crate::flow_accumulator::sample_std_dev;
use crate::testing::{assert_close, FlowRecordBuilder};
use crate::types::{DerivedMetric, FlowId, FlowRecord};
use crate::utils::logging;

const EPSILON: f64 = 1e-12;

fn delay_record(flow_id: u32, delay_sum: f64, rx_packets: u64) -> FlowRecord {
    FlowRecordBuilder::new(flow_id)
        .times(2.0, 2.5, 10.0, 10.5)
        .delays(delay_sum, 0.0, 0.0)
        .bytes(rx_packets * 100, rx_packets * 100)
        .packets(rx_packets, rx_packets, 0)
        .build()
}

/// Tests the network-wide roll-up:
/// - two flows with mean delays 0.02 and 0.04
/// - network mean delay 0.03, stddev of the two per-flow values
#[test]
fn test_network_summary_is_mean_of_flow_report_values() {
    logging::log("TEST", "=== Starting test_network_summary_is_mean_of_flow_report_values ===");
    let mut aggregator = ConfigurationAggregator::new(2, 2);
    for repetition in 0..2 {
        aggregator
            .ingest(repetition, &[delay_record(1, 0.2, 10), delay_record(2, 0.4, 10)])
            .expect("Failed to ingest repetition");
    }

    let summary = aggregator.finalize().expect("Failed to finalize");
    assert_eq!(summary.flows.len(), 2);
    assert_eq!(summary.network.flows, 2);

    let flow_1 = summary.flows[0].derived(DerivedMetric::MeanDelay).mean;
    let flow_2 = summary.flows[1].derived(DerivedMetric::MeanDelay).mean;
    assert_close(flow_1, 0.02, EPSILON, "flow 1 delay");
    assert_close(flow_2, 0.04, EPSILON, "flow 2 delay");

    let network = summary.network.derived(DerivedMetric::MeanDelay);
    assert_close(network.mean, 0.03, EPSILON, "network delay");
    let expected = sample_std_dev(&[flow_1, flow_2], (flow_1 + flow_2) / 2.0).unwrap();
    assert_close(network.std_dev, expected, EPSILON, "network delay stddev");
}

#[test]
fn test_network_summary_for_every_metric() {
    let mut aggregator = ConfigurationAggregator::new(3, 2);
    for repetition in 0..2 {
        aggregator
            .ingest(
                repetition,
                &[delay_record(1, 0.5, 8), delay_record(2, 1.0, 16), delay_record(3, 0.25, 4)],
            )
            .unwrap();
    }
    let summary = aggregator.finalize().unwrap();

    for metric in DerivedMetric::ALL {
        let values: Vec<f64> = summary.flows.iter().map(|flow| flow.derived(metric).mean).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let network = summary.network.derived(metric);
        assert_eq!(network.mean, mean, "network mean of {}", metric);
        assert_eq!(network.std_dev, sample_std_dev(&values, mean).unwrap(), "network stddev of {}", metric);
    }
}

/// Flows are reported in ascending identity order regardless of arrival order
#[test]
fn test_flows_are_ordered_by_identity() {
    let mut aggregator = ConfigurationAggregator::new(3, 2);
    aggregator
        .ingest(0, &[delay_record(3, 0.1, 5), delay_record(1, 0.1, 5), delay_record(2, 0.1, 5)])
        .unwrap();
    aggregator
        .ingest(1, &[delay_record(2, 0.1, 5), delay_record(3, 0.1, 5), delay_record(1, 0.1, 5)])
        .unwrap();

    let summary = aggregator.finalize().unwrap();
    let order: Vec<FlowId> = summary.flows.iter().map(|flow| flow.flow_id).collect();
    assert_eq!(order, vec![FlowId(1), FlowId(2), FlowId(3)]);
    assert_eq!(summary.flows[0].source, delay_record(1, 0.0, 0).source);
}

/// Tests the end-to-end configuration of two flows over three repetitions
#[test]
fn test_two_flows_three_repetitions() {
    let mut aggregator = ConfigurationAggregator::new(2, 3);
    for repetition in 0..3 {
        let records = vec![
            FlowRecordBuilder::new(1)
                .times(2.0, 2.0, 10.0, 10.0)
                .bytes(1000, 1000)
                .packets(10, 10, 0)
                .build(),
            FlowRecordBuilder::new(2)
                .times(2.0, 2.0, 10.0, 10.0)
                .bytes(400, 300)
                .packets(4, 3, 1)
                .build(),
        ];
        aggregator.ingest(repetition, &records).unwrap();
    }
    assert_eq!(aggregator.ingested_repetitions(), 3);
    assert_eq!(aggregator.flow_count(), 2);

    let summary = aggregator.finalize().unwrap();
    let size = summary.flows[0].derived(DerivedMetric::MeanTransmittedPacketSize);
    assert_eq!(size.mean, 100.0);
    assert_eq!(size.std_dev, 0.0);
    assert_eq!(summary.flows[1].derived(DerivedMetric::MeanPacketLossRatio).mean, 0.25);
    assert_eq!(summary.network.derived(DerivedMetric::MeanTransmittedPacketSize).mean, 100.0);
}

#[test]
fn test_identical_flows_have_zero_network_dispersion() {
    let mut aggregator = ConfigurationAggregator::new(3, 3);
    for repetition in 0..3 {
        let records: Vec<FlowRecord> = (1..=3).map(|flow_id| delay_record(flow_id, 0.7, 3)).collect();
        aggregator.ingest(repetition, &records).unwrap();
    }
    let summary = aggregator.finalize().unwrap();

    for metric in DerivedMetric::ALL {
        let network = summary.network.derived(metric);
        assert_eq!(network.mean, summary.flows[0].derived(metric).mean, "network mean of {}", metric);
        assert_eq!(network.std_dev, 0.0, "network stddev of {} should be exactly 0", metric);
    }
}
