#![cfg(feature = "test")]

use flowstats::{
    testing::{assert_close, FlowRecordBuilder},
    utils::logging,
    ConfigurationAggregator, DerivedMetric, FlowRecord, FlowSimulator, RawCounter, SimulatorError,
    SweepController, SweepError, SweepPlan, SweepPoint,
};

/// Two flows per configuration regardless of node count, with noise-free counters
struct TwoFlowSimulator;

impl FlowSimulator for TwoFlowSimulator {
    fn run(&mut self, _point: &SweepPoint, _seed: u64) -> Result<Vec<FlowRecord>, SimulatorError> {
        Ok(vec![
            FlowRecordBuilder::new(1)
                .times(2.0, 2.25, 10.0, 10.25)
                .delays(0.25, 0.125, 0.03125)
                .bytes(1000, 1000)
                .packets(10, 10, 0)
                .build(),
            FlowRecordBuilder::new(2)
                .times(2.0, 2.25, 10.0, 10.25)
                .delays(0.75, 0.125, 0.03125)
                .bytes(2000, 1500)
                .packets(20, 15, 5)
                .build(),
        ])
    }
}

fn two_flow_plan(start_nodes: u32, num_configurations: usize) -> SweepPlan {
    SweepPlan {
        start_nodes,
        node_step: 50,
        num_configurations,
        repetitions: 3,
        flows_per_node: 2,
        max_nodes: 250,
        base_seed: 0,
    }
}

/// Tests the end-to-end scenario through the public API:
/// - 2 flows, 3 repetitions
/// - flow 1 sends 1000 bytes in 10 packets per run
/// - mean transmitted packet size is 100 with no dispersion
#[test]
fn test_end_to_end_two_flows_three_repetitions() {
    logging::init_logging();
    logging::log("TEST", "=== Starting test_end_to_end_two_flows_three_repetitions ===");

    let controller = SweepController::new(two_flow_plan(5, 1));
    let mut report = Vec::new();
    let outcome = controller
        .run(&mut TwoFlowSimulator, &mut report)
        .expect("Sweep failed");

    let summary = &outcome.configurations[0];
    let flow_1 = &summary.flows[0];
    assert_eq!(flow_1.raw(RawCounter::TxBytes).mean * 3.0, 3000.0);
    assert_eq!(flow_1.raw(RawCounter::TxPackets).mean * 3.0, 30.0);
    assert_eq!(flow_1.derived(DerivedMetric::MeanTransmittedPacketSize).mean, 100.0);
    assert_eq!(flow_1.derived(DerivedMetric::MeanTransmittedPacketSize).std_dev, 0.0);

    let flow_2 = &summary.flows[1];
    assert_eq!(flow_2.derived(DerivedMetric::MeanPacketLossRatio).mean, 0.25);
    assert_eq!(flow_2.derived(DerivedMetric::MeanDelay).mean, 0.05);
    assert_close(
        summary.network.derived(DerivedMetric::MeanDelay).mean,
        0.0375,
        1e-12,
        "network mean delay",
    );

    let report = String::from_utf8(report).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "Nodes;5;");
    assert_eq!(lines[1], "Repetitions;3;");
    assert!(lines[3].starts_with("1;192.168.0.2;10.0.0.2;2;0;"));
    assert!(lines[5].starts_with("Network;;;"));
}

#[test]
fn test_sweep_stops_at_node_limit() {
    // 200 nodes run, 250 run, 300 are rejected
    let controller = SweepController::new(two_flow_plan(200, 3));
    let mut report = Vec::new();

    let error = controller
        .run(&mut TwoFlowSimulator, &mut report)
        .expect_err("300 nodes must be rejected");
    assert!(matches!(error, SweepError::LimitExceeded { nodes: 300, max_nodes: 250 }));
    assert_eq!(error.to_string(), "Configuration with 300 nodes exceeds the supported maximum of 250");

    let report = String::from_utf8(report).unwrap();
    assert!(report.contains("Nodes;200;"));
    assert!(report.contains("Nodes;250;"));
    assert!(!report.contains("Nodes;300;"));
}

#[test]
fn test_aggregator_used_directly() {
    let mut aggregator = ConfigurationAggregator::new(5, 2);
    let mut simulator = TwoFlowSimulator;
    let point = SweepPoint { index: 0, nodes: 5, flows: 2 };
    for repetition in 0..2 {
        let records = simulator.run(&point, repetition as u64).unwrap();
        aggregator.ingest(repetition, &records).unwrap();
    }
    let summary = aggregator.finalize().unwrap();
    assert_eq!(summary.flows.len(), 2);
    for flow in &summary.flows {
        for metric in DerivedMetric::ALL {
            let std_dev = flow.derived(metric).std_dev;
            assert!(std_dev == 0.0, "{} of flow {} should not vary, got {}", metric, flow.flow_id, std_dev);
        }
    }
}
