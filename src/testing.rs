//! Builders for hand-written flow records used by unit and integration tests.

use crate::types::{constants, FlowId, FlowRecord};

/// Builds a [`FlowRecord`] with zeroed counters, overriding only what a test cares about
pub struct FlowRecordBuilder {
    record: FlowRecord,
}

impl FlowRecordBuilder {
    /// Starts a record for station flow `flow_id` towards the server
    pub fn new(flow_id: u32) -> Self {
        Self {
            record: FlowRecord {
                flow_id: FlowId(flow_id),
                source: constants::station_address(flow_id.saturating_sub(1)),
                destination: constants::server_address(),
                time_first_tx_packet: 0.0,
                time_first_rx_packet: 0.0,
                time_last_tx_packet: 0.0,
                time_last_rx_packet: 0.0,
                delay_sum: 0.0,
                jitter_sum: 0.0,
                last_delay: 0.0,
                tx_bytes: 0,
                rx_bytes: 0,
                tx_packets: 0,
                rx_packets: 0,
                lost_packets: 0,
            },
        }
    }

    pub fn times(mut self, first_tx: f64, first_rx: f64, last_tx: f64, last_rx: f64) -> Self {
        self.record.time_first_tx_packet = first_tx;
        self.record.time_first_rx_packet = first_rx;
        self.record.time_last_tx_packet = last_tx;
        self.record.time_last_rx_packet = last_rx;
        self
    }

    pub fn delays(mut self, delay_sum: f64, jitter_sum: f64, last_delay: f64) -> Self {
        self.record.delay_sum = delay_sum;
        self.record.jitter_sum = jitter_sum;
        self.record.last_delay = last_delay;
        self
    }

    pub fn bytes(mut self, tx_bytes: u64, rx_bytes: u64) -> Self {
        self.record.tx_bytes = tx_bytes;
        self.record.rx_bytes = rx_bytes;
        self
    }

    pub fn packets(mut self, tx_packets: u64, rx_packets: u64, lost_packets: u64) -> Self {
        self.record.tx_packets = tx_packets;
        self.record.rx_packets = rx_packets;
        self.record.lost_packets = lost_packets;
        self
    }

    pub fn build(self) -> FlowRecord {
        self.record
    }
}

/// Asserts two floats agree to within `epsilon`, with a readable failure message
pub fn assert_close(actual: f64, expected: f64, epsilon: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= epsilon,
        "{}: expected {} but got {} (epsilon {})",
        what,
        expected,
        actual,
        epsilon
    );
}
