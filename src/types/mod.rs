use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

pub mod constants;

/// Identifier the simulator's classifier assigns to a flow.
/// Stable across the repetitions of one configuration and contiguous from 1.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FlowId(pub u32);

/// One measurement snapshot of one flow in one repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Flow identity assigned by the classifier
    pub flow_id: FlowId,
    /// Source address as seen by the classifier
    pub source: Ipv4Addr,
    /// Destination address as seen by the classifier
    pub destination: Ipv4Addr,
    /// Time the first packet was sent, in seconds
    pub time_first_tx_packet: f64,
    /// Time the first packet was received, in seconds
    pub time_first_rx_packet: f64,
    /// Time the last packet was sent, in seconds
    pub time_last_tx_packet: f64,
    /// Time the last packet was received, in seconds
    pub time_last_rx_packet: f64,
    /// Sum of end-to-end delays of all received packets, in seconds
    pub delay_sum: f64,
    /// Sum of delay variations between consecutive received packets, in seconds
    pub jitter_sum: f64,
    /// Delay of the last received packet, in seconds
    pub last_delay: f64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
}

/// The raw counters carried by a [`FlowRecord`], in report order
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum RawCounter {
    TimeFirstTxPacket,
    TimeFirstRxPacket,
    TimeLastTxPacket,
    TimeLastRxPacket,
    DelaySum,
    JitterSum,
    LastDelay,
    TxBytes,
    RxBytes,
    TxPackets,
    RxPackets,
    LostPackets,
}

impl RawCounter {
    pub const ALL: [RawCounter; 12] = [
        RawCounter::TimeFirstTxPacket,
        RawCounter::TimeFirstRxPacket,
        RawCounter::TimeLastTxPacket,
        RawCounter::TimeLastRxPacket,
        RawCounter::DelaySum,
        RawCounter::JitterSum,
        RawCounter::LastDelay,
        RawCounter::TxBytes,
        RawCounter::RxBytes,
        RawCounter::TxPackets,
        RawCounter::RxPackets,
        RawCounter::LostPackets,
    ];

    /// Position of the counter in [`RawCounter::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name used in the report header
    pub fn column_name(self) -> &'static str {
        match self {
            RawCounter::TimeFirstTxPacket => "timeFirstTxPacket",
            RawCounter::TimeFirstRxPacket => "timeFirstRxPacket",
            RawCounter::TimeLastTxPacket => "timeLastTxPacket",
            RawCounter::TimeLastRxPacket => "timeLastRxPacket",
            RawCounter::DelaySum => "delaySum",
            RawCounter::JitterSum => "jitterSum",
            RawCounter::LastDelay => "lastDelay",
            RawCounter::TxBytes => "txBytes",
            RawCounter::RxBytes => "rxBytes",
            RawCounter::TxPackets => "txPackets",
            RawCounter::RxPackets => "rxPackets",
            RawCounter::LostPackets => "lostPackets",
        }
    }
}

/// Performance metrics derived from the raw counters, in report order
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum DerivedMetric {
    MeanDelay,
    MeanJitter,
    MeanTransmittedPacketSize,
    MeanReceivedPacketSize,
    MeanTransmittedBitrate,
    MeanReceivedBitrate,
    MeanPacketLossRatio,
}

impl DerivedMetric {
    pub const ALL: [DerivedMetric; 7] = [
        DerivedMetric::MeanDelay,
        DerivedMetric::MeanJitter,
        DerivedMetric::MeanTransmittedPacketSize,
        DerivedMetric::MeanReceivedPacketSize,
        DerivedMetric::MeanTransmittedBitrate,
        DerivedMetric::MeanReceivedBitrate,
        DerivedMetric::MeanPacketLossRatio,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn column_name(self) -> &'static str {
        match self {
            DerivedMetric::MeanDelay => "MeanDelay",
            DerivedMetric::MeanJitter => "MeanJitter",
            DerivedMetric::MeanTransmittedPacketSize => "MeanTransmittedPacketSize(byte)",
            DerivedMetric::MeanReceivedPacketSize => "MeanReceivedPacketSize(byte)",
            DerivedMetric::MeanTransmittedBitrate => "MeanTransmittedBitrate(bit/s)",
            DerivedMetric::MeanReceivedBitrate => "MeanReceivedBitrate(bit/s)",
            DerivedMetric::MeanPacketLossRatio => "MeanPacketLossRatio",
        }
    }
}

/// A mean together with its sample standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    pub mean: f64,
    pub std_dev: f64,
}

impl FlowRecord {
    /// Value of a single raw counter, widened to `f64`
    pub fn counter(&self, counter: RawCounter) -> f64 {
        match counter {
            RawCounter::TimeFirstTxPacket => self.time_first_tx_packet,
            RawCounter::TimeFirstRxPacket => self.time_first_rx_packet,
            RawCounter::TimeLastTxPacket => self.time_last_tx_packet,
            RawCounter::TimeLastRxPacket => self.time_last_rx_packet,
            RawCounter::DelaySum => self.delay_sum,
            RawCounter::JitterSum => self.jitter_sum,
            RawCounter::LastDelay => self.last_delay,
            RawCounter::TxBytes => self.tx_bytes as f64,
            RawCounter::RxBytes => self.rx_bytes as f64,
            RawCounter::TxPackets => self.tx_packets as f64,
            RawCounter::RxPackets => self.rx_packets as f64,
            RawCounter::LostPackets => self.lost_packets as f64,
        }
    }

    /// All raw counters in [`RawCounter::ALL`] order
    pub fn counters(&self) -> [f64; 12] {
        RawCounter::ALL.map(|counter| self.counter(counter))
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RawCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
