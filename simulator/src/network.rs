//! Synthetic stochastic flow generator.
//!
//! Stands in for the wireless network simulator: stations sit on a grid around the access
//! point (or random-walk around it), the server sits behind the point-to-point link, and each
//! repetition draws per-flow counters from a contention and distance model. A run is fully
//! determined by its seed.

use flowstats::types::constants::{server_address, station_address};
use flowstats::utils::logging;
use flowstats::{FlowId, FlowRecord, FlowSimulator, SimulatorError, SweepPoint};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Normal};
use std::net::Ipv4Addr;

use crate::config::{ScenarioConfig, TrafficPattern};

// ------------------------------------------------------------------------------------------------
// Traffic and Topology Constants
// ------------------------------------------------------------------------------------------------

/// UDP payload of a CBR packet, in bytes
pub const CBR_PACKET_SIZE: u64 = 450;
/// Interval between two CBR packets, in seconds
pub const CBR_INTERVAL_SECONDS: f64 = 0.003824;
/// TCP segment size of the on/off application, in bytes
pub const BURST_PACKET_SIZE: u64 = 1426;
/// Sending rate of the on/off application while on, in bit/s
pub const BURST_DATA_RATE: f64 = 1_000_000.0;

const UDP_IP_HEADERS: u64 = 28;
const TCP_IP_HEADERS: u64 = 40;
/// Header-only segment acknowledging every second data segment
const ACK_PACKET_SIZE: u64 = TCP_IP_HEADERS;

const GRID_WIDTH: u32 = 5;
const GRID_DELTA_X: f64 = 5.0;
const GRID_DELTA_Y: f64 = 2.0;
/// Side of the square the random walk is confined to, in metres
const WALK_BOUND: f64 = 40.0;
/// Random-walk displacement per square root of active second, in metres
const WALK_SPREAD: f64 = 1.5;

const BASE_DELAY: f64 = 0.0004;
const CONTENTION_DELAY_PER_NODE: f64 = 0.00006;
const DELAY_PER_METRE: f64 = 0.00001;
const DELAY_SPREAD: f64 = 0.3;
const JITTER_FRACTION: f64 = 0.25;

const BASE_LOSS: f64 = 0.001;
const CONTENTION_LOSS_PER_NODE: f64 = 0.0015;
const LOSS_PER_METRE: f64 = 0.002;
const MAX_LOSS: f64 = 0.95;
/// ACKs are short and lose less often than data segments
const ACK_LOSS_FACTOR: f64 = 0.5;

const MIN_DELAY: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// Data Structures
// ------------------------------------------------------------------------------------------------

/// Generates flow records for the stations of one sweep point
#[derive(Debug, Clone)]
pub struct SyntheticFlowSimulator {
    pattern: TrafficPattern,
    mobility: bool,
    duration_seconds: f64,
    app_start_seconds: f64,
}

/// Loss and delay of the path between one station and the server
#[derive(Debug, Clone, Copy)]
struct LinkQuality {
    loss_probability: f64,
    mean_delay: f64,
}

/// What a sender put on the wire during one repetition
#[derive(Debug, Clone, Copy)]
struct Transmission {
    packets: u64,
    packet_size: u64,
    first_tx: f64,
    last_tx: f64,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl SyntheticFlowSimulator {
    pub fn new(config: &ScenarioConfig) -> Self {
        Self {
            pattern: config.traffic.pattern,
            mobility: config.traffic.mobility,
            duration_seconds: config.network.duration_seconds,
            app_start_seconds: config.network.app_start_seconds,
        }
    }

    pub fn pattern(&self) -> TrafficPattern {
        self.pattern
    }

    fn active_seconds(&self) -> f64 {
        self.duration_seconds - self.app_start_seconds
    }

    /// Distance of `station` from the access point at the grid origin, in metres
    fn station_distance<R: Rng>(&self, station: u32, rng: &mut R) -> Result<f64, SimulatorError> {
        let mut x = GRID_DELTA_X * (station % GRID_WIDTH) as f64;
        let mut y = GRID_DELTA_Y * (station / GRID_WIDTH) as f64;
        if self.mobility {
            let step = normal(0.0, WALK_SPREAD * self.active_seconds().sqrt())?;
            x = (x + step.sample(rng)).clamp(0.0, WALK_BOUND);
            y = (y + step.sample(rng)).clamp(0.0, WALK_BOUND);
        }
        Ok(x.hypot(y))
    }

    fn link_quality(&self, nodes: u32, distance: f64) -> LinkQuality {
        let loss = BASE_LOSS + CONTENTION_LOSS_PER_NODE * nodes as f64 + LOSS_PER_METRE * distance;
        LinkQuality {
            loss_probability: loss.min(MAX_LOSS),
            mean_delay: BASE_DELAY + CONTENTION_DELAY_PER_NODE * nodes as f64 + DELAY_PER_METRE * distance,
        }
    }

    /// Constant bit rate from the application start until the end of the run
    fn cbr_transmission<R: Rng>(&self, rng: &mut R) -> Transmission {
        let first_tx = self.app_start_seconds + rng.gen_range(0.0..CBR_INTERVAL_SECONDS);
        let packets = (((self.duration_seconds - first_tx) / CBR_INTERVAL_SECONDS).floor() as u64).max(1);
        Transmission {
            packets,
            packet_size: CBR_PACKET_SIZE + UDP_IP_HEADERS,
            first_tx,
            last_tx: first_tx + (packets - 1) as f64 * CBR_INTERVAL_SECONDS,
        }
    }

    /// On/off bursts: the share of time spent on is drawn once per station and run
    fn burst_transmission<R: Rng>(&self, rng: &mut R) -> Result<Transmission, SimulatorError> {
        let on_fraction = normal(0.5, 0.1)?.sample(rng).clamp(0.05, 0.95);
        let packets_per_second = BURST_DATA_RATE / (BURST_PACKET_SIZE * 8) as f64;
        let packets = ((self.active_seconds() * on_fraction * packets_per_second).floor() as u64).max(1);
        let first_tx = self.app_start_seconds + rng.gen_range(0.0..0.05);
        let last_tx = (self.duration_seconds - rng.gen_range(0.0..0.05)).max(first_tx);
        Ok(Transmission {
            packets,
            packet_size: BURST_PACKET_SIZE + TCP_IP_HEADERS,
            first_tx,
            last_tx,
        })
    }
}

impl FlowSimulator for SyntheticFlowSimulator {
    /// Flow ids follow classifier order: station data flows first, then the reverse ACK flows
    fn run(&mut self, point: &SweepPoint, seed: u64) -> Result<Vec<FlowRecord>, SimulatorError> {
        let expected_flows = point.nodes * self.pattern.flows_per_node();
        if point.flows != expected_flows {
            return Err(SimulatorError::InvalidParameter(format!(
                "{:?} traffic with {} stations yields {} flows, not {}",
                self.pattern, point.nodes, expected_flows, point.flows
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut data_flows = Vec::with_capacity(point.nodes as usize);
        let mut links = Vec::with_capacity(point.nodes as usize);

        for station in 0..point.nodes {
            let distance = self.station_distance(station, &mut rng)?;
            let link = self.link_quality(point.nodes, distance);
            let transmission = match self.pattern {
                TrafficPattern::Cbr => self.cbr_transmission(&mut rng),
                TrafficPattern::Burst => self.burst_transmission(&mut rng)?,
            };
            data_flows.push(deliver(
                FlowId(station + 1),
                station_address(station),
                server_address(),
                transmission,
                link,
                &mut rng,
            )?);
            links.push(link);
        }

        let mut records = data_flows.clone();
        if self.pattern == TrafficPattern::Burst {
            for (station, (data, link)) in data_flows.iter().zip(&links).enumerate() {
                let station = station as u32;
                let ack_link = LinkQuality {
                    loss_probability: link.loss_probability * ACK_LOSS_FACTOR,
                    mean_delay: link.mean_delay,
                };
                records.push(deliver(
                    FlowId(point.nodes + station + 1),
                    server_address(),
                    station_address(station),
                    ack_transmission(data),
                    ack_link,
                    &mut rng,
                )?);
            }
        }

        logging::log(
            "SIMULATOR",
            &format!(
                "Generated {} flow records for {} nodes with seed {}",
                records.len(),
                point.nodes,
                seed
            ),
        );
        Ok(records)
    }
}

// ------------------------------------------------------------------------------------------------
// Helper Functions
// ------------------------------------------------------------------------------------------------

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, SimulatorError> {
    Normal::new(mean, std_dev).map_err(|e| SimulatorError::InvalidParameter(e.to_string()))
}

/// Reverse stream acknowledging every second delivered data segment
fn ack_transmission(data: &FlowRecord) -> Transmission {
    let packets = ((data.rx_packets + 1) / 2).max(1);
    let (first_tx, last_tx) = if data.rx_packets > 0 {
        (data.time_first_rx_packet, data.time_last_rx_packet)
    } else {
        (data.time_first_tx_packet, data.time_last_tx_packet)
    };
    Transmission {
        packets,
        packet_size: ACK_PACKET_SIZE,
        first_tx,
        last_tx,
    }
}

/// Draws losses and delays for one transmission over one link
fn deliver<R: Rng>(
    flow_id: FlowId,
    source: Ipv4Addr,
    destination: Ipv4Addr,
    transmission: Transmission,
    link: LinkQuality,
    rng: &mut R,
) -> Result<FlowRecord, SimulatorError> {
    let lost_packets = Binomial::new(transmission.packets, link.loss_probability)
        .map_err(|e| SimulatorError::InvalidParameter(e.to_string()))?
        .sample(rng);
    let rx_packets = transmission.packets - lost_packets;

    let delay = normal(link.mean_delay, link.mean_delay * DELAY_SPREAD)?;
    let jitter = normal(link.mean_delay * JITTER_FRACTION, link.mean_delay * JITTER_FRACTION * DELAY_SPREAD)?;
    let mean_delay = delay.sample(rng).max(MIN_DELAY);
    let first_delay = delay.sample(rng).max(MIN_DELAY);
    let last_delay = delay.sample(rng).max(MIN_DELAY);
    let mean_jitter = jitter.sample(rng).abs();

    // Nothing received leaves the receive-side counters at zero
    let (time_first_rx_packet, time_last_rx_packet, delay_sum, jitter_sum, last_delay) = if rx_packets == 0 {
        (0.0, 0.0, 0.0, 0.0, 0.0)
    } else {
        (
            transmission.first_tx + first_delay,
            transmission.last_tx + last_delay,
            mean_delay * rx_packets as f64,
            mean_jitter * (rx_packets - 1) as f64,
            last_delay,
        )
    };

    Ok(FlowRecord {
        flow_id,
        source,
        destination,
        time_first_tx_packet: transmission.first_tx,
        time_first_rx_packet,
        time_last_tx_packet: transmission.last_tx,
        time_last_rx_packet,
        delay_sum,
        jitter_sum,
        last_delay,
        tx_bytes: transmission.packets * transmission.packet_size,
        rx_bytes: rx_packets * transmission.packet_size,
        tx_packets: transmission.packets,
        rx_packets,
        lost_packets,
    })
}
