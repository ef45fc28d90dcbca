
use crate::sweep::{FlowSimulator, SimulatorError, SweepPoint};
use crate::testing::FlowRecordBuilder;
use crate::types::FlowRecord;

/// Deterministic stand-in for the network simulator: every flow sends `10 * flow_id`
/// packets of 100 bytes, with the seed's parity adding one lost packet
pub(crate) struct ScriptedSimulator {
    pub calls: Vec<(SweepPoint, u64)>,
}

impl ScriptedSimulator {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }
}

impl FlowSimulator for ScriptedSimulator {
    fn run(&mut self, point: &SweepPoint, seed: u64) -> Result<Vec<FlowRecord>, SimulatorError> {
        self.calls.push((*point, seed));
        Ok((1..=point.flows)
            .map(|flow_id| {
                let packets = 10 * flow_id as u64;
                FlowRecordBuilder::new(flow_id)
                    .times(2.0, 2.5, 10.0, 10.5)
                    .delays(0.5, 0.25, 0.125)
                    .bytes(packets * 100, packets * 100)
                    .packets(packets, packets, seed % 2)
                    .build()
            })
            .collect())
    }
}
