//! Bus target models driven by the registered master outputs.
//!
//! A target is consulted once per clock cycle with the bus outputs committed
//! on the previous edge; its response is sampled by the controller on the
//! next edge.

use std::collections::HashMap;

use crate::{BusOutputs, BusWord, TargetConfig};

/// Target-driven lines sampled by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TargetResponse<D = u16> {
    /// `bus_ack`.
    pub ack: bool,
    /// `bus_data_in`.
    pub data: D,
}

impl<D: BusWord> TargetResponse<D> {
    /// Acknowledge low, data lines low.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            ack: false,
            data: D::ZERO,
        }
    }

    /// Acknowledge high with `data` on the read lines.
    #[must_use]
    pub const fn ack(data: D) -> Self {
        Self { ack: true, data }
    }
}

/// Slave side of the Wishbone bus.
pub trait BusTarget<A = u16, D = u16> {
    /// Produces this cycle's acknowledge and read data.
    fn respond(&mut self, bus: &BusOutputs<A, D>) -> TargetResponse<D>;
}

impl<A, D, F> BusTarget<A, D> for F
where
    F: FnMut(&BusOutputs<A, D>) -> TargetResponse<D>,
{
    fn respond(&mut self, bus: &BusOutputs<A, D>) -> TargetResponse<D> {
        self(bus)
    }
}

/// Target that never acknowledges.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAck;

impl<A: BusWord, D: BusWord> BusTarget<A, D> for NeverAck {
    fn respond(&mut self, _bus: &BusOutputs<A, D>) -> TargetResponse<D> {
        TargetResponse::quiet()
    }
}

/// Sparse memory behind a Wishbone slave port.
///
/// Unwritten locations read as zero. The access is performed on the cycle
/// the acknowledge is driven. The cycle after acknowledging is skipped so the
/// master's held strobe/cycle after completion is not served twice.
#[derive(Debug, Clone)]
pub struct MemoryTarget<A = u16, D = u16> {
    config: TargetConfig,
    memory: HashMap<A, D>,
    countdown: Option<u32>,
    just_acked: bool,
    reads: u64,
    writes: u64,
}

impl<A: BusWord, D: BusWord> Default for MemoryTarget<A, D> {
    fn default() -> Self {
        Self::new(TargetConfig::default())
    }
}

impl<A: BusWord, D: BusWord> MemoryTarget<A, D> {
    /// Creates an empty memory target.
    #[must_use]
    pub fn new(config: TargetConfig) -> Self {
        Self {
            config,
            memory: HashMap::new(),
            countdown: None,
            just_acked: false,
            reads: 0,
            writes: 0,
        }
    }

    /// Target configuration.
    #[must_use]
    pub const fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Backdoor read that bypasses the bus.
    #[must_use]
    pub fn peek(&self, address: A) -> D {
        self.memory.get(&address).copied().unwrap_or(D::ZERO)
    }

    /// Backdoor write that bypasses the bus.
    pub fn poke(&mut self, address: A, value: D) {
        self.memory.insert(address, value);
    }

    /// Reads served over the bus.
    #[must_use]
    pub const fn read_count(&self) -> u64 {
        self.reads
    }

    /// Writes served over the bus.
    #[must_use]
    pub const fn write_count(&self) -> u64 {
        self.writes
    }

    fn access(&mut self, bus: &BusOutputs<A, D>) -> D {
        if bus.write_enable {
            self.writes += 1;
            self.memory.insert(bus.address, bus.data_out);
            D::ZERO
        } else {
            self.reads += 1;
            self.peek(bus.address)
        }
    }
}

impl<A: BusWord, D: BusWord> BusTarget<A, D> for MemoryTarget<A, D> {
    fn respond(&mut self, bus: &BusOutputs<A, D>) -> TargetResponse<D> {
        if std::mem::take(&mut self.just_acked) {
            self.countdown = None;
            return TargetResponse::quiet();
        }

        if !bus.transfer_active() {
            self.countdown = None;
            return TargetResponse::quiet();
        }

        let remaining = *self.countdown.get_or_insert(self.config.ack_latency);
        if remaining > 0 {
            self.countdown = Some(remaining - 1);
            return TargetResponse::quiet();
        }

        self.countdown = None;
        self.just_acked = true;
        TargetResponse::ack(self.access(bus))
    }
}

#[cfg(test)]
mod tests {
    use super::{BusTarget, MemoryTarget, NeverAck, TargetResponse};
    use crate::{BusOutputs, TargetConfig};

    fn active(write_enable: bool, address: u16, data_out: u16) -> BusOutputs<u16, u16> {
        BusOutputs {
            write_enable,
            strobe: true,
            cycle: true,
            address,
            data_out,
        }
    }

    #[test]
    fn acknowledges_after_configured_latency() {
        let mut target = MemoryTarget::<u16, u16>::new(TargetConfig { ack_latency: 2 });
        target.poke(0x10, 0xBEEF);
        let bus = active(false, 0x10, 0);

        assert!(!target.respond(&bus).ack);
        assert!(!target.respond(&bus).ack);
        assert_eq!(target.respond(&bus), TargetResponse::ack(0xBEEF));
        assert_eq!(target.read_count(), 1);
    }

    #[test]
    fn zero_latency_acknowledges_first_active_cycle() {
        let mut target = MemoryTarget::<u16, u16>::new(TargetConfig { ack_latency: 0 });
        let response = target.respond(&active(true, 0x4, 0x1234));

        assert!(response.ack);
        assert_eq!(target.peek(0x4), 0x1234);
        assert_eq!(target.write_count(), 1);
    }

    #[test]
    fn held_strobe_after_ack_is_not_served_twice() {
        let mut target = MemoryTarget::<u16, u16>::new(TargetConfig { ack_latency: 0 });
        let bus = active(true, 0x8, 0x1);

        assert!(target.respond(&bus).ack);
        assert!(!target.respond(&bus).ack);
        assert_eq!(target.write_count(), 1);
    }

    #[test]
    fn dropping_strobe_cancels_pending_countdown() {
        let mut target = MemoryTarget::<u16, u16>::new(TargetConfig { ack_latency: 1 });
        let bus = active(false, 0x0, 0);

        assert!(!target.respond(&bus).ack);
        assert!(!target.respond(&BusOutputs::default()).ack);
        assert!(!target.respond(&bus).ack);
        assert!(target.respond(&bus).ack);
    }

    #[test]
    fn unwritten_locations_read_zero() {
        let target = MemoryTarget::<u32, u8>::default();
        assert_eq!(target.peek(0xFFFF_FFFF), 0);
    }

    #[test]
    fn never_ack_stays_quiet() {
        let mut target = NeverAck;
        let response: TargetResponse<u16> = target.respond(&active(false, 0, 0));
        assert!(!response.ack);
    }

    #[test]
    fn closures_are_targets() {
        let mut calls = 0;
        let mut target = |bus: &BusOutputs<u16, u16>| {
            calls += 1;
            TargetResponse::ack(bus.address)
        };
        assert_eq!(target.respond(&active(false, 0x77, 0)).data, 0x77);
        assert_eq!(calls, 1);
    }
}
