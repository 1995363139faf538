//! Deterministic trace hooks emitted at clock-edge boundaries.

/// Trace events emitted in commit order when tracing is enabled.
///
/// Bus words are widened to `u64` so one sink serves every bus width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// A start pulse was accepted in `Idle` and the bus cycle began.
    TransactionAccepted {
        /// Edge index on which the request was latched.
        cycle: u64,
        /// Latched address.
        address: u64,
        /// Latched write data.
        data: u64,
        /// Latched direction.
        write_enable: bool,
    },
    /// Acknowledge was sampled in `Waiting`.
    TransactionCompleted {
        /// Edge index on which acknowledge was sampled.
        cycle: u64,
        /// Read data latched into the response.
        data: u64,
        /// Direction of the completed transfer.
        write_enable: bool,
        /// Edges spent in `Waiting`, including the completion edge.
        wait_cycles: u64,
    },
    /// Reset forced every register to its reset value, either on a clock
    /// edge with `reset_n` low or asynchronously between edges.
    ResetApplied {
        /// Edge index, or the last committed edge for an asynchronous reset.
        cycle: u64,
        /// `true` when a transaction in flight was discarded.
        aborted_transaction: bool,
    },
    /// The state register held an unused encoding and was returned to `Idle`.
    InvalidStateRecovered {
        /// Edge index of the recovery.
        cycle: u64,
        /// The unused encoding that was found.
        bits: u8,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in commit order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}
