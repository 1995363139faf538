//! Single-outstanding Wishbone bus-master controller.
//!
//! The core is [`BusMasterController`]: a two-state (`Idle`/`Waiting`)
//! machine that turns a start/address/data/write-enable request into one
//! classic Wishbone cycle, waits for acknowledge, and returns a one-cycle
//! valid pulse with the latched read data. The remaining modules model the
//! collaborators around it (bus target, requester, watchdog, monitor).

/// Generic bus word widths.
pub mod width;
pub use width::BusWord;

/// Signal-level controller interface.
pub mod signals;
pub use signals::{
    BusOutputs, ControllerInputs, ControllerOutputs, PassthroughInputs, PassthroughOutputs,
    Request, Response,
};

/// Register bank and state encoding.
pub mod state;
pub use state::{ControllerState, Registers, STATE_IDLE_BITS, STATE_WAITING_BITS};

/// Typed configuration for the core and its simulation collaborators.
pub mod config;
pub use config::{
    CompletionPolicy, ControllerConfig, SimConfig, TargetConfig, WatchdogConfig,
    DEFAULT_ACK_LATENCY_CYCLES, DEFAULT_MAX_WAIT_CYCLES, DEFAULT_WATCHDOG_TIMEOUT_CYCLES,
};

/// Error taxonomy.
pub mod error;
pub use error::{ConfigError, RequestError, ScoreboardError, TransactionError};

/// Trace hooks.
pub mod trace;
pub use trace::{NullTrace, TraceEvent, TraceSink};

/// Transition logic and the clocked controller.
pub mod controller;
pub use controller::{evaluate, next_registers, BusMasterController, Transition, TransitionKind};

/// Snapshot capture/restore.
pub mod snapshot;
pub use snapshot::{ControllerSnapshot, SnapshotVersion};

/// Bus target models.
pub mod target;
pub use target::{BusTarget, MemoryTarget, NeverAck, TargetResponse};

/// Acknowledge watchdog.
pub mod watchdog;
pub use watchdog::{Watchdog, WatchdogVerdict};

/// Bus monitor and scoreboard.
pub mod monitor;
pub use monitor::{BusMonitor, BusSample, Scoreboard, Signal};

/// Requester-side simulator.
pub mod sim;
pub use sim::{Completion, Simulator};

#[cfg(test)]
use proptest as _;
