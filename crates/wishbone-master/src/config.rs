//! Configuration for the controller core and its simulation collaborators.

use crate::ConfigError;

/// Default number of cycles the memory target waits before acknowledging.
pub const DEFAULT_ACK_LATENCY_CYCLES: u32 = 1;

/// Default cycle limit for blocking simulator transactions.
pub const DEFAULT_MAX_WAIT_CYCLES: u64 = 10_000;

/// Default watchdog timeout used when a watchdog is enabled without a value.
pub const DEFAULT_WATCHDOG_TIMEOUT_CYCLES: u32 = 1024;

/// What the completion edge does to the registered bus outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CompletionPolicy {
    /// Strobe, cycle, write-enable, address and data keep their last values
    /// on the acknowledge edge; the next idle edge without a start clears
    /// strobe and cycle.
    #[default]
    HoldBusOutputs,
    /// Strobe, cycle and write-enable drop on the acknowledge edge. Address
    /// and write data are still held.
    ClearBusOutputs,
}

/// Immutable configuration of a controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControllerConfig {
    /// Bus output handling on transaction completion.
    pub completion: CompletionPolicy,
    /// Enables trace callback dispatch from `tick_traced`.
    pub tracing_enabled: bool,
}

/// Behavior of the memory-backed bus target model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TargetConfig {
    /// Cycles between first seeing strobe and asserting acknowledge.
    pub ack_latency: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            ack_latency: DEFAULT_ACK_LATENCY_CYCLES,
        }
    }
}

/// Acknowledge watchdog layered outside the controller core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WatchdogConfig {
    /// Consecutive busy cycles tolerated before the transaction is abandoned.
    pub timeout_cycles: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            timeout_cycles: DEFAULT_WATCHDOG_TIMEOUT_CYCLES,
        }
    }
}

impl WatchdogConfig {
    /// Checks that the timeout can ever be satisfied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWatchdogTimeout`] when `timeout_cycles` is 0.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_cycles == 0 {
            Err(ConfigError::ZeroWatchdogTimeout)
        } else {
            Ok(())
        }
    }
}

/// Top-level configuration of a [`crate::Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SimConfig {
    /// Controller core configuration.
    pub controller: ControllerConfig,
    /// Memory target configuration.
    pub target: TargetConfig,
    /// Optional acknowledge watchdog; `None` stalls forever like the core.
    pub watchdog: Option<WatchdogConfig>,
    /// Cycle limit for `read`/`write` before reporting a stall.
    pub max_wait_cycles: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            target: TargetConfig::default(),
            watchdog: None,
            max_wait_cycles: DEFAULT_MAX_WAIT_CYCLES,
        }
    }
}

impl SimConfig {
    /// Validates every nested configuration.
    ///
    /// # Errors
    ///
    /// Propagates the first nested validation failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(watchdog) = &self.watchdog {
            watchdog.validate()?;
        }
        Ok(())
    }
}
