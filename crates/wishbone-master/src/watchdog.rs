//! Acknowledge watchdog layered outside the controller core.
//!
//! The core waits forever for acknowledge. The watchdog watches `resp_busy`
//! from the outside and tells its owner when to give up; abandoning the
//! transaction (by asserting reset) is the owner's job.

use crate::{ConfigError, WatchdogConfig};

/// Watchdog reading after observing one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchdogVerdict {
    /// Controller not busy; the counter is cleared.
    Idle,
    /// Busy for `cycles` consecutive cycles, still within the timeout.
    Counting {
        /// Consecutive busy cycles so far.
        cycles: u32,
    },
    /// Busy for the full timeout.
    Expired {
        /// Consecutive busy cycles observed.
        cycles: u32,
    },
}

/// Consecutive-busy-cycle counter with a fixed timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchdog {
    timeout_cycles: u32,
    busy_cycles: u32,
}

impl Watchdog {
    /// Creates a watchdog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWatchdogTimeout`] for a zero timeout.
    pub const fn new(config: WatchdogConfig) -> Result<Self, ConfigError> {
        if let Err(error) = config.validate() {
            return Err(error);
        }
        Ok(Self {
            timeout_cycles: config.timeout_cycles,
            busy_cycles: 0,
        })
    }

    /// Configured timeout.
    #[must_use]
    pub const fn timeout_cycles(&self) -> u32 {
        self.timeout_cycles
    }

    /// Feeds one cycle's `resp_busy`.
    pub fn observe(&mut self, busy: bool) -> WatchdogVerdict {
        if !busy {
            self.busy_cycles = 0;
            return WatchdogVerdict::Idle;
        }

        self.busy_cycles = self.busy_cycles.saturating_add(1);
        if self.busy_cycles >= self.timeout_cycles {
            log::warn!("no acknowledge after {} busy cycles", self.busy_cycles);
            WatchdogVerdict::Expired {
                cycles: self.busy_cycles,
            }
        } else {
            WatchdogVerdict::Counting {
                cycles: self.busy_cycles,
            }
        }
    }

    /// Clears the counter, e.g. after the owner reset the controller.
    pub const fn rearm(&mut self) {
        self.busy_cycles = 0;
    }
}
