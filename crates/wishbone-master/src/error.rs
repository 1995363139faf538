use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// A watchdog with a zero timeout would expire before any target could
    /// acknowledge.
    #[error("watchdog timeout must be at least one cycle")]
    ZeroWatchdogTimeout,
}

/// Requester-side refusal to present a start pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RequestError {
    /// A transaction is outstanding or a start pulse is already queued.
    #[error("controller busy with an outstanding transaction")]
    Busy,
}

/// Reasons a simulated transaction did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TransactionError {
    /// The caller's cycle limit elapsed with busy still asserted.
    #[error("no acknowledge after {cycles} cycles")]
    Stalled {
        /// Cycles stepped while waiting.
        cycles: u64,
    },
    /// The watchdog expired and reset the controller.
    #[error("watchdog expired after {cycles} busy cycles")]
    WatchdogExpired {
        /// Consecutive busy cycles observed by the watchdog.
        cycles: u32,
    },
    /// The transaction left the controller without a completion pulse:
    /// reset was asserted or a corrupted state register was recovered.
    #[error("transaction discarded by reset")]
    AbortedByReset,
    /// Nothing was queued or in flight to wait for.
    #[error("no transaction outstanding")]
    NothingOutstanding,
    /// The requester could not present the start pulse.
    #[error(transparent)]
    Rejected(#[from] RequestError),
}

/// Scoreboard comparison failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ScoreboardError {
    /// A sampled signal differs from its expected value.
    #[error("{signal} mismatch: expected {expected:#x}, got {observed:#x}")]
    Mismatch {
        /// Signal that was compared.
        signal: crate::Signal,
        /// Expected value.
        expected: u64,
        /// Sampled value.
        observed: u64,
    },
    /// The monitor has not sampled any edge yet.
    #[error("no bus sample recorded")]
    NoSample,
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RequestError, ScoreboardError, TransactionError};
    use crate::Signal;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            ConfigError::ZeroWatchdogTimeout.to_string(),
            "watchdog timeout must be at least one cycle"
        );
        assert_eq!(
            RequestError::Busy.to_string(),
            "controller busy with an outstanding transaction"
        );
        assert_eq!(
            TransactionError::Stalled { cycles: 12 }.to_string(),
            "no acknowledge after 12 cycles"
        );
        assert_eq!(
            TransactionError::WatchdogExpired { cycles: 4 }.to_string(),
            "watchdog expired after 4 busy cycles"
        );
        assert_eq!(
            TransactionError::from(RequestError::Busy).to_string(),
            RequestError::Busy.to_string()
        );
    }

    #[test]
    fn scoreboard_mismatch_names_the_signal() {
        let error = ScoreboardError::Mismatch {
            signal: Signal::Address,
            expected: 0x10,
            observed: 0x20,
        };
        assert_eq!(
            error.to_string(),
            "bus_address mismatch: expected 0x10, got 0x20"
        );
    }
}
