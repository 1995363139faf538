//! Passive bus monitor and expected-value scoreboard.

use core::fmt;

use crate::{BusWord, ControllerOutputs, ScoreboardError};

/// Signal values captured after one clock edge, widened to `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusSample {
    /// Edge index the sample was taken on.
    pub cycle: u64,
    /// `bus_strobe`.
    pub strobe: bool,
    /// `bus_cycle`.
    pub cycle_active: bool,
    /// `bus_write_enable`.
    pub write_enable: bool,
    /// `bus_address`.
    pub address: u64,
    /// `bus_data_out`.
    pub data_out: u64,
    /// `bus_ack` as sampled on this edge.
    pub ack: bool,
    /// `resp_busy`.
    pub busy: bool,
    /// `resp_valid`.
    pub valid: bool,
    /// `resp_data`.
    pub resp_data: u64,
}

impl BusSample {
    /// Captures `outputs` committed on edge `cycle`, with the `ack` sampled there.
    #[must_use]
    pub fn capture<A: BusWord, D: BusWord>(
        cycle: u64,
        outputs: &ControllerOutputs<A, D>,
        ack: bool,
    ) -> Self {
        Self {
            cycle,
            strobe: outputs.bus.strobe,
            cycle_active: outputs.bus.cycle,
            write_enable: outputs.bus.write_enable,
            address: outputs.bus.address.to_u64(),
            data_out: outputs.bus.data_out.to_u64(),
            ack,
            busy: outputs.response.busy,
            valid: outputs.response.valid,
            resp_data: outputs.response.data.to_u64(),
        }
    }

    /// Value of one signal; single-bit lines read as 0 or 1.
    #[must_use]
    pub fn value(&self, signal: Signal) -> u64 {
        match signal {
            Signal::Strobe => u64::from(self.strobe),
            Signal::Cycle => u64::from(self.cycle_active),
            Signal::WriteEnable => u64::from(self.write_enable),
            Signal::Address => self.address,
            Signal::DataOut => self.data_out,
            Signal::Ack => u64::from(self.ack),
            Signal::Busy => u64::from(self.busy),
            Signal::Valid => u64::from(self.valid),
            Signal::RespData => self.resp_data,
        }
    }
}

/// Signals a scoreboard can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Signal {
    /// `bus_strobe`.
    Strobe,
    /// `bus_cycle`.
    Cycle,
    /// `bus_write_enable`.
    WriteEnable,
    /// `bus_address`.
    Address,
    /// `bus_data_out`.
    DataOut,
    /// `bus_ack`.
    Ack,
    /// `resp_busy`.
    Busy,
    /// `resp_valid`.
    Valid,
    /// `resp_data`.
    RespData,
}

impl Signal {
    /// Port name of the signal.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Strobe => "bus_strobe",
            Self::Cycle => "bus_cycle",
            Self::WriteEnable => "bus_write_enable",
            Self::Address => "bus_address",
            Self::DataOut => "bus_data_out",
            Self::Ack => "bus_ack",
            Self::Busy => "resp_busy",
            Self::Valid => "resp_valid",
            Self::RespData => "resp_data",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records one [`BusSample`] per clock edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusMonitor {
    samples: Vec<BusSample>,
}

impl BusMonitor {
    /// Creates an empty monitor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Appends a sample.
    pub fn record(&mut self, sample: BusSample) {
        self.samples.push(sample);
    }

    /// Most recent sample.
    #[must_use]
    pub fn latest(&self) -> Option<&BusSample> {
        self.samples.last()
    }

    /// Every sample in edge order.
    #[must_use]
    pub fn samples(&self) -> &[BusSample] {
        &self.samples
    }

    /// Drops every recorded sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Expected signal values checked against a sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    expected: Vec<(Signal, u64)>,
}

impl Scoreboard {
    /// Creates a scoreboard with no expectations.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            expected: Vec::new(),
        }
    }

    /// Sets the expected value of `signal`, replacing any earlier one.
    pub fn expect(&mut self, signal: Signal, value: u64) -> &mut Self {
        if let Some(entry) = self.expected.iter_mut().find(|(s, _)| *s == signal) {
            entry.1 = value;
        } else {
            self.expected.push((signal, value));
        }
        self
    }

    /// Compares every expectation in insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScoreboardError::Mismatch`].
    pub fn check(&self, sample: &BusSample) -> Result<(), ScoreboardError> {
        for &(signal, expected) in &self.expected {
            let observed = sample.value(signal);
            if observed != expected {
                return Err(ScoreboardError::Mismatch {
                    signal,
                    expected,
                    observed,
                });
            }
        }
        Ok(())
    }

    /// Checks the monitor's most recent sample.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreboardError::NoSample`] before the first edge, otherwise
    /// as [`Scoreboard::check`].
    pub fn check_latest(&self, monitor: &BusMonitor) -> Result<(), ScoreboardError> {
        monitor
            .latest()
            .ok_or(ScoreboardError::NoSample)
            .and_then(|sample| self.check(sample))
    }
}
