//! Signal-level interface of the bus-master controller.
//!
//! Inputs are sampled on the rising clock edge and outputs are driven from
//! registers updated on that same edge. The passthrough triplet is the only
//! combinational path through the controller.

use crate::BusWord;

/// Request presented by the internal requester.
///
/// Only sampled while the controller is idle; `data` is meaningful only when
/// `write_enable` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Request<A = u16, D = u16> {
    /// Target address (`req_address`).
    pub address: A,
    /// Write value (`req_data`).
    pub data: D,
    /// Transfer direction, `true` for write (`req_write_enable`).
    pub write_enable: bool,
    /// Start pulse (`req_start`).
    pub start: bool,
}

impl<A: BusWord, D: BusWord> Request<A, D> {
    /// Start pulse for a write of `data` to `address`.
    #[must_use]
    pub const fn write(address: A, data: D) -> Self {
        Self {
            address,
            data,
            write_enable: true,
            start: true,
        }
    }

    /// Start pulse for a read from `address`.
    #[must_use]
    pub const fn read(address: A) -> Self {
        Self {
            address,
            data: D::ZERO,
            write_enable: false,
            start: true,
        }
    }

    /// No request: start low and every other line at zero.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            address: A::ZERO,
            data: D::ZERO,
            write_enable: false,
            start: false,
        }
    }
}

/// Source side of the interrupt/sync passthrough wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PassthroughInputs {
    /// Interrupt from the bus side (`interrupt_in`).
    pub interrupt_in: bool,
    /// Interrupt acknowledge from the requester side (`interrupt_ack_out`).
    pub interrupt_ack_out: bool,
    /// Sync strobe from the bus side (`sync_in`).
    pub sync_in: bool,
}

impl PassthroughInputs {
    /// Identity mapping onto the opposite interface.
    #[must_use]
    pub const fn relay(self) -> PassthroughOutputs {
        PassthroughOutputs {
            interrupt_out: self.interrupt_in,
            interrupt_ack_in: self.interrupt_ack_out,
            sync_out: self.sync_in,
        }
    }
}

/// Driven side of the interrupt/sync passthrough wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PassthroughOutputs {
    /// Relayed `interrupt_in`.
    pub interrupt_out: bool,
    /// Relayed `interrupt_ack_out`.
    pub interrupt_ack_in: bool,
    /// Relayed `sync_in`.
    pub sync_out: bool,
}

/// Everything the controller samples on one clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControllerInputs<A = u16, D = u16> {
    /// Active-low asynchronous reset; `false` holds the controller in reset.
    pub reset_n: bool,
    /// Target acknowledge (`bus_ack`).
    pub bus_ack: bool,
    /// Read data returned by the target (`bus_data_in`).
    pub bus_data_in: D,
    /// Requester handshake.
    pub request: Request<A, D>,
    /// Passthrough sources.
    pub passthrough: PassthroughInputs,
}

impl<A: BusWord, D: BusWord> Default for ControllerInputs<A, D> {
    fn default() -> Self {
        Self {
            reset_n: true,
            bus_ack: false,
            bus_data_in: D::ZERO,
            request: Request::idle(),
            passthrough: PassthroughInputs::default(),
        }
    }
}

impl<A: BusWord, D: BusWord> ControllerInputs<A, D> {
    /// Inputs with reset released, no acknowledge and the given request.
    #[must_use]
    pub fn with_request(request: Request<A, D>) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    /// Inputs with reset released and the target acknowledging with `data`.
    #[must_use]
    pub fn with_ack(data: D) -> Self {
        Self {
            bus_ack: true,
            bus_data_in: data,
            ..Self::default()
        }
    }

    /// Inputs holding the controller in reset.
    #[must_use]
    pub fn in_reset() -> Self {
        Self {
            reset_n: false,
            ..Self::default()
        }
    }
}

/// Registered Wishbone master outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusOutputs<A = u16, D = u16> {
    /// `bus_write_enable`: `true` for write, `false` for read.
    pub write_enable: bool,
    /// `bus_strobe`.
    pub strobe: bool,
    /// `bus_cycle`.
    pub cycle: bool,
    /// `bus_address`.
    pub address: A,
    /// `bus_data_out`.
    pub data_out: D,
}

impl<A, D> BusOutputs<A, D> {
    /// Both cycle and strobe asserted: a transfer is being presented.
    #[must_use]
    pub const fn transfer_active(&self) -> bool {
        self.cycle && self.strobe
    }
}

/// Registered response handshake seen by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Response<D = u16> {
    /// Latched read result (`resp_data`), meaningful while `valid` is high.
    pub data: D,
    /// Transaction in flight (`resp_busy`).
    pub busy: bool,
    /// One-cycle completion pulse (`resp_valid`).
    pub valid: bool,
}

/// Complete output bundle after a clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControllerOutputs<A = u16, D = u16> {
    /// Wishbone master side.
    pub bus: BusOutputs<A, D>,
    /// Requester side.
    pub response: Response<D>,
    /// Relayed interrupt/sync wires.
    pub passthrough: PassthroughOutputs,
}
