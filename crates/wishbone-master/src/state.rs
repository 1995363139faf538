//! Registered state of the bus-master controller.

use crate::{BusOutputs, BusWord, Response};

/// Encoded value of [`ControllerState::Idle`] in the state register.
pub const STATE_IDLE_BITS: u8 = 0;
/// Encoded value of [`ControllerState::Waiting`] in the state register.
pub const STATE_WAITING_BITS: u8 = 1;

/// Bus-master state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ControllerState {
    /// No transaction outstanding; a start pulse is sampled.
    #[default]
    Idle,
    /// Bus cycle presented; waiting for the target to acknowledge.
    Waiting,
}

impl ControllerState {
    /// Returns the state register encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Idle => STATE_IDLE_BITS,
            Self::Waiting => STATE_WAITING_BITS,
        }
    }

    /// Decodes a state register value; `None` for unused encodings.
    #[must_use]
    pub const fn decode(bits: u8) -> Option<Self> {
        match bits {
            STATE_IDLE_BITS => Some(Self::Idle),
            STATE_WAITING_BITS => Some(Self::Waiting),
            _ => None,
        }
    }
}

/// The controller's register bank.
///
/// `Default` is the reset value: state `Idle` and every registered output low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers<A = u16, D = u16> {
    pub(crate) state_bits: u8,
    pub(crate) bus: BusOutputs<A, D>,
    pub(crate) read_data: D,
    pub(crate) busy: bool,
    pub(crate) valid: bool,
}

impl<A: BusWord, D: BusWord> Registers<A, D> {
    /// Raw state register contents.
    #[must_use]
    pub const fn state_bits(&self) -> u8 {
        self.state_bits
    }

    /// Decoded state, `None` while the register holds an unused encoding.
    #[must_use]
    pub const fn decoded_state(&self) -> Option<ControllerState> {
        ControllerState::decode(self.state_bits)
    }

    /// Registered bus outputs.
    #[must_use]
    pub const fn bus(&self) -> BusOutputs<A, D> {
        self.bus
    }

    /// Registered response outputs.
    #[must_use]
    pub const fn response(&self) -> Response<D> {
        Response {
            data: self.read_data,
            busy: self.busy,
            valid: self.valid,
        }
    }

    /// Overwrites the state register with an arbitrary encoding.
    ///
    /// Models a corrupted state register; the next edge recovers to `Idle`
    /// when the encoding is unused.
    pub const fn force_state_bits(&mut self, bits: u8) {
        self.state_bits = bits;
    }

    /// Returns `true` when every register holds its reset value.
    #[must_use]
    pub fn is_reset_value(&self) -> bool {
        *self == Self::default()
    }
}
