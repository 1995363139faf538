//! Single-outstanding Wishbone bus-master state machine.
//!
//! The controller is split the way the hardware is: [`evaluate`] is the
//! combinational next-state/next-output logic and has no side effects, while
//! [`BusMasterController`] owns the register bank and commits one evaluation
//! per rising clock edge. Reset is checked before the synchronous update and
//! overrides it.
//!
//! Transition table (reset released):
//!
//! | state     | condition | next state | effect                                     |
//! |-----------|-----------|------------|--------------------------------------------|
//! | `Idle`    | start     | `Waiting`  | latch request, raise cyc/stb/busy, drop valid |
//! | `Idle`    | no start  | `Idle`     | drop cyc/stb/we/valid                      |
//! | `Waiting` | ack       | `Idle`     | latch read data, drop busy, raise valid    |
//! | `Waiting` | no ack    | `Waiting`  | hold everything                            |
//! | invalid   | any       | `Idle`     | drop cyc/stb/we/busy/valid                 |

use crate::{
    BusOutputs, BusWord, CompletionPolicy, ControllerConfig, ControllerInputs, ControllerOutputs,
    ControllerState, NullTrace, PassthroughInputs, Registers, TraceEvent, TraceSink,
};

/// Which row of the transition table an evaluation took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// `Idle` without start.
    IdleNoStart,
    /// `Idle` with start: a transaction was accepted.
    Accepted,
    /// `Waiting` without acknowledge.
    Holding,
    /// `Waiting` with acknowledge: the transaction completed.
    Completed,
    /// The state register held an unused encoding.
    Recovered {
        /// The unused encoding.
        bits: u8,
    },
}

/// Result of one combinational evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition<A = u16, D = u16> {
    /// Register values to commit on the edge.
    pub next: Registers<A, D>,
    /// Table row taken.
    pub kind: TransitionKind,
}

/// Computes the register values for the next edge from the current registers
/// and the sampled inputs. Reset is not considered here.
#[must_use]
pub fn evaluate<A: BusWord, D: BusWord>(
    current: &Registers<A, D>,
    inputs: &ControllerInputs<A, D>,
    policy: CompletionPolicy,
) -> Transition<A, D> {
    let mut next = *current;

    let kind = match current.decoded_state() {
        Some(ControllerState::Idle) => {
            let request = &inputs.request;
            if request.start {
                next.state_bits = ControllerState::Waiting.bits();
                next.bus = BusOutputs {
                    write_enable: request.write_enable,
                    strobe: true,
                    cycle: true,
                    address: request.address,
                    data_out: request.data,
                };
                next.busy = true;
                next.valid = false;
                TransitionKind::Accepted
            } else {
                drop_bus_control(&mut next.bus);
                next.busy = false;
                next.valid = false;
                TransitionKind::IdleNoStart
            }
        }
        Some(ControllerState::Waiting) => {
            if inputs.bus_ack {
                next.state_bits = ControllerState::Idle.bits();
                next.read_data = inputs.bus_data_in;
                next.busy = false;
                next.valid = true;
                if policy == CompletionPolicy::ClearBusOutputs {
                    drop_bus_control(&mut next.bus);
                }
                TransitionKind::Completed
            } else {
                TransitionKind::Holding
            }
        }
        None => {
            next.state_bits = ControllerState::Idle.bits();
            drop_bus_control(&mut next.bus);
            next.busy = false;
            next.valid = false;
            TransitionKind::Recovered {
                bits: current.state_bits,
            }
        }
    };

    Transition { next, kind }
}

/// Pure next-state function: the register values [`evaluate`] would commit.
#[must_use]
pub fn next_registers<A: BusWord, D: BusWord>(
    current: &Registers<A, D>,
    inputs: &ControllerInputs<A, D>,
    policy: CompletionPolicy,
) -> Registers<A, D> {
    evaluate(current, inputs, policy).next
}

const fn drop_bus_control<A, D>(bus: &mut BusOutputs<A, D>) {
    bus.strobe = false;
    bus.cycle = false;
    bus.write_enable = false;
}

/// Clocked bus-master controller with its register bank.
///
/// `A` is the address word and `D` the data word; both default to 16 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMasterController<A = u16, D = u16> {
    pub(crate) config: ControllerConfig,
    pub(crate) regs: Registers<A, D>,
    pub(crate) cycle: u64,
    pub(crate) accepted_at: Option<u64>,
}

impl<A: BusWord, D: BusWord> Default for BusMasterController<A, D> {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl<A: BusWord, D: BusWord> BusMasterController<A, D> {
    /// Creates a controller with every register at its reset value.
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            regs: Registers::default(),
            cycle: 0,
            accepted_at: None,
        }
    }

    /// Configuration the controller was built with.
    #[must_use]
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current register bank.
    #[must_use]
    pub const fn registers(&self) -> &Registers<A, D> {
        &self.regs
    }

    /// Decoded state; `None` while the state register holds an unused encoding.
    #[must_use]
    pub const fn state(&self) -> Option<ControllerState> {
        self.regs.decoded_state()
    }

    /// Number of clock edges committed since construction.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// `resp_busy`.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.regs.busy
    }

    /// Registered outputs with the passthrough wires driven from `passthrough`.
    #[must_use]
    pub const fn outputs(&self, passthrough: PassthroughInputs) -> ControllerOutputs<A, D> {
        ControllerOutputs {
            bus: self.regs.bus,
            response: self.regs.response(),
            passthrough: passthrough.relay(),
        }
    }

    /// Overwrites the state register with an arbitrary encoding.
    pub const fn force_state_bits(&mut self, bits: u8) {
        self.regs.force_state_bits(bits);
    }

    /// Commits one rising clock edge.
    pub fn tick(&mut self, inputs: &ControllerInputs<A, D>) -> ControllerOutputs<A, D> {
        self.tick_traced(inputs, &mut NullTrace)
    }

    /// Commits one rising clock edge, reporting to `sink` when tracing is
    /// enabled in the configuration.
    pub fn tick_traced(
        &mut self,
        inputs: &ControllerInputs<A, D>,
        sink: &mut dyn TraceSink,
    ) -> ControllerOutputs<A, D> {
        self.cycle = self.cycle.wrapping_add(1);
        let cycle = self.cycle;

        if !inputs.reset_n {
            let aborted_transaction = self.clear_registers();
            self.emit(
                sink,
                TraceEvent::ResetApplied {
                    cycle,
                    aborted_transaction,
                },
            );
            return self.outputs(inputs.passthrough);
        }

        let transition = evaluate(&self.regs, inputs, self.config.completion);
        match transition.kind {
            TransitionKind::Accepted => {
                let bus = transition.next.bus;
                log::trace!(
                    "cycle {cycle}: accepted {} at {:#x}",
                    if bus.write_enable { "write" } else { "read" },
                    bus.address
                );
                self.accepted_at = Some(cycle);
                self.emit(
                    sink,
                    TraceEvent::TransactionAccepted {
                        cycle,
                        address: bus.address.to_u64(),
                        data: bus.data_out.to_u64(),
                        write_enable: bus.write_enable,
                    },
                );
            }
            TransitionKind::Completed => {
                let wait_cycles = self
                    .accepted_at
                    .take()
                    .map_or(0, |accepted| cycle.wrapping_sub(accepted));
                log::trace!("cycle {cycle}: acknowledged after {wait_cycles} cycles");
                self.emit(
                    sink,
                    TraceEvent::TransactionCompleted {
                        cycle,
                        data: transition.next.read_data.to_u64(),
                        write_enable: self.regs.bus.write_enable,
                        wait_cycles,
                    },
                );
            }
            TransitionKind::Recovered { bits } => {
                log::warn!("cycle {cycle}: state register held {bits:#x}, forced to idle");
                self.accepted_at = None;
                self.emit(sink, TraceEvent::InvalidStateRecovered { cycle, bits });
            }
            TransitionKind::IdleNoStart | TransitionKind::Holding => {}
        }

        self.regs = transition.next;
        self.outputs(inputs.passthrough)
    }

    /// Asynchronous reset between clock edges.
    ///
    /// Returns `true` when a transaction in flight was discarded.
    pub fn assert_reset(&mut self) -> bool {
        self.assert_reset_traced(&mut NullTrace)
    }

    /// Asynchronous reset between clock edges, reporting
    /// [`TraceEvent::ResetApplied`] against the last committed edge.
    pub fn assert_reset_traced(&mut self, sink: &mut dyn TraceSink) -> bool {
        let aborted_transaction = self.clear_registers();
        log::debug!("asynchronous reset after cycle {}", self.cycle);
        self.emit(
            sink,
            TraceEvent::ResetApplied {
                cycle: self.cycle,
                aborted_transaction,
            },
        );
        aborted_transaction
    }

    fn clear_registers(&mut self) -> bool {
        let aborted = self.state() == Some(ControllerState::Waiting);
        self.regs = Registers::default();
        self.accepted_at = None;
        aborted
    }

    fn emit(&self, sink: &mut dyn TraceSink, event: TraceEvent) {
        if self.config.tracing_enabled {
            sink.on_event(event);
        }
    }
}
