//! Cycle-stepped harness around one controller and one bus target.
//!
//! The simulator plays the internal requester: it honors the request
//! contract (never presents start while busy), turns a submitted request into
//! a one-cycle start pulse, and samples `resp_valid`/`resp_data` on the
//! completion edge.

use crate::{
    BusMasterController, BusMonitor, BusSample, BusTarget, BusWord, ConfigError,
    ControllerInputs, ControllerOutputs, MemoryTarget, PassthroughInputs, Request, RequestError,
    SimConfig, TraceEvent, TransactionError, Watchdog, WatchdogVerdict,
};

/// A transaction that reached its completion edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Completion<D = u16> {
    /// `resp_data` sampled while `resp_valid` was high.
    pub data: D,
    /// Edges from the call until the completion edge, inclusive.
    pub cycles: u64,
}

/// Requester-side simulator.
#[derive(Debug)]
pub struct Simulator<T, A = u16, D = u16> {
    config: SimConfig,
    controller: BusMasterController<A, D>,
    target: T,
    watchdog: Option<Watchdog>,
    monitor: Option<BusMonitor>,
    pending: Option<Request<A, D>>,
    passthrough: PassthroughInputs,
    reset_held: bool,
    trace: Vec<TraceEvent>,
}

impl<A: BusWord, D: BusWord> Simulator<MemoryTarget<A, D>, A, D> {
    /// Simulator backed by a [`MemoryTarget`] built from `config.target`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration validation failure.
    pub fn with_memory(config: SimConfig) -> Result<Self, ConfigError> {
        Self::new(config, MemoryTarget::new(config.target))
    }
}

impl<T: BusTarget<A, D>, A: BusWord, D: BusWord> Simulator<T, A, D> {
    /// Creates a simulator with the controller in its reset state.
    ///
    /// # Errors
    ///
    /// Returns the first configuration validation failure.
    pub fn new(config: SimConfig, target: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let watchdog = config.watchdog.map(Watchdog::new).transpose()?;

        Ok(Self {
            config,
            controller: BusMasterController::new(config.controller),
            target,
            watchdog,
            monitor: None,
            pending: None,
            passthrough: PassthroughInputs::default(),
            reset_held: false,
            trace: Vec::new(),
        })
    }

    /// Starts recording one [`BusSample`] per edge.
    #[must_use]
    pub fn with_monitor(mut self) -> Self {
        self.monitor = Some(BusMonitor::new());
        self
    }

    /// Simulator configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The controller under simulation.
    #[must_use]
    pub const fn controller(&self) -> &BusMasterController<A, D> {
        &self.controller
    }

    /// Mutable access to the controller, e.g. to corrupt its state register.
    pub const fn controller_mut(&mut self) -> &mut BusMasterController<A, D> {
        &mut self.controller
    }

    /// The bus target.
    #[must_use]
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Mutable access to the bus target.
    pub const fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Recorded samples, when monitoring was enabled.
    #[must_use]
    pub const fn monitor(&self) -> Option<&BusMonitor> {
        self.monitor.as_ref()
    }

    /// Trace events collected so far (empty unless tracing is enabled).
    #[must_use]
    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Drains collected trace events.
    pub fn take_trace(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.trace)
    }

    /// Current outputs, with passthrough driven from the current sources.
    #[must_use]
    pub const fn outputs(&self) -> ControllerOutputs<A, D> {
        self.controller.outputs(self.passthrough)
    }

    /// Drives the interrupt/sync passthrough sources.
    pub const fn set_passthrough(&mut self, passthrough: PassthroughInputs) {
        self.passthrough = passthrough;
    }

    /// Holds (`true`) or releases (`false`) the active-low reset input.
    pub const fn set_reset(&mut self, asserted: bool) {
        self.reset_held = asserted;
    }

    /// `true` while a start pulse is queued or a transaction is in flight.
    #[must_use]
    pub const fn outstanding(&self) -> bool {
        self.pending.is_some() || self.controller.is_busy()
    }

    /// Queues `request` as a start pulse on the next edge.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Busy`] while a transaction is outstanding.
    pub fn submit(&mut self, request: Request<A, D>) -> Result<(), RequestError> {
        if self.outstanding() {
            return Err(RequestError::Busy);
        }
        self.pending = Some(Request {
            start: true,
            ..request
        });
        Ok(())
    }

    /// Advances one clock cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::WatchdogExpired`] when the watchdog fires;
    /// the controller has then been reset and the transaction is gone.
    pub fn step(&mut self) -> Result<ControllerOutputs<A, D>, TransactionError> {
        let response = self.target.respond(&self.controller.registers().bus());
        let request = self.pending.take().unwrap_or_else(Request::idle);
        let inputs = ControllerInputs {
            reset_n: !self.reset_held,
            bus_ack: response.ack,
            bus_data_in: response.data,
            request,
            passthrough: self.passthrough,
        };

        let outputs = self.controller.tick_traced(&inputs, &mut self.trace);
        if let Some(monitor) = &mut self.monitor {
            monitor.record(BusSample::capture(
                self.controller.cycle(),
                &outputs,
                response.ack,
            ));
        }

        if let Some(watchdog) = &mut self.watchdog {
            if let WatchdogVerdict::Expired { cycles } = watchdog.observe(outputs.response.busy) {
                self.controller.assert_reset_traced(&mut self.trace);
                watchdog.rearm();
                return Err(TransactionError::WatchdogExpired { cycles });
            }
        }

        Ok(outputs)
    }

    /// Advances `cycles` clock cycles.
    ///
    /// # Errors
    ///
    /// Propagates [`Simulator::step`] failures.
    pub fn idle(&mut self, cycles: u64) -> Result<(), TransactionError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Holds reset for `cycles` edges, then releases it.
    ///
    /// Returns `true` when a transaction was discarded.
    pub fn hold_reset(&mut self, cycles: u64) -> bool {
        if cycles == 0 {
            return false;
        }
        let discarded = self.outstanding();
        log::debug!("holding reset for {cycles} cycles");

        self.reset_held = true;
        for _ in 0..cycles {
            // Busy is low throughout reset, so the watchdog cannot fire.
            if let Err(error) = self.step() {
                log::warn!("unexpected failure while reset was held: {error}");
            }
        }
        self.reset_held = false;
        self.pending = None;

        discarded
    }

    /// Steps until the outstanding transaction completes.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::NothingOutstanding`] when nothing is queued or in flight.
    /// - [`TransactionError::Stalled`] when `max_cycles` elapse first.
    /// - [`TransactionError::WatchdogExpired`] when the watchdog fires.
    /// - [`TransactionError::AbortedByReset`] when the transaction vanishes
    ///   without a completion pulse.
    pub fn run_until_complete(&mut self, max_cycles: u64) -> Result<Completion<D>, TransactionError> {
        if !self.outstanding() {
            return Err(TransactionError::NothingOutstanding);
        }

        for elapsed in 1..=max_cycles {
            let outputs = self.step()?;
            if outputs.response.valid {
                return Ok(Completion {
                    data: outputs.response.data,
                    cycles: elapsed,
                });
            }
            if !self.outstanding() {
                return Err(TransactionError::AbortedByReset);
            }
        }

        log::warn!("transaction still outstanding after {max_cycles} cycles");
        Err(TransactionError::Stalled { cycles: max_cycles })
    }

    /// Writes `data` to `address` and waits for the acknowledge.
    ///
    /// # Errors
    ///
    /// As [`Simulator::submit`] and [`Simulator::run_until_complete`].
    pub fn write(&mut self, address: A, data: D) -> Result<Completion<D>, TransactionError> {
        self.submit(Request::write(address, data))?;
        self.run_until_complete(self.config.max_wait_cycles)
    }

    /// Reads `address` and waits for the acknowledge.
    ///
    /// # Errors
    ///
    /// As [`Simulator::submit`] and [`Simulator::run_until_complete`].
    pub fn read(&mut self, address: A) -> Result<D, TransactionError> {
        self.submit(Request::read(address))?;
        self.run_until_complete(self.config.max_wait_cycles)
            .map(|completion| completion.data)
    }
}

#[cfg(test)]
mod tests {
    use super::Simulator;
    use crate::{
        BusOutputs, ControllerConfig, MemoryTarget, NeverAck, PassthroughInputs, Request,
        RequestError, SimConfig, TargetConfig, TargetResponse, TraceEvent, TransactionError,
        WatchdogConfig,
    };

    fn memory_sim(ack_latency: u32) -> Simulator<MemoryTarget> {
        Simulator::with_memory(SimConfig {
            target: TargetConfig { ack_latency },
            ..SimConfig::default()
        })
        .expect("valid config")
    }

    #[test]
    fn write_then_read_back() {
        let mut sim = memory_sim(2);

        sim.write(0x0010, 0x1234).expect("write completes");
        assert_eq!(sim.target().peek(0x0010), 0x1234);
        assert_eq!(sim.read(0x0010), Ok(0x1234));
    }

    #[test]
    fn completion_counts_edges_including_latency() {
        let mut sim = memory_sim(3);
        sim.submit(Request::read(0x4)).expect("idle simulator");

        let completion = sim.run_until_complete(100).expect("completes");
        // accept edge, 3 latency cycles, ack edge
        assert_eq!(completion.cycles, 5);
    }

    #[test]
    fn submit_is_refused_while_outstanding() {
        let mut sim = memory_sim(4);
        sim.submit(Request::read(0x0)).expect("first submit");
        assert_eq!(sim.submit(Request::read(0x2)), Err(RequestError::Busy));

        sim.step().expect("no watchdog");
        assert!(sim.controller().is_busy());
        assert_eq!(sim.submit(Request::read(0x2)), Err(RequestError::Busy));
    }

    #[test]
    fn stall_is_reported_after_cycle_limit() {
        let mut sim = Simulator::<_, u16, u16>::new(SimConfig::default(), NeverAck)
            .expect("valid config");
        sim.submit(Request::read(0x0)).expect("idle simulator");

        assert_eq!(
            sim.run_until_complete(8),
            Err(TransactionError::Stalled { cycles: 8 })
        );
        assert!(sim.controller().is_busy());
    }

    #[test]
    fn watchdog_resets_a_stalled_transaction() {
        let config = SimConfig {
            watchdog: Some(WatchdogConfig { timeout_cycles: 3 }),
            ..SimConfig::default()
        };
        let mut sim = Simulator::<_, u16, u16>::new(config, NeverAck).expect("valid config");

        assert_eq!(
            sim.read(0x40),
            Err(TransactionError::WatchdogExpired { cycles: 3 })
        );
        assert!(!sim.controller().is_busy());
        assert!(sim.controller().registers().is_reset_value());
    }

    #[test]
    fn watchdog_reset_closes_the_traced_transaction() {
        let config = SimConfig {
            controller: ControllerConfig {
                tracing_enabled: true,
                ..ControllerConfig::default()
            },
            watchdog: Some(WatchdogConfig { timeout_cycles: 3 }),
            ..SimConfig::default()
        };
        let mut sim = Simulator::<_, u16, u16>::new(config, NeverAck).expect("valid config");

        assert_eq!(
            sim.read(0x40),
            Err(TransactionError::WatchdogExpired { cycles: 3 })
        );
        let trace = sim.take_trace();
        assert_eq!(trace.len(), 2);
        assert!(matches!(
            trace[0],
            TraceEvent::TransactionAccepted { cycle: 1, address: 0x40, .. }
        ));
        assert_eq!(
            trace[1],
            TraceEvent::ResetApplied {
                cycle: 3,
                aborted_transaction: true,
            }
        );
    }

    #[test]
    fn reset_mid_transaction_is_reported_as_abort() {
        let mut sim = memory_sim(10);
        sim.submit(Request::write(0x2, 0x3)).expect("idle simulator");
        sim.step().expect("no watchdog");

        sim.set_reset(true);
        assert_eq!(
            sim.run_until_complete(20),
            Err(TransactionError::AbortedByReset)
        );
        sim.set_reset(false);
        assert_eq!(sim.target().write_count(), 0);
    }

    #[test]
    fn hold_reset_discards_outstanding_work() {
        let mut sim = memory_sim(1);
        sim.submit(Request::read(0x2)).expect("idle simulator");
        assert!(sim.hold_reset(3));
        assert!(!sim.outstanding());
        assert_eq!(
            sim.run_until_complete(4),
            Err(TransactionError::NothingOutstanding)
        );
    }

    #[test]
    fn hold_reset_under_watchdog_discards_cleanly() {
        let config = SimConfig {
            watchdog: Some(WatchdogConfig { timeout_cycles: 1 }),
            ..SimConfig::default()
        };
        let mut sim = Simulator::<_, u16, u16>::new(config, NeverAck).expect("valid config");
        sim.submit(Request::read(0x2)).expect("idle simulator");

        assert!(sim.hold_reset(4));
        assert_eq!(sim.controller().cycle(), 4);
        assert!(sim.controller().registers().is_reset_value());
        assert!(!sim.outstanding());
    }

    #[test]
    fn passthrough_follows_sources_immediately() {
        let mut sim = memory_sim(1);
        sim.set_passthrough(PassthroughInputs {
            interrupt_in: true,
            interrupt_ack_out: false,
            sync_in: true,
        });

        let outputs = sim.outputs();
        assert!(outputs.passthrough.interrupt_out);
        assert!(!outputs.passthrough.interrupt_ack_in);
        assert!(outputs.passthrough.sync_out);
    }

    #[test]
    fn closure_target_sees_registered_outputs() {
        let mut seen = Vec::new();
        let target = |bus: &BusOutputs<u16, u16>| {
            seen.push(bus.transfer_active());
            if bus.transfer_active() {
                TargetResponse::ack(0x77)
            } else {
                TargetResponse::quiet()
            }
        };
        let mut sim =
            Simulator::<_, u16, u16>::new(SimConfig::default(), target).expect("valid config");

        assert_eq!(sim.read(0x1), Ok(0x77));
        drop(sim);
        assert_eq!(seen, vec![false, true]);
    }

    #[test]
    fn trace_collects_when_enabled() {
        let mut sim = Simulator::<MemoryTarget>::with_memory(SimConfig {
            controller: ControllerConfig {
                tracing_enabled: true,
                ..ControllerConfig::default()
            },
            ..SimConfig::default()
        })
        .expect("valid config");

        sim.write(0x8, 0x9).expect("write completes");
        let trace = sim.take_trace();
        assert_eq!(trace.len(), 2);
        assert!(matches!(
            trace[0],
            TraceEvent::TransactionAccepted {
                address: 0x8,
                data: 0x9,
                write_enable: true,
                ..
            }
        ));
        assert!(sim.trace().is_empty());
    }
}
