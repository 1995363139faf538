//! Executes parsed scripts against a memory-backed simulator.
//!
//! Each command runs to completion before the next one starts. A failed
//! transaction is recorded and execution continues with the following line,
//! so one stalled access does not hide later mismatches.

use std::fmt;

use wishbone_master::{
    Completion, MemoryTarget, PassthroughInputs, PassthroughOutputs, Request, Simulator,
    TransactionError,
};

use crate::script::{Command, PassthroughSource, ScriptLine};

/// What a single command produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A write reached its completion edge.
    Written {
        /// Edges from start to completion.
        cycles: u64,
    },
    /// A read reached its completion edge.
    Read {
        /// Value sampled with `resp_valid`.
        data: u16,
        /// Value the script required, if any.
        expected: Option<u16>,
        /// Edges from start to completion.
        cycles: u64,
    },
    /// The transaction did not complete.
    Failed(TransactionError),
    /// Idle cycles were clocked.
    Clocked {
        /// Number of edges.
        cycles: u64,
    },
    /// Reset was held and released.
    Reset {
        /// `true` when a transaction was discarded.
        discarded: bool,
    },
    /// A passthrough source was driven.
    Relayed {
        /// Passthrough outputs observed after driving the source.
        outputs: PassthroughOutputs,
    },
}

impl Outcome {
    /// Returns true unless a transaction failed or a read mismatched.
    #[must_use]
    pub fn passed(&self) -> bool {
        match self {
            Self::Failed(_) => false,
            Self::Read {
                data,
                expected: Some(expected),
                ..
            } => data == expected,
            _ => true,
        }
    }
}

/// Result of one script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineResult {
    /// 1-indexed source line.
    pub line: usize,
    /// Command that ran.
    pub command: Command,
    /// What it produced.
    pub outcome: Outcome,
}

impl LineResult {
    /// Returns true if the line's outcome passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

impl fmt::Display for LineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ... ", self.line, self.command)?;
        match self.outcome {
            Outcome::Written { cycles } => write!(f, "ok ({cycles} cycles)"),
            Outcome::Read {
                data,
                expected: Some(expected),
                ..
            } if data != expected => {
                write!(f, "FAILED: expected {expected:#06x}, got {data:#06x}")
            }
            Outcome::Read { data, cycles, .. } => write!(f, "ok {data:#06x} ({cycles} cycles)"),
            Outcome::Failed(error) => write!(f, "FAILED: {error}"),
            Outcome::Clocked { .. } => write!(f, "ok"),
            Outcome::Reset { discarded: true } => write!(f, "ok (transaction discarded)"),
            Outcome::Reset { discarded: false } => write!(f, "ok"),
            Outcome::Relayed { outputs } => write!(
                f,
                "ok (interrupt_out={} interrupt_ack_in={} sync_out={})",
                u8::from(outputs.interrupt_out),
                u8::from(outputs.interrupt_ack_in),
                u8::from(outputs.sync_out)
            ),
        }
    }
}

/// Result of running a whole script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Results in script order.
    pub results: Vec<LineResult>,
    /// Edges committed by the controller when the script finished.
    pub total_cycles: u64,
}

impl RunReport {
    /// Returns true if every line passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(LineResult::passed)
    }

    /// Returns counts for summary reporting.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let passed = self.results.iter().filter(|r| r.passed()).count();
        RunSummary {
            passed,
            failed: self.results.len() - passed,
            total: self.results.len(),
        }
    }
}

/// Summary counts for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines that passed.
    pub passed: usize,
    /// Lines that failed.
    pub failed: usize,
    /// Total lines executed.
    pub total: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed, {} failed", self.passed, self.failed)
    }
}

/// Runs every line of `script` in order.
#[must_use]
pub fn run_script(sim: &mut Simulator<MemoryTarget>, script: &[ScriptLine]) -> RunReport {
    let mut passthrough = PassthroughInputs::default();
    let mut results = Vec::with_capacity(script.len());

    for line in script {
        let outcome = run_command(sim, &mut passthrough, line.command);
        let result = LineResult {
            line: line.line,
            command: line.command,
            outcome,
        };
        if result.passed() {
            log::debug!("{result}");
        } else {
            log::info!("{result}");
        }
        results.push(result);
    }

    RunReport {
        results,
        total_cycles: sim.controller().cycle(),
    }
}

fn run_command(
    sim: &mut Simulator<MemoryTarget>,
    passthrough: &mut PassthroughInputs,
    command: Command,
) -> Outcome {
    match command {
        Command::Write { address, data } => match transact(sim, Request::write(address, data)) {
            Ok(completion) => Outcome::Written {
                cycles: completion.cycles,
            },
            Err(error) => Outcome::Failed(error),
        },
        Command::Read { address, expect } => match transact(sim, Request::read(address)) {
            Ok(completion) => Outcome::Read {
                data: completion.data,
                expected: expect,
                cycles: completion.cycles,
            },
            Err(error) => Outcome::Failed(error),
        },
        Command::Idle { cycles } => match sim.idle(cycles) {
            Ok(()) => Outcome::Clocked { cycles },
            Err(error) => Outcome::Failed(error),
        },
        Command::Reset { cycles } => Outcome::Reset {
            discarded: sim.hold_reset(cycles),
        },
        Command::Drive { source, level } => {
            match source {
                PassthroughSource::Interrupt => passthrough.interrupt_in = level,
                PassthroughSource::InterruptAck => passthrough.interrupt_ack_out = level,
                PassthroughSource::Sync => passthrough.sync_in = level,
            }
            sim.set_passthrough(*passthrough);
            Outcome::Relayed {
                outputs: sim.outputs().passthrough,
            }
        }
    }
}

fn transact(
    sim: &mut Simulator<MemoryTarget>,
    request: Request,
) -> Result<Completion, TransactionError> {
    sim.submit(request)?;
    let limit = sim.config().max_wait_cycles;
    sim.run_until_complete(limit)
}
