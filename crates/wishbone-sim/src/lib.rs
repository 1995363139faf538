//! Script-driven simulation of the Wishbone bus master.

use env_logger as _;
#[cfg(test)]
use tempfile as _;

/// Execution of parsed scripts against a memory-backed simulator.
pub mod runner;
/// Transaction script parsing.
pub mod script;
