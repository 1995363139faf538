//! End-to-end requester/target flows through the simulator with a monitor
//! and scoreboard attached.

#![allow(clippy::pedantic, clippy::nursery)]

use log as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use wishbone_master::{
    BusWord, CompletionPolicy, ControllerConfig, MemoryTarget, ScoreboardError, Scoreboard,
    Signal, SimConfig, Simulator, TargetConfig, TransactionError, WatchdogConfig,
};

fn monitored(config: SimConfig) -> Simulator<MemoryTarget> {
    Simulator::with_memory(config)
        .expect("valid config")
        .with_monitor()
}

#[test]
fn reset_write_read_flow_matches_scoreboard() {
    let mut sim = monitored(SimConfig {
        target: TargetConfig { ack_latency: 2 },
        ..SimConfig::default()
    });

    assert!(!sim.hold_reset(3));
    sim.idle(1).expect("no watchdog");

    let mut scoreboard = Scoreboard::new();
    scoreboard
        .expect(Signal::Strobe, 1)
        .expect(Signal::Cycle, 1)
        .expect(Signal::Address, 0x0010)
        .expect(Signal::DataOut, 0x1234);

    let completion = sim.write(0x0010, 0x1234).expect("write completes");
    assert!(completion.cycles <= 5, "busy held for {} cycles", completion.cycles);

    // Bus lines still carry the completed transfer on the valid edge.
    let monitor = sim.monitor().expect("monitor enabled");
    assert_eq!(scoreboard.check_latest(monitor), Ok(()));

    assert_eq!(sim.read(0x0010), Ok(0x1234));
}

#[test]
fn clear_policy_fails_the_same_scoreboard() {
    let mut sim = monitored(SimConfig {
        controller: ControllerConfig {
            completion: CompletionPolicy::ClearBusOutputs,
            ..ControllerConfig::default()
        },
        ..SimConfig::default()
    });

    let mut scoreboard = Scoreboard::new();
    scoreboard.expect(Signal::Strobe, 1);

    sim.write(0x0010, 0x1234).expect("write completes");
    let monitor = sim.monitor().expect("monitor enabled");
    assert_eq!(
        scoreboard.check_latest(monitor),
        Err(ScoreboardError::Mismatch {
            signal: Signal::Strobe,
            expected: 1,
            observed: 0,
        })
    );
}

#[test]
fn monitor_sees_exactly_one_valid_edge_per_transaction() {
    let mut sim = monitored(SimConfig::default());

    for address in 0..4u16 {
        sim.write(address, address * 3).expect("write completes");
        sim.idle(2).expect("no watchdog");
    }
    for address in 0..4u16 {
        assert_eq!(sim.read(address), Ok(address * 3));
    }

    let monitor = sim.monitor().expect("monitor enabled");
    let valid_edges = monitor.samples().iter().filter(|s| s.valid).count();
    assert_eq!(valid_edges, 8);

    for sample in monitor.samples().iter().filter(|s| s.valid) {
        assert!(!sample.busy);
    }
    assert_eq!(sim.target().write_count(), 4);
    assert_eq!(sim.target().read_count(), 4);
}

#[test]
fn watchdog_abandons_and_next_transaction_proceeds() {
    let config = SimConfig {
        target: TargetConfig { ack_latency: 50 },
        watchdog: Some(WatchdogConfig { timeout_cycles: 10 }),
        ..SimConfig::default()
    };
    let mut sim = Simulator::<MemoryTarget>::with_memory(config).expect("valid config");

    assert_eq!(
        sim.write(0x1, 0x2),
        Err(TransactionError::WatchdogExpired { cycles: 10 })
    );
    assert!(!sim.outstanding());

    sim.target_mut().poke(0x3, 0x4);
    assert_eq!(
        sim.read(0x3),
        Err(TransactionError::WatchdogExpired { cycles: 10 })
    );
    assert_eq!(sim.target().write_count(), 0);
}

fn roundtrip<A: BusWord, D: BusWord>(address: u64, data: u64) {
    let mut sim = Simulator::<MemoryTarget<A, D>, A, D>::with_memory(SimConfig::default())
        .expect("valid config");
    let address = A::from_u64_truncating(address);
    let data = D::from_u64_truncating(data);

    sim.write(address, data).expect("write completes");
    assert_eq!(sim.read(address), Ok(data));
    assert_eq!(sim.target().peek(address), data);
}

#[rstest]
#[case::narrow_data(0x1234, 0xAB)]
#[case::wide(0xDEAD_BEEF, 0x0123_4567)]
fn non_default_widths_roundtrip(#[case] address: u64, #[case] data: u64) {
    roundtrip::<u32, u8>(address, data);
    roundtrip::<u64, u32>(address, data);
    roundtrip::<u8, u64>(address, data);
}

proptest! {
    #[test]
    fn property_memory_roundtrip_for_any_latency(
        latency in 0u32..8,
        writes in prop::collection::vec((any::<u16>(), any::<u16>()), 1..16),
    ) {
        let mut sim = Simulator::<MemoryTarget>::with_memory(SimConfig {
            target: TargetConfig { ack_latency: latency },
            ..SimConfig::default()
        })
        .expect("valid config");

        for &(address, data) in &writes {
            let completion = sim.write(address, data).expect("write completes");
            prop_assert_eq!(completion.cycles, u64::from(latency) + 2);
        }

        for &(address, _) in &writes {
            let expected = sim.target().peek(address);
            prop_assert_eq!(sim.read(address), Ok(expected));
        }
    }
}
