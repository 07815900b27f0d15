//! Test-only helpers for driving the machine through scenarios.

use std::thread;
use std::time::Duration;

use crate::core::transitions::State;
use crate::machine::{FishingMachine, Tuning};
use crate::world::WorldSnapshot;

/// Tuning with waits shrunk to keep scenario tests fast.
pub fn fast_tuning() -> Tuning {
    Tuning {
        idle_backoff_min: Duration::from_millis(1),
        idle_backoff_max: Duration::from_millis(1),
        bank_open_wait: Duration::from_millis(5),
        deposit_wait: Duration::from_millis(1),
        close_wait: Duration::from_millis(1),
        walk_timeout: Duration::from_secs(1),
        teleport_timeout: Duration::from_secs(1),
    }
}

/// Tick until the machine reaches `target`, allowing navigation workers a
/// moment to complete between ticks. Returns whether the state was reached
/// within `max_ticks`.
pub fn tick_until<W: WorldSnapshot>(
    machine: &mut FishingMachine<W>,
    target: State,
    max_ticks: u32,
) -> bool {
    for _ in 0..max_ticks {
        if machine.state() == target {
            return true;
        }
        machine.tick();
        thread::sleep(Duration::from_millis(2));
    }
    machine.state() == target
}
