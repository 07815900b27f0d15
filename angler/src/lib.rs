//! Autonomous fishing-session core.
//!
//! This crate implements a tick-driven control loop for a long-running
//! gathering task observed through a coarse world snapshot. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (geometry, reference data, path
//!   lookup, configuration, the transition table). No I/O, fully testable in
//!   isolation.
//! - **Services ([`navigation`], [`metrics`])**: the only concurrency in the
//!   crate. Navigation runs goals on a worker thread and reports back over a
//!   channel; metrics sit behind a mutex shared with the status surface.
//! - **[`machine`]**: the single-owner orchestrator, driven by `tick()` at a
//!   fixed cadence from the operator layer.
//!
//! External collaborators (the live world accessor, the movement primitive,
//! the price client) enter only through the [`world::WorldSnapshot`],
//! [`navigation::Mover`], and [`metrics::PriceSource`] seams; [`sim`]
//! provides in-memory implementations for tests and the demo command.

pub mod core;
pub mod exit_codes;
pub mod logging;
pub mod machine;
pub mod metrics;
pub mod navigation;
pub mod sim;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod world;
