//! Pure, deterministic core: geometry, reference data, path lookup, session
//! configuration, and the transition table. No I/O and no clocks; everything
//! here is testable in isolation.

pub mod catalog;
pub mod config;
pub mod geometry;
pub mod paths;
pub mod transitions;
