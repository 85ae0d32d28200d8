//! Worldline - deterministic month-stepped simulation of global
//! catastrophe trajectories
//!
//! A run advances one shared world state a month at a time through an
//! ordered pipeline of phases, funnels every catastrophic subsystem
//! through a single population-mortality ledger, and logs every
//! decision to an append-only event log. One seed, one trajectory:
//! identical seeds reproduce bit-identical runs.

pub mod breaker;
pub mod cascade;
pub mod core;
pub mod ledger;
pub mod montecarlo;
pub mod phases;
pub mod scenario;
pub mod scheduler;
pub mod state;
