//! Vortex Simulation Core.
//!
//! This crate contains the queueing model, routing policies and tick driver
//! used to compare load-balancing strategies over a synthetic upstream cluster.
//!
//! Every run is single-threaded and reproducible: all randomness comes from a
//! seeded [`SimRng`] owned by the [`Simulation`].

pub mod config;
pub mod error;
pub mod stats;

/// Domain models for the simulated cluster.
pub mod domain {
    pub mod backend;
    pub mod frontend;
    pub mod proxy;
    pub mod upstream;
}

/// Routing policies and the per-proxy load view they consult.
pub mod load_balancer {
    pub mod balancer;
    pub mod outstanding;
    pub mod policy;
    pub mod selector;
}

/// Tick orchestration.
pub mod sim {
    pub mod driver;
}

pub use config::{ArrivalPattern, SimulationConfig};
pub use error::SimError;
pub use load_balancer::policy::PolicyKind;
pub use sim::driver::{Simulation, SimulationReport, TickReport};

/// The random source threaded through every stochastic decision.
pub type SimRng = rand_chacha::ChaCha8Rng;
