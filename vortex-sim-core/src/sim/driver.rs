//! Tick-driven simulation runner.
//!
//! One tick runs, in order:
//!
//! 1. every upstream server advances and returns its completions,
//! 2. completions are delivered to their proxies and folded into statistics,
//!    and the backend imbalance is sampled,
//! 3. the completion batch is dropped,
//! 4. the frontend generates new arrivals.
//!
//! Requests created in step 4 first age and make progress on the next tick.

use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::domain::backend::Backend;
use crate::domain::frontend::Frontend;
use crate::error::Result;
use crate::load_balancer::policy::PolicyKind;
use crate::stats::{ImbalanceStats, LatencyStats};
use crate::SimRng;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: u64,
    /// Requests that completed this tick.
    pub completed: usize,
    /// Busiest minus idlest server queue length, before arrivals.
    pub imbalance: u64,
    /// Requests generated at the end of this tick.
    pub arrivals: usize,
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Policy that was simulated.
    pub policy: PolicyKind,
    /// Ticks executed.
    pub ticks: u64,
    /// Completed requests.
    pub requests: u64,
    /// Truncated mean latency, `None` without data.
    pub mean_latency: Option<u64>,
    /// Approximate tail latency, `None` without data.
    pub tail_latency: Option<u64>,
    /// Largest per-tick imbalance.
    pub peak_imbalance: u64,
    /// Mean per-tick imbalance, `None` before the first tick.
    pub mean_imbalance: Option<f64>,
}

/// A single, fully isolated simulation run.
///
/// Owns the backend, the frontend, the random source and all statistics, so
/// independent runs never share state.
#[derive(Debug, Clone)]
pub struct Simulation {
    policy: PolicyKind,
    backend: Backend,
    frontend: Frontend,
    rng: SimRng,
    latency: LatencyStats,
    imbalance: ImbalanceStats,
    ticks: u64,
}

impl Simulation {
    /// Build a simulation. Configuration errors surface here, before any tick.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let policy = config.validate()?;

        info!(
            policy = %policy,
            proxies = config.proxy_count,
            servers = config.backend_server_count,
            concurrency = config.concurrency,
            service_time = config.service_time,
            seed = config.seed,
            arrivals = ?config.arrivals,
            "Creating simulation"
        );

        Ok(Self {
            policy,
            backend: Backend::new(
                config.backend_server_count,
                config.concurrency,
                config.service_time,
            ),
            frontend: Frontend::new(
                config.proxy_count,
                policy,
                config.backend_server_count,
                config.arrivals,
            ),
            rng: SimRng::seed_from_u64(config.seed),
            latency: LatencyStats::new(),
            imbalance: ImbalanceStats::new(),
            ticks: 0,
        })
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;

        let completions = self.backend.tick();
        for completion in &completions {
            self.frontend.deliver(completion);
            self.latency.record(completion.latency);
        }
        let imbalance = self.backend.imbalance() as u64;
        self.imbalance.record(imbalance);
        let completed = completions.len();
        drop(completions);

        let arrivals = self.frontend.generate_arrivals(&mut self.backend, &mut self.rng);

        debug!(tick = self.ticks, completed, imbalance, arrivals, "tick");

        TickReport {
            tick: self.ticks,
            completed,
            imbalance,
            arrivals,
        }
    }

    /// Run `ticks` ticks and return their reports.
    pub fn run(&mut self, ticks: u64) -> Vec<TickReport> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Summarise the run so far.
    pub fn report(&mut self) -> SimulationReport {
        SimulationReport {
            policy: self.policy,
            ticks: self.ticks,
            requests: self.latency.request_count(),
            mean_latency: self.latency.mean_latency(),
            tail_latency: self.latency.tail_latency(),
            peak_imbalance: self.imbalance.peak(),
            mean_imbalance: self.imbalance.mean(),
        }
    }

    /// Truncated mean latency, `None` until a request completes.
    pub fn mean_latency(&self) -> Option<u64> {
        self.latency.mean_latency()
    }

    /// Approximate tail latency, `None` until a request completes.
    pub fn tail_latency(&mut self) -> Option<u64> {
        self.latency.tail_latency()
    }

    /// The simulated policy.
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Ticks executed so far.
    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks
    }

    /// The upstream cluster.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// The proxy fleet.
    pub fn frontend(&self) -> &Frontend {
        &self.frontend
    }

    /// Latency statistics collected so far.
    pub fn latency_stats(&self) -> &LatencyStats {
        &self.latency
    }
}
