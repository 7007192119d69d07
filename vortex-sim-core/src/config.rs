//! Configuration types for a simulation run.

use crate::error::{Result, SimError};
use crate::load_balancer::policy::PolicyKind;

/// Ticks needed to serve one request.
pub const DEFAULT_SERVICE_TIME: u32 = 100;

/// Requests an upstream server works on at the same time.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 12345;

/// How new requests enter the cluster during each arrival phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrivalPattern {
    /// Every proxy independently draws from `[0, proxy_count)` and sends one
    /// request when the draw is zero. About one request per tick cluster-wide.
    #[default]
    Bernoulli,

    /// Every proxy sends exactly `per_proxy` requests during each of the first
    /// `ticks` arrival phases, then nothing.
    Fixed {
        /// Requests issued by each proxy per arrival phase.
        per_proxy: u32,
        /// Number of arrival phases that issue requests.
        ticks: u64,
    },
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of proxy nodes in the frontend.
    pub proxy_count: usize,

    /// Number of upstream servers in the backend.
    pub backend_server_count: usize,

    /// Routing policy name, e.g. `"Least Request"`.
    pub policy_name: String,

    /// Per-server concurrency capacity.
    pub concurrency: usize,

    /// Fixed service time of every request, in ticks.
    pub service_time: u32,

    /// Seed for the simulation-local random source.
    pub seed: u64,

    /// Arrival law applied by the frontend.
    pub arrivals: ArrivalPattern,
}

impl SimulationConfig {
    /// Create a configuration with default capacity, service time and seed.
    pub fn new(
        proxy_count: usize,
        backend_server_count: usize,
        policy_name: impl Into<String>,
    ) -> Self {
        Self {
            proxy_count,
            backend_server_count,
            policy_name: policy_name.into(),
            concurrency: DEFAULT_CONCURRENCY,
            service_time: DEFAULT_SERVICE_TIME,
            seed: DEFAULT_SEED,
            arrivals: ArrivalPattern::default(),
        }
    }

    /// Set the per-server concurrency capacity.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the fixed service time.
    pub fn with_service_time(mut self, service_time: u32) -> Self {
        self.service_time = service_time;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the arrival pattern.
    pub fn with_arrivals(mut self, arrivals: ArrivalPattern) -> Self {
        self.arrivals = arrivals;
        self
    }

    /// Check the configuration and resolve the policy name.
    pub fn validate(&self) -> Result<PolicyKind> {
        let policy: PolicyKind = self.policy_name.parse()?;

        if self.proxy_count == 0 {
            return Err(SimError::NoProxies);
        }
        if self.backend_server_count == 0 {
            return Err(SimError::NoServers);
        }
        if self.concurrency == 0 {
            return Err(SimError::NoConcurrency);
        }
        if self.service_time == 0 {
            return Err(SimError::NoServiceTime);
        }
        if policy == PolicyKind::LeastRequest && self.backend_server_count < 2 {
            return Err(SimError::TooFewServersForLeastRequest(
                self.backend_server_count,
            ));
        }

        Ok(policy)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(10, 20, PolicyKind::LeastRequest.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::new(3, 4, "Round Robin");
        assert_eq!(config.concurrency, 6);
        assert_eq!(config.service_time, 100);
        assert_eq!(config.arrivals, ArrivalPattern::Bernoulli);
        assert_eq!(config.validate(), Ok(PolicyKind::RoundRobin));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let config = SimulationConfig::new(1, 1, "Least Connections");
        assert_eq!(
            config.validate(),
            Err(SimError::UnknownPolicy("Least Connections".to_string()))
        );
    }

    #[test]
    fn test_counts_must_be_positive() {
        assert_eq!(
            SimulationConfig::new(0, 1, "Random Select").validate(),
            Err(SimError::NoProxies)
        );
        assert_eq!(
            SimulationConfig::new(1, 0, "Random Select").validate(),
            Err(SimError::NoServers)
        );
        assert_eq!(
            SimulationConfig::new(1, 1, "Random Select")
                .with_concurrency(0)
                .validate(),
            Err(SimError::NoConcurrency)
        );
        assert_eq!(
            SimulationConfig::new(1, 1, "Random Select")
                .with_service_time(0)
                .validate(),
            Err(SimError::NoServiceTime)
        );
    }

    #[test]
    fn test_least_request_needs_two_servers() {
        assert_eq!(
            SimulationConfig::new(1, 1, "Least Request").validate(),
            Err(SimError::TooFewServersForLeastRequest(1))
        );
        assert!(SimulationConfig::new(1, 2, "Least Request").validate().is_ok());
    }
}
