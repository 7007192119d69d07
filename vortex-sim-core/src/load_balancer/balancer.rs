//! A routing policy bundled with the owning proxy's load view.

use rand::Rng;
use tracing::trace;

use crate::domain::upstream::ServerId;
use crate::load_balancer::outstanding::OutstandingRequests;
use crate::load_balancer::policy::{PolicyKind, RoutingPolicy};

/// Routing state private to one proxy.
#[derive(Debug, Clone)]
pub struct LoadBalancer {
    policy: RoutingPolicy,
    outstanding: OutstandingRequests,
}

impl LoadBalancer {
    /// Fresh balancer for a backend of `server_count` servers.
    pub fn new(kind: PolicyKind, server_count: usize) -> Self {
        Self {
            policy: RoutingPolicy::new(kind),
            outstanding: OutstandingRequests::new(server_count),
        }
    }

    /// Choose an upstream server among `candidates`.
    pub fn select<R: Rng + ?Sized>(&mut self, candidates: usize, rng: &mut R) -> ServerId {
        let server = self.policy.select(candidates, &self.outstanding, rng);
        trace!(
            policy = %self.policy.kind(),
            server = server.0,
            outstanding = self.outstanding.get(server),
            "selected upstream server"
        );
        server
    }

    /// Update the load view after a request was sent to `server`.
    pub fn on_send_request(&mut self, server: ServerId) {
        self.outstanding.increment(server);
    }

    /// Update the load view after a response came back from `server`.
    pub fn on_receive_response(&mut self, server: ServerId) {
        self.outstanding.decrement(server);
    }

    /// The policy in use.
    pub fn kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    /// This proxy's outstanding request counters.
    pub fn outstanding(&self) -> &OutstandingRequests {
        &self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::SimRng;

    #[test]
    fn test_hooks_feed_least_request() {
        let mut balancer = LoadBalancer::new(PolicyKind::LeastRequest, 2);
        let mut rng = SimRng::seed_from_u64(3);

        balancer.on_send_request(ServerId(1));
        assert_eq!(balancer.select(2, &mut rng), ServerId(0));

        balancer.on_send_request(ServerId(0));
        balancer.on_send_request(ServerId(0));
        balancer.on_receive_response(ServerId(1));
        assert_eq!(balancer.select(2, &mut rng), ServerId(1));
        assert_eq!(balancer.outstanding().as_slice(), &[2, 0]);
    }
}
