//! Proxy node models.

use rand::Rng;

use crate::domain::backend::Backend;
use crate::domain::upstream::ServerId;
use crate::load_balancer::balancer::LoadBalancer;
use crate::load_balancer::outstanding::OutstandingRequests;
use crate::load_balancer::policy::PolicyKind;

/// A unique identifier for a proxy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(pub usize);

/// A proxy with its own routing policy and private load view.
///
/// The proxy does not hold the backend. Callers lend it for the duration of
/// [`ProxyNode::send_request`]; the backend outlives every proxy and is never
/// dropped through one.
#[derive(Debug, Clone)]
pub struct ProxyNode {
    id: ProxyId,
    balancer: LoadBalancer,
}

impl ProxyNode {
    /// Create a proxy routing over `server_count` servers with `policy`.
    pub fn new(id: ProxyId, policy: PolicyKind, server_count: usize) -> Self {
        Self {
            id,
            balancer: LoadBalancer::new(policy, server_count),
        }
    }

    /// The proxy's identifier.
    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// Route one request and hand it to the backend.
    pub fn send_request<R: Rng + ?Sized>(
        &mut self,
        backend: &mut Backend,
        rng: &mut R,
    ) -> ServerId {
        let server = self.balancer.select(backend.server_count(), rng);
        self.balancer.on_send_request(server);
        backend.enqueue(server, self.id);
        server
    }

    /// Account for a response from `server`.
    pub fn receive_response(&mut self, server: ServerId) {
        self.balancer.on_receive_response(server);
    }

    /// Requests this proxy is still waiting on, per server.
    pub fn outstanding(&self) -> &OutstandingRequests {
        self.balancer.outstanding()
    }

    /// The configured routing policy.
    pub fn policy(&self) -> PolicyKind {
        self.balancer.kind()
    }
}
