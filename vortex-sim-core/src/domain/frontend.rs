//! Frontend proxy fleet and request arrivals.

use rand::Rng;

use crate::config::ArrivalPattern;
use crate::domain::backend::Backend;
use crate::domain::proxy::{ProxyId, ProxyNode};
use crate::domain::upstream::Completion;
use crate::load_balancer::policy::PolicyKind;

/// The fixed set of proxies that receive client traffic.
#[derive(Debug, Clone)]
pub struct Frontend {
    proxies: Vec<ProxyNode>,
    arrivals: ArrivalPattern,
    phases: u64,
}

impl Frontend {
    /// Create `proxy_count` proxies, each with its own `policy` instance.
    pub fn new(
        proxy_count: usize,
        policy: PolicyKind,
        server_count: usize,
        arrivals: ArrivalPattern,
    ) -> Self {
        let proxies = (0..proxy_count)
            .map(|idx| ProxyNode::new(ProxyId(idx), policy, server_count))
            .collect();
        Self {
            proxies,
            arrivals,
            phases: 0,
        }
    }

    /// Run one arrival phase and return the number of requests sent.
    pub fn generate_arrivals<R: Rng + ?Sized>(
        &mut self,
        backend: &mut Backend,
        rng: &mut R,
    ) -> usize {
        let phase = self.phases;
        self.phases += 1;

        let proxy_count = self.proxies.len();
        let mut sent = 0;
        match self.arrivals {
            ArrivalPattern::Bernoulli => {
                for proxy in &mut self.proxies {
                    if rng.gen_range(0..proxy_count) == 0 {
                        proxy.send_request(backend, rng);
                        sent += 1;
                    }
                }
            }
            ArrivalPattern::Fixed { per_proxy, ticks } => {
                if phase < ticks {
                    for proxy in &mut self.proxies {
                        for _ in 0..per_proxy {
                            proxy.send_request(backend, rng);
                            sent += 1;
                        }
                    }
                }
            }
        }
        sent
    }

    /// Hand a completion back to the proxy that sent the request.
    ///
    /// # Panics
    ///
    /// Panics if the completion names a proxy outside this frontend.
    pub fn deliver(&mut self, completion: &Completion) {
        self.proxies[completion.origin.0].receive_response(completion.server);
    }

    /// All proxies, in id order.
    pub fn proxies(&self) -> &[ProxyNode] {
        &self.proxies
    }

    /// Outstanding requests summed over every proxy's local view.
    pub fn total_outstanding(&self) -> u64 {
        self.proxies.iter().map(|p| p.outstanding().total()).sum()
    }
}
