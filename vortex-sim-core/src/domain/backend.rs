//! Backend cluster models.

use crate::domain::proxy::ProxyId;
use crate::domain::upstream::{Completion, ServerId, UpstreamServer};

/// The fixed set of upstream servers that actually serve requests.
///
/// Servers are created once and indexed `0..server_count()`; the set is
/// never resized.
#[derive(Debug, Clone)]
pub struct Backend {
    servers: Vec<UpstreamServer>,
}

impl Backend {
    /// Create `server_count` idle servers sharing one capacity and service time.
    pub fn new(server_count: usize, concurrency: usize, service_time: u32) -> Self {
        let servers = (0..server_count)
            .map(|idx| UpstreamServer::new(ServerId(idx), concurrency, service_time))
            .collect();
        Self { servers }
    }

    /// Total number of upstream servers.
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Route a request from `origin` to the given server.
    ///
    /// # Panics
    ///
    /// Panics if `server` is not an index of this backend.
    pub fn enqueue(&mut self, server: ServerId, origin: ProxyId) {
        self.servers[server.0].enqueue(origin);
    }

    /// Advance every server one tick and collect this tick's completions.
    ///
    /// Completions from one server stay in FIFO order.
    pub fn tick(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        for server in &mut self.servers {
            completions.extend(server.tick());
        }
        completions
    }

    /// Queue length of every server, in index order.
    pub fn active_request_snapshot(&self) -> Vec<usize> {
        self.servers.iter().map(UpstreamServer::active_requests).collect()
    }

    /// Difference between the busiest and the idlest server's queue length.
    pub fn imbalance(&self) -> usize {
        let snapshot = self.active_request_snapshot();
        let max = snapshot.iter().copied().max().unwrap_or(0);
        let min = snapshot.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Requests queued across the whole backend.
    pub fn total_active_requests(&self) -> usize {
        self.servers.iter().map(UpstreamServer::active_requests).sum()
    }
}
