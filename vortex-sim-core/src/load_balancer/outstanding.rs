//! Per-proxy outstanding request counters.
//!
//! A proxy only counts the requests it sent itself. This local view is what
//! the power-of-two policy compares; no proxy ever sees global load.

use crate::domain::upstream::ServerId;

/// Outstanding requests from one proxy, indexed by server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingRequests {
    counts: Vec<u32>,
}

impl OutstandingRequests {
    /// All-zero counters for `server_count` servers.
    pub fn new(server_count: usize) -> Self {
        Self {
            counts: vec![0; server_count],
        }
    }

    /// Outstanding requests to `server`.
    pub fn get(&self, server: ServerId) -> u32 {
        self.counts[server.0]
    }

    /// Record a request sent to `server`.
    pub fn increment(&mut self, server: ServerId) {
        self.counts[server.0] += 1;
    }

    /// Record a response from `server`. Never drops below zero.
    pub fn decrement(&mut self, server: ServerId) {
        let count = &mut self.counts[server.0];
        debug_assert!(*count > 0, "response from {server:?} without a matching request");
        *count = count.saturating_sub(1);
    }

    /// Sum over all servers.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Counters in server order.
    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }
}
