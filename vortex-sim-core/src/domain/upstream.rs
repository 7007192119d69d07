//! Upstream server queueing model.
//!
//! Each server keeps a FIFO queue of in-flight requests. Only the first
//! `concurrency` entries make service progress on a tick; everything behind
//! them sits in the waiting room and only accrues latency.

use std::collections::VecDeque;

use crate::domain::proxy::ProxyId;

/// Index of an upstream server within the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerId(pub usize);

/// A finished request, handed from the backend to the driver for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Proxy that sent the request.
    pub origin: ProxyId,
    /// Server that served it.
    pub server: ServerId,
    /// Ticks between enqueue and completion, waiting time included.
    pub latency: u64,
}

#[derive(Debug, Clone)]
struct InFlightRequest {
    origin: ProxyId,
    remaining: u32,
    latency: u64,
}

/// A single upstream server with a positional concurrency window.
#[derive(Debug, Clone)]
pub struct UpstreamServer {
    id: ServerId,
    concurrency: usize,
    service_time: u32,
    queue: VecDeque<InFlightRequest>,
}

impl UpstreamServer {
    /// Create an idle server.
    pub fn new(id: ServerId, concurrency: usize, service_time: u32) -> Self {
        Self {
            id,
            concurrency,
            service_time,
            queue: VecDeque::new(),
        }
    }

    /// The server's index in the backend.
    pub fn id(&self) -> ServerId {
        self.id
    }

    /// Queue a new request. The queue is unbounded; only processing is limited.
    pub fn enqueue(&mut self, origin: ProxyId) {
        self.queue.push_back(InFlightRequest {
            origin,
            remaining: self.service_time,
            latency: 0,
        });
    }

    /// Advance one tick and drain every request that finished.
    ///
    /// All queued requests age by one tick, the first `concurrency` of them
    /// lose one tick of remaining service, then finished requests are popped
    /// from the front in FIFO order.
    pub fn tick(&mut self) -> Vec<Completion> {
        let window = self.concurrency;
        for (position, request) in self.queue.iter_mut().enumerate() {
            request.latency += 1;
            if position < window {
                request.remaining -= 1;
            }
        }

        let mut completions = Vec::new();
        while matches!(self.queue.front(), Some(front) if front.remaining == 0) {
            let Some(done) = self.queue.pop_front() else {
                break;
            };
            completions.push(Completion {
                origin: done.origin,
                server: self.id,
                latency: done.latency,
            });
        }
        completions
    }

    /// Requests currently queued, in service or waiting.
    pub fn active_requests(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_until_done(server: &mut UpstreamServer, max_ticks: u64) -> Vec<(u64, Completion)> {
        let mut done = Vec::new();
        for tick in 1..=max_ticks {
            done.extend(server.tick().into_iter().map(|c| (tick, c)));
        }
        done
    }

    #[test]
    fn test_window_holds_back_third_request() {
        // The third request waits outside the window until both earlier
        // requests drain at tick 3, then serves its full three ticks.
        let mut server = UpstreamServer::new(ServerId(0), 2, 3);
        for _ in 0..3 {
            server.enqueue(ProxyId(0));
        }

        let done = tick_until_done(&mut server, 10);
        let summary: Vec<(u64, u64)> = done.iter().map(|(t, c)| (*t, c.latency)).collect();
        assert_eq!(summary, vec![(3, 3), (3, 3), (6, 6)]);
        assert_eq!(server.active_requests(), 0);
    }

    #[test]
    fn test_completions_carry_origin_and_server() {
        let mut server = UpstreamServer::new(ServerId(7), 1, 1);
        server.enqueue(ProxyId(3));
        server.enqueue(ProxyId(5));

        assert_eq!(
            server.tick(),
            vec![Completion {
                origin: ProxyId(3),
                server: ServerId(7),
                latency: 1,
            }]
        );
        assert_eq!(
            server.tick(),
            vec![Completion {
                origin: ProxyId(5),
                server: ServerId(7),
                latency: 2,
            }]
        );
    }

    #[test]
    fn test_waiting_room_accrues_latency_only() {
        let mut server = UpstreamServer::new(ServerId(0), 1, 5);
        server.enqueue(ProxyId(0));
        server.enqueue(ProxyId(0));

        let done = tick_until_done(&mut server, 20);
        let latencies: Vec<u64> = done.iter().map(|(_, c)| c.latency).collect();
        // Second request waits five ticks behind the first, then serves five.
        assert_eq!(latencies, vec![5, 10]);
    }

    #[test]
    fn test_queue_is_unbounded() {
        let mut server = UpstreamServer::new(ServerId(0), 1, 100);
        for _ in 0..1_000 {
            server.enqueue(ProxyId(0));
        }
        assert_eq!(server.active_requests(), 1_000);
        assert!(server.tick().is_empty());
        assert_eq!(server.active_requests(), 1_000);
    }

    #[test]
    fn test_later_request_never_overtakes() {
        let mut server = UpstreamServer::new(ServerId(0), 4, 3);
        server.enqueue(ProxyId(0));
        server.tick();
        server.enqueue(ProxyId(1));

        let done = tick_until_done(&mut server, 10);
        let origins: Vec<ProxyId> = done.iter().map(|(_, c)| c.origin).collect();
        assert_eq!(origins, vec![ProxyId(0), ProxyId(1)]);
    }
}
