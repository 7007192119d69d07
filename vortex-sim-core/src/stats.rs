//! Latency and imbalance statistics.

/// Running latency totals for completed requests.
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    request_count: u64,
    total_latency: u64,
    latencies: Vec<u64>,
}

impl LatencyStats {
    /// Empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed request in.
    pub fn record(&mut self, latency: u64) {
        self.request_count += 1;
        self.total_latency += latency;
        self.latencies.push(latency);
    }

    /// Completed requests so far.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Sum of all recorded latencies.
    pub fn total_latency(&self) -> u64 {
        self.total_latency
    }

    /// Mean latency, truncated. `None` until a request has completed.
    pub fn mean_latency(&self) -> Option<u64> {
        self.total_latency.checked_div(self.request_count)
    }

    /// Approximate high-percentile latency.
    ///
    /// Sorts the recorded latencies and reads index
    /// `len - request_count / 1000`, clamped into the valid range. Below 1000
    /// samples that is the maximum; above it, roughly the 99.9th percentile.
    /// `None` until a request has completed.
    pub fn tail_latency(&mut self) -> Option<u64> {
        if self.latencies.is_empty() {
            return None;
        }
        self.latencies.sort_unstable();

        let len = self.latencies.len();
        let offset = usize::try_from(self.request_count / 1000).unwrap_or(len);
        let index = len.saturating_sub(offset).min(len - 1);
        Some(self.latencies[index])
    }
}

/// Per-tick imbalance summary.
#[derive(Debug, Clone, Default)]
pub struct ImbalanceStats {
    ticks: u64,
    total: u64,
    peak: u64,
}

impl ImbalanceStats {
    /// Empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick's imbalance in.
    pub fn record(&mut self, imbalance: u64) {
        self.ticks += 1;
        self.total += imbalance;
        self.peak = self.peak.max(imbalance);
    }

    /// Largest imbalance seen.
    pub fn peak(&self) -> u64 {
        self.peak
    }

    /// Mean imbalance per tick. `None` before the first tick.
    pub fn mean(&self) -> Option<f64> {
        (self.ticks > 0).then(|| self.total as f64 / self.ticks as f64)
    }
}
