//! Routing policy variants.
//!
//! The set of policies is closed, so they are modelled as an enum resolved
//! once from the configured name rather than as trait objects.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::domain::upstream::ServerId;
use crate::error::SimError;
use crate::load_balancer::outstanding::OutstandingRequests;
use crate::load_balancer::selector;

/// Names of the supported routing policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Cycle through the servers.
    RoundRobin,
    /// Pick a server uniformly at random.
    RandomSelect,
    /// Power of two choices over the proxy's own outstanding requests.
    LeastRequest,
}

impl PolicyKind {
    /// Every policy, in a stable order.
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::RoundRobin,
        PolicyKind::RandomSelect,
        PolicyKind::LeastRequest,
    ];

    /// The configuration name of this policy.
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::RoundRobin => "Round Robin",
            PolicyKind::RandomSelect => "Random Select",
            PolicyKind::LeastRequest => "Least Request",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SimError::UnknownPolicy(s.to_string()))
    }
}

/// A routing policy instance, owning whatever state its variant needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingPolicy {
    /// Round robin with its cursor.
    RoundRobin {
        /// Last index handed out, starting at 0.
        cursor: usize,
    },
    /// Uniform random selection.
    RandomSelect,
    /// Least outstanding of two random draws.
    PowerOfTwoChoices,
}

impl RoutingPolicy {
    /// Fresh policy state for `kind`.
    pub fn new(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::RoundRobin => RoutingPolicy::RoundRobin { cursor: 0 },
            PolicyKind::RandomSelect => RoutingPolicy::RandomSelect,
            PolicyKind::LeastRequest => RoutingPolicy::PowerOfTwoChoices,
        }
    }

    /// The policy's configuration name.
    pub fn kind(&self) -> PolicyKind {
        match self {
            RoutingPolicy::RoundRobin { .. } => PolicyKind::RoundRobin,
            RoutingPolicy::RandomSelect => PolicyKind::RandomSelect,
            RoutingPolicy::PowerOfTwoChoices => PolicyKind::LeastRequest,
        }
    }

    /// Select a server index in `[0, candidates)`.
    ///
    /// Only [`RoutingPolicy::PowerOfTwoChoices`] reads `load`.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        candidates: usize,
        load: &OutstandingRequests,
        rng: &mut R,
    ) -> ServerId {
        match self {
            RoutingPolicy::RoundRobin { cursor } => selector::next_round_robin(cursor, candidates),
            RoutingPolicy::RandomSelect => selector::pick_uniform(rng, candidates),
            RoutingPolicy::PowerOfTwoChoices => selector::least_of_two(rng, candidates, load),
        }
    }
}
