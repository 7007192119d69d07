//! Error types for building a simulation.

use thiserror::Error;

/// Configuration errors. Any of these stops a run before its first tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The policy name matched none of the known routing policies.
    #[error(
        "unknown routing policy {0:?} (expected \"Round Robin\", \"Random Select\" or \"Least Request\")"
    )]
    UnknownPolicy(String),

    /// The frontend needs at least one proxy.
    #[error("proxy count must be greater than zero")]
    NoProxies,

    /// The backend needs at least one upstream server.
    #[error("backend server count must be greater than zero")]
    NoServers,

    /// A server with zero capacity would never make progress.
    #[error("server concurrency must be greater than zero")]
    NoConcurrency,

    /// Requests must take at least one tick to serve.
    #[error("service time must be at least one tick")]
    NoServiceTime,

    /// Least Request draws two distinct servers per decision.
    #[error("\"Least Request\" needs at least two backend servers, got {0}")]
    TooFewServersForLeastRequest(usize),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, SimError>;
