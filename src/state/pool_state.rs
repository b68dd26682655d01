//! Worker pool lifecycle states
//!
//! A pool moves through these states exactly once per crawl.

use std::fmt;

/// Represents the lifecycle stage of a worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// Pool has been constructed but not started
    Idle,

    /// Workers are taking URLs from the frontier
    Running,

    /// All work finished; the frontier is being closed and workers joined
    Draining,

    /// Cancellation observed; workers are finishing in-flight URLs
    Cancelling,

    /// Terminal state, every worker has exited
    Stopped,
}

impl PoolState {
    /// Returns true if `next` is a legal successor of this state
    ///
    /// `Idle -> Stopped` covers a crawl that fails during startup.
    pub fn can_transition_to(&self, next: PoolState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Stopped)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Cancelling)
                | (Self::Draining, Self::Stopped)
                | (Self::Cancelling, Self::Stopped)
        )
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Cancelling => "cancelling",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
