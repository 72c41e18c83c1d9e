//! Engine lifecycle states
use std::fmt;

/// Represents the lifecycle state of a crawl engine
///
/// `Idle -> Running -> {Completed, Cancelled, TimedOut}`. An engine runs at
/// most once; the three terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    /// Engine has been built and seeded but not started
    #[default]
    Idle,

    /// The dispatch loop is running
    Running,

    // ===== Terminal States =====
    /// Frontier drained with no workers in flight
    Completed,

    /// `stop` was requested
    Cancelled,

    /// The global timeout elapsed
    TimedOut,
}

impl EngineState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::TimedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
