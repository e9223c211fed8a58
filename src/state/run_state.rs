/// Convergence-loop counters
///
/// Owned by the listing convergence loop for the duration of one discovery
/// pass; nothing else reads or mutates it.
use std::fmt;

/// Why the convergence loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The measured count reached the requested target
    TargetReached,

    /// The count stopped growing for `stall-limit` consecutive measurements.
    /// Not an error: the feed simply holds fewer items than requested.
    Stalled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetReached => "target_reached",
            Self::Stalled => "stalled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient counters for one discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Number of measurements taken so far (1-based once the first lands)
    pub iteration: u32,

    /// Most recent measured count
    pub current: usize,

    /// Highest count seen; growth is measured against this
    pub baseline: usize,

    /// Consecutive measurements without growth
    pub stalls: u32,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one measurement and returns true if the count grew
    ///
    /// A count that shrinks (virtualized feeds may unrender items) counts as
    /// a stall and leaves the baseline untouched.
    pub fn record(&mut self, count: usize) -> bool {
        self.iteration += 1;
        self.current = count;

        if count > self.baseline {
            self.baseline = count;
            self.stalls = 0;
            true
        } else {
            self.stalls += 1;
            false
        }
    }

    /// Decides whether the loop should stop after the latest measurement
    pub fn stop_reason(&self, target: usize, stall_limit: u32) -> Option<StopReason> {
        if self.current >= target {
            Some(StopReason::TargetReached)
        } else if self.stalls >= stall_limit {
            Some(StopReason::Stalled)
        } else {
            None
        }
    }
}
