//! Traversal lifecycle states
//!
//! A traversal moves `Idle → Active → Done` exactly once. `Done` carries the
//! reason the walk stopped.
use std::fmt;

/// Why a traversal stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoneReason {
    /// The cursor pointed at a URL that was already visited
    AlreadyVisited,

    /// The non-zero page cap was reached
    PageCapReached,

    /// Neither pagination nor the link fallback produced a new URL
    Exhausted,

    /// An interrupt was observed at a step boundary
    Interrupted,
}

impl DoneReason {
    /// Short machine-friendly name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyVisited => "already_visited",
            Self::PageCapReached => "page_cap_reached",
            Self::Exhausted => "exhausted",
            Self::Interrupted => "interrupted",
        }
    }

    /// Returns true if the site was walked to its natural end
    pub fn is_natural_end(&self) -> bool {
        matches!(self, Self::AlreadyVisited | Self::Exhausted)
    }
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AlreadyVisited => "next page was already visited",
            Self::PageCapReached => "page limit reached",
            Self::Exhausted => "no further pages found",
            Self::Interrupted => "interrupted",
        };
        write!(f, "{}", text)
    }
}

/// Lifecycle of a single traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraversalState {
    /// Constructed, no page loaded yet
    #[default]
    Idle,

    /// Stepping through pages
    Active,

    /// Finished; no further steps will run
    Done(DoneReason),
}

impl TraversalState {
    /// Returns true once the traversal has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// The stop reason, if finished
    pub fn done_reason(&self) -> Option<DoneReason> {
        match self {
            Self::Done(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Moves `Idle` to `Active`; any other state is left as is
    pub fn start(self) -> Self {
        match self {
            Self::Idle => Self::Active,
            other => other,
        }
    }

    /// Moves to `Done(reason)` unless already done
    ///
    /// The first recorded reason wins.
    pub fn finish(self, reason: DoneReason) -> Self {
        match self {
            Self::Done(existing) => Self::Done(existing),
            _ => Self::Done(reason),
        }
    }
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::Done(reason) => write!(f, "done ({})", reason),
        }
    }
}
