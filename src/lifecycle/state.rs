//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Idle → Starting → Serving → Draining → Stopped
//!            │                    │
//!            ▼                    ▼
//!       FailedStart           ForcedStop
//! ```
//!
//! # Design Decisions
//! - Connections are accepted only while `Serving`
//! - The listener is closed before `Draining` is published
//! - Every transition is logged; illegal ones are rejected

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle phase of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    Serving,
    Draining,
    Stopped,
    FailedStart,
    ForcedStop,
}

impl Phase {
    /// Check if a transition to `next` is legal.
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Starting)
                | (Phase::Starting, Phase::Serving)
                | (Phase::Starting, Phase::FailedStart)
                | (Phase::Serving, Phase::Draining)
                | (Phase::Draining, Phase::Stopped)
                | (Phase::Draining, Phase::ForcedStop)
        )
    }

    /// Whether new connections are accepted in this phase.
    pub fn accepts_connections(self) -> bool {
        self == Phase::Serving
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Stopped | Phase::FailedStart | Phase::ForcedStop)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Starting => "starting",
            Phase::Serving => "serving",
            Phase::Draining => "draining",
            Phase::Stopped => "stopped",
            Phase::FailedStart => "failed_start",
            Phase::ForcedStop => "forced_stop",
        };
        f.write_str(name)
    }
}

/// Shared, observable lifecycle phase.
///
/// Cloned into the serving task so the accept loop can publish `Draining`
/// at the exact point the listener is closed.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    tx: Arc<watch::Sender<Phase>>,
}

impl PhaseTracker {
    /// Create a tracker starting at `Idle`.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Phase::Idle);
        Self { tx: Arc::new(tx) }
    }

    /// Get the current phase.
    pub fn current(&self) -> Phase {
        *self.tx.borrow()
    }

    /// Move to `next` if the transition is legal. Returns whether it moved.
    pub fn advance(&self, next: Phase) -> bool {
        let mut from = None;
        self.tx.send_if_modified(|phase| {
            if phase.can_transition_to(next) {
                from = Some(*phase);
                *phase = next;
                true
            } else {
                false
            }
        });

        match from {
            Some(from) => {
                tracing::debug!(from = %from, to = %next, "Lifecycle transition");
                true
            }
            None => {
                tracing::warn!(
                    current = %self.current(),
                    requested = %next,
                    "Rejected illegal lifecycle transition"
                );
                false
            }
        }
    }

    /// Watch phase changes.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.tx.subscribe()
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 7] = [
        Phase::Idle,
        Phase::Starting,
        Phase::Serving,
        Phase::Draining,
        Phase::Stopped,
        Phase::FailedStart,
        Phase::ForcedStop,
    ];

    #[test]
    fn transition_table() {
        let legal = [
            (Phase::Idle, Phase::Starting),
            (Phase::Starting, Phase::Serving),
            (Phase::Starting, Phase::FailedStart),
            (Phase::Serving, Phase::Draining),
            (Phase::Draining, Phase::Stopped),
            (Phase::Draining, Phase::ForcedStop),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn only_serving_accepts() {
        for phase in ALL {
            assert_eq!(phase.accepts_connections(), phase == Phase::Serving);
        }
    }

    #[test]
    fn terminal_phases_have_no_exit() {
        for from in ALL.into_iter().filter(|p| p.is_terminal()) {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn tracker_follows_happy_path() {
        let tracker = PhaseTracker::new();
        let rx = tracker.subscribe();
        assert_eq!(tracker.current(), Phase::Idle);

        assert!(tracker.advance(Phase::Starting));
        assert!(tracker.advance(Phase::Serving));
        assert!(tracker.advance(Phase::Draining));
        assert!(tracker.advance(Phase::Stopped));
        assert_eq!(*rx.borrow(), Phase::Stopped);
    }

    #[test]
    fn tracker_rejects_skips() {
        let tracker = PhaseTracker::new();
        assert!(!tracker.advance(Phase::Serving));
        assert_eq!(tracker.current(), Phase::Idle);

        tracker.advance(Phase::Starting);
        tracker.advance(Phase::FailedStart);
        assert!(!tracker.advance(Phase::Serving));
        assert_eq!(tracker.current(), Phase::FailedStart);
    }
}
