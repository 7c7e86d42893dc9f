//! Action reconstruction from paired trigger/terminal events.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::event::StackEvent;
use crate::status::{self, StatusClass};
use crate::types::StackId;

/// A reconstructed, attributable operation spanning one trigger event and
/// its paired terminal event.
///
/// An action exists only for a validated adjacent pair of filtered events
/// and is immutable once built. `end >= start` holds by construction because
/// events are time-ordered before pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub stack_id: StackId,
    /// The triggering status code.
    pub situation: String,
    /// The terminal status code.
    pub outcome: String,
    /// Timestamp of the trigger event.
    pub start: DateTime<Utc>,
    /// Timestamp of the terminal event.
    pub end: DateTime<Utc>,
    /// Whether the outcome is one of the successful terminal statuses.
    pub success: bool,
}

impl Action {
    /// Elapsed time between trigger and terminal event.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Why a chunk was rejected during pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The first event of the chunk was not a recognized trigger. The
    /// history likely starts mid-stream, or the status is one this
    /// vocabulary does not recognize.
    ExpectedTrigger,
    /// The second event of the chunk was not a recognized terminal.
    ExpectedTerminal,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExpectedTrigger => "event should have been user triggered, but wasn't",
            Self::ExpectedTerminal => "event should have been terminal, but wasn't",
        };
        f.write_str(s)
    }
}

/// A rejected chunk, carried out of the pairer as data.
///
/// The pairer never logs; diagnostics flow back to the caller, which owns
/// the logging policy for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discard {
    /// The offending event, kept whole for diagnosis.
    pub event: StackEvent,
    pub reason: DiscardReason,
}

/// The outcome of pairing one stack's filtered event sequence.
#[derive(Debug, Clone, Default)]
pub struct Pairing {
    pub actions: Vec<Action>,
    pub discards: Vec<Discard>,
}

/// Pairs a filtered, time-ordered event sequence into actions.
///
/// The sequence is walked in fixed, non-overlapping chunks of two. A chunk
/// whose first event is not a trigger or whose second is not a terminal is
/// discarded whole; there is no realignment and no carry-over state between
/// chunks. A dangling final event on odd-length input is silently dropped.
#[must_use]
pub fn pair_actions(events: &[StackEvent]) -> Pairing {
    let mut pairing = Pairing::default();

    for chunk in events.chunks_exact(2) {
        let (first, second) = (&chunk[0], &chunk[1]);

        if !status::is_trigger(&first.status) {
            pairing.discards.push(Discard {
                event: first.clone(),
                reason: DiscardReason::ExpectedTrigger,
            });
            continue;
        }

        let StatusClass::Terminal { success } = status::classify(&second.status) else {
            pairing.discards.push(Discard {
                event: second.clone(),
                reason: DiscardReason::ExpectedTerminal,
            });
            continue;
        };

        pairing.actions.push(Action {
            stack_id: first.stack_id.clone(),
            situation: first.status.clone(),
            outcome: second.status.clone(),
            start: first.timestamp,
            end: second.timestamp,
            success,
        });
    }

    tracing::debug!(
        events = events.len(),
        actions = pairing.actions.len(),
        discards = pairing.discards.len(),
        "paired event sequence"
    );
    pairing
}
