//! Raw lifecycle events and the normalize/filter steps before pairing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status;
use crate::types::StackId;

/// A raw state-transition event emitted by the provisioning service.
///
/// Events are read-only once fetched; the status stays a string so codes
/// this vocabulary does not recognize survive deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEvent {
    /// The stack this event belongs to.
    pub stack_id: StackId,
    /// Logical identifier of the resource the event describes. Equal to the
    /// stack's own name for top-level stack transitions.
    pub logical_id: String,
    /// Literal status code from the upstream system.
    pub status: String,
    /// When the transition was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Sorts events ascending by timestamp.
///
/// The event source returns pages in reverse-chronological order; every
/// downstream step assumes ascending time.
pub fn normalize_events(events: &mut [StackEvent]) {
    events.sort_by_key(|e| e.timestamp);
}

/// Keeps only top-level state transitions of the stack itself.
///
/// Nested resource events (logical id differs from the stack name) and
/// transient bookkeeping statuses would break the adjacent-pair assumption
/// in the pairer. The result is re-sorted ascending; the filter does not
/// assume its input order survived.
#[must_use]
pub fn filter_stack_transitions(events: Vec<StackEvent>, stack_name: &str) -> Vec<StackEvent> {
    let mut filtered: Vec<StackEvent> = events
        .into_iter()
        .filter(|e| e.logical_id == stack_name && !status::is_transient(&e.status))
        .collect();
    normalize_events(&mut filtered);
    filtered
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn event(logical_id: &str, status: &str, offset_minutes: i64) -> StackEvent {
        let t0 = DateTime::parse_from_rfc3339("2026-08-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        StackEvent {
            stack_id: StackId::new("stack/web/abc123").unwrap(),
            logical_id: logical_id.to_string(),
            status: status.to_string(),
            timestamp: t0 + TimeDelta::minutes(offset_minutes),
        }
    }

    #[test]
    fn normalize_sorts_ascending_by_timestamp() {
        let mut events = vec![
            event("web", "CREATE_COMPLETE", 5),
            event("web", "CREATE_IN_PROGRESS", 0),
            event("web", "UPDATE_IN_PROGRESS", 3),
        ];
        normalize_events(&mut events);
        let statuses: Vec<&str> = events.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(
            statuses,
            ["CREATE_IN_PROGRESS", "UPDATE_IN_PROGRESS", "CREATE_COMPLETE"]
        );
    }

    #[test]
    fn filter_drops_nested_resource_events() {
        let events = vec![
            event("web", "CREATE_IN_PROGRESS", 0),
            event("WebServerInstance", "CREATE_IN_PROGRESS", 1),
            event("WebServerInstance", "CREATE_COMPLETE", 2),
            event("web", "CREATE_COMPLETE", 3),
        ];
        let filtered = filter_stack_transitions(events, "web");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.logical_id == "web"));
    }

    #[test]
    fn filter_drops_transient_statuses() {
        let events = vec![
            event("web", "REVIEW_IN_PROGRESS", 0),
            event("web", "CREATE_IN_PROGRESS", 1),
            event("web", "CREATE_COMPLETE", 2),
            event("web", "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS", 3),
            event("web", "ROLLBACK_IN_PROGRESS", 4),
            event("web", "UPDATE_ROLLBACK_IN_PROGRESS", 5),
            event("web", "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS", 6),
        ];
        let filtered = filter_stack_transitions(events, "web");
        let statuses: Vec<&str> = filtered.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(statuses, ["CREATE_IN_PROGRESS", "CREATE_COMPLETE"]);
    }

    #[test]
    fn filter_resorts_out_of_order_input() {
        let events = vec![
            event("web", "CREATE_COMPLETE", 5),
            event("db", "CREATE_COMPLETE", 1),
            event("web", "CREATE_IN_PROGRESS", 0),
        ];
        let filtered = filter_stack_transitions(events, "web");
        assert_eq!(filtered[0].status, "CREATE_IN_PROGRESS");
        assert_eq!(filtered[1].status, "CREATE_COMPLETE");
    }

    #[test]
    fn filter_of_empty_input_is_empty() {
        let filtered = filter_stack_transitions(Vec::new(), "web");
        assert!(filtered.is_empty());
    }

    #[test]
    fn event_serde_roundtrip() {
        let e = event("web", "CREATE_IN_PROGRESS", 0);
        let json = serde_json::to_string(&e).unwrap();
        let parsed: StackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, e);
    }
}
