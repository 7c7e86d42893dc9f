//! Ordering, retention, and aggregation of reconstructed actions.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::action::Action;

/// Orders actions for display: unsuccessful before successful, longer
/// duration first within equal success.
///
/// Both passes are stable, so actions with identical success and duration
/// keep their relative input order.
pub fn sort_actions(actions: &mut [Action]) {
    actions.sort_by_key(|a| Reverse(a.duration()));
    actions.sort_by_key(|a| a.success);
}

/// Drops actions whose trigger is older than the horizon, measured from
/// `now`.
///
/// A filtering policy, not a correctness requirement; callers that want the
/// full history skip this entirely.
#[must_use]
pub fn retain_recent(actions: Vec<Action>, horizon: TimeDelta, now: DateTime<Utc>) -> Vec<Action> {
    actions
        .into_iter()
        .filter(|a| now - a.start <= horizon)
        .collect()
}

/// Aggregated durations for one `situation -> outcome` transition pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionSummary {
    /// The `"situation -> outcome"` grouping key.
    pub signature: String,
    /// Number of actions sharing the signature. Always >= 1.
    pub count: usize,
    /// Sum of durations in milliseconds.
    pub total_ms: i64,
}

impl TransitionSummary {
    /// Average duration in milliseconds (integer division; count >= 1 for
    /// any emitted group).
    #[must_use]
    pub fn avg_ms(&self) -> i64 {
        self.total_ms / i64::try_from(self.count).unwrap_or(i64::MAX)
    }
}

/// The grouping key for an action.
#[must_use]
pub fn signature(action: &Action) -> String {
    format!("{} -> {}", action.situation, action.outcome)
}

/// Groups actions by transition signature, summing durations.
///
/// Groups come back sorted by signature so output is deterministic.
#[must_use]
pub fn summarize(actions: &[Action]) -> Vec<TransitionSummary> {
    let mut groups: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for action in actions {
        let entry = groups.entry(signature(action)).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += action.duration().num_milliseconds();
    }

    groups
        .into_iter()
        .map(|(signature, (count, total_ms))| TransitionSummary {
            signature,
            count,
            total_ms,
        })
        .collect()
}

/// Merges per-signature counts and sums from two summary sets.
///
/// The merge is associative: summarizing a concatenated action set equals
/// summarizing the parts and merging.
#[must_use]
pub fn merge_summaries(
    a: Vec<TransitionSummary>,
    b: Vec<TransitionSummary>,
) -> Vec<TransitionSummary> {
    let mut groups: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for summary in a.into_iter().chain(b) {
        let entry = groups.entry(summary.signature).or_insert((0, 0));
        entry.0 += summary.count;
        entry.1 += summary.total_ms;
    }

    groups
        .into_iter()
        .map(|(signature, (count, total_ms))| TransitionSummary {
            signature,
            count,
            total_ms,
        })
        .collect()
}

/// Formats milliseconds as a compact duration string, e.g. "1h 4m 30s".
/// Negative durations are treated as "0s" (defensive).
#[must_use]
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0s".to_string();
    }
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes >= 1 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use crate::types::StackId;

    use super::*;

    fn action(situation: &str, outcome: &str, duration_minutes: i64, success: bool) -> Action {
        action_at(situation, outcome, duration_minutes, success, 0)
    }

    fn action_at(
        situation: &str,
        outcome: &str,
        duration_minutes: i64,
        success: bool,
        start_offset_minutes: i64,
    ) -> Action {
        let t0 = DateTime::parse_from_rfc3339("2026-08-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let start = t0 + TimeDelta::minutes(start_offset_minutes);
        Action {
            stack_id: StackId::new("stack/web/abc123").unwrap(),
            situation: situation.to_string(),
            outcome: outcome.to_string(),
            start,
            end: start + TimeDelta::minutes(duration_minutes),
            success,
        }
    }

    #[test]
    fn sort_puts_unsuccessful_first_then_longest() {
        let mut actions = vec![
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 10, true),
            action("UPDATE_IN_PROGRESS", "ROLLBACK_COMPLETE", 2, false),
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 3, true),
            action("UPDATE_IN_PROGRESS", "UPDATE_ROLLBACK_COMPLETE", 8, false),
        ];
        sort_actions(&mut actions);

        let view: Vec<(bool, i64)> = actions
            .iter()
            .map(|a| (a.success, a.duration().num_minutes()))
            .collect();
        assert_eq!(view, [(false, 8), (false, 2), (true, 10), (true, 3)]);
    }

    #[test]
    fn sort_preserves_input_order_on_ties() {
        let mut first = action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 5, true);
        first.stack_id = StackId::new("stack/a").unwrap();
        let mut second = action("UPDATE_IN_PROGRESS", "UPDATE_COMPLETE", 5, true);
        second.stack_id = StackId::new("stack/b").unwrap();

        let mut actions = vec![first.clone(), second.clone()];
        sort_actions(&mut actions);

        assert_eq!(actions[0], first);
        assert_eq!(actions[1], second);
    }

    #[test]
    fn summarize_groups_counts_and_sums() {
        // Two actions of 4m and 6m under one signature: count=2, total=10m, avg=5m.
        let actions = vec![
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 4, true),
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 6, true),
        ];
        let summaries = summarize(&actions);

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.signature, "CREATE_IN_PROGRESS -> CREATE_COMPLETE");
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_ms, TimeDelta::minutes(10).num_milliseconds());
        assert_eq!(summary.avg_ms(), TimeDelta::minutes(5).num_milliseconds());
    }

    #[test]
    fn summarize_orders_groups_deterministically() {
        let actions = vec![
            action("UPDATE_IN_PROGRESS", "UPDATE_COMPLETE", 1, true),
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 1, true),
            action("DELETE_IN_PROGRESS", "DELETE_COMPLETE", 1, true),
        ];
        let signatures: Vec<String> =
            summarize(&actions).into_iter().map(|s| s.signature).collect();
        assert_eq!(
            signatures,
            [
                "CREATE_IN_PROGRESS -> CREATE_COMPLETE",
                "DELETE_IN_PROGRESS -> DELETE_COMPLETE",
                "UPDATE_IN_PROGRESS -> UPDATE_COMPLETE",
            ]
        );
    }

    #[test]
    fn summarize_empty_is_empty() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn merge_equals_summarizing_concatenation() {
        let set_a = vec![
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 4, true),
            action("UPDATE_IN_PROGRESS", "ROLLBACK_COMPLETE", 7, false),
        ];
        let set_b = vec![
            action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 6, true),
            action("DELETE_IN_PROGRESS", "DELETE_COMPLETE", 2, true),
        ];

        let merged = merge_summaries(summarize(&set_a), summarize(&set_b));

        let mut combined = set_a;
        combined.extend(set_b);
        assert_eq!(merged, summarize(&combined));
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let summaries = summarize(&[action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 4, true)]);
        assert_eq!(
            merge_summaries(summaries.clone(), Vec::new()),
            summaries.clone()
        );
        assert_eq!(merge_summaries(Vec::new(), summaries.clone()), summaries);
    }

    #[test]
    fn retain_recent_drops_old_actions() {
        let now = DateTime::parse_from_rfc3339("2026-08-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + TimeDelta::days(100);
        let old = action_at("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 5, true, 0);
        let recent = action_at(
            "UPDATE_IN_PROGRESS",
            "UPDATE_COMPLETE",
            5,
            true,
            TimeDelta::days(95).num_minutes(),
        );

        let kept = retain_recent(vec![old, recent.clone()], TimeDelta::days(90), now);
        assert_eq!(kept, vec![recent]);
    }

    #[test]
    fn retain_recent_keeps_action_exactly_at_horizon() {
        let action = action("CREATE_IN_PROGRESS", "CREATE_COMPLETE", 5, true);
        let now = action.start + TimeDelta::days(90);
        let kept = retain_recent(vec![action.clone()], TimeDelta::days(90), now);
        assert_eq!(kept, vec![action]);
    }

    #[test]
    fn format_duration_renders_units() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45_000), "45s");
        assert_eq!(format_duration(TimeDelta::minutes(5).num_milliseconds()), "5m 0s");
        assert_eq!(
            format_duration(TimeDelta::minutes(64).num_milliseconds() + 30_000),
            "1h 4m 30s"
        );
        assert_eq!(format_duration(-1), "0s");
    }
}
