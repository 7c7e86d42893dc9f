//! The upstream status vocabulary, centralized in one place.
//!
//! Status codes arrive from the event source as literal, case-sensitive
//! strings. Unknown codes must stay representable (the upstream system can
//! grow new ones), so events keep their status as a `String` and this module
//! provides the classification used by filtering and pairing.

/// Statuses that begin a user- or system-initiated transition.
pub const TRIGGER_STATUSES: &[&str] = &[
    "CREATE_IN_PROGRESS",
    "UPDATE_IN_PROGRESS",
    "DELETE_IN_PROGRESS",
];

/// Statuses that conclude a transition, successfully or not.
pub const TERMINAL_STATUSES: &[&str] = &[
    "CREATE_COMPLETE",
    "UPDATE_COMPLETE",
    "DELETE_FAILED",
    "DELETE_COMPLETE",
    "ROLLBACK_COMPLETE",
    "UPDATE_ROLLBACK_COMPLETE",
];

/// The subset of terminal statuses that count as success.
pub const SUCCESS_STATUSES: &[&str] = &["CREATE_COMPLETE", "UPDATE_COMPLETE", "DELETE_COMPLETE"];

/// Transient bookkeeping statuses that are neither trigger nor terminal.
///
/// These would corrupt the adjacent-pair assumption in the pairer and are
/// removed during filtering.
pub const TRANSIENT_STATUSES: &[&str] = &[
    "REVIEW_IN_PROGRESS",
    "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
    "ROLLBACK_IN_PROGRESS",
    "UPDATE_ROLLBACK_IN_PROGRESS",
    "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
];

/// How a status string participates in action reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Begins a transition; valid as the first event of a pair.
    Trigger,
    /// Concludes a transition; valid as the second event of a pair.
    Terminal {
        /// Whether the outcome counts as success.
        success: bool,
    },
    /// Transient bookkeeping; removed before pairing.
    Transient,
    /// Anything this vocabulary does not recognize.
    Other,
}

/// Classifies a raw status string.
#[must_use]
pub fn classify(status: &str) -> StatusClass {
    if TRIGGER_STATUSES.contains(&status) {
        StatusClass::Trigger
    } else if TERMINAL_STATUSES.contains(&status) {
        StatusClass::Terminal {
            success: SUCCESS_STATUSES.contains(&status),
        }
    } else if TRANSIENT_STATUSES.contains(&status) {
        StatusClass::Transient
    } else {
        StatusClass::Other
    }
}

/// Returns true if the status begins a transition.
#[must_use]
pub fn is_trigger(status: &str) -> bool {
    matches!(classify(status), StatusClass::Trigger)
}

/// Returns true if the status concludes a transition.
#[must_use]
pub fn is_terminal(status: &str) -> bool {
    matches!(classify(status), StatusClass::Terminal { .. })
}

/// Returns true if the status is a successful terminal.
#[must_use]
pub fn is_success(status: &str) -> bool {
    matches!(classify(status), StatusClass::Terminal { success: true })
}

/// Returns true if the status is transient bookkeeping.
#[must_use]
pub fn is_transient(status: &str) -> bool {
    matches!(classify(status), StatusClass::Transient)
}
