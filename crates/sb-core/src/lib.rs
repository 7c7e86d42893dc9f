//! Core domain logic for stackblame.
//!
//! This crate contains the fundamental types and logic for:
//! - Status vocabulary: classifying upstream status codes
//! - Event filtering: isolating top-level stack transitions
//! - Action pairing: reconstructing attributable operations from
//!   trigger/terminal event pairs
//! - Reporting: ordering and aggregating actions by transition pattern

pub mod action;
pub mod event;
pub mod report;
pub mod status;
mod types;

pub use action::{Action, Discard, DiscardReason, Pairing, pair_actions};
pub use event::{StackEvent, filter_stack_transitions, normalize_events};
pub use report::{
    TransitionSummary, format_duration, merge_summaries, retain_recent, signature, sort_actions,
    summarize,
};
pub use status::{StatusClass, classify};
pub use types::{StackId, ValidationError};
