//! Report command: reconstruct actions across all stacks and aggregate
//! wait time by transition pattern.
//!
//! Fetching and pairing is independent per stack, so the run fans out one
//! task per stack (bounded by the configured concurrency) and hands the
//! combined action set to the single-threaded aggregation step.

use std::fmt::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;

use sb_core::{
    Action, TransitionSummary, filter_stack_transitions, format_duration, pair_actions,
    retain_recent, signature, sort_actions, summarize,
};
use sb_source::{Client, EventSource, StackSummary, fetch_stack_events};

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub stack_count: usize,
    /// All surviving actions in display order: unsuccessful first, then by
    /// duration descending.
    pub actions: Vec<Action>,
    pub successful: Vec<TransitionSummary>,
    pub unsuccessful: Vec<TransitionSummary>,
}

/// Reconstructs the actions for one stack: fetch, filter, pair.
///
/// Malformed chunks come back from the pairer as data; they are logged here
/// at error severity with the offending event payload and never surface in
/// the report.
async fn summarize_stack<S: EventSource>(source: &S, stack: &StackSummary) -> Result<Vec<Action>> {
    let events = fetch_stack_events(source, &stack.stack_id)
        .await
        .with_context(|| format!("failed to fetch events for stack {}", stack.stack_name))?;

    let filtered = filter_stack_transitions(events, &stack.stack_name);
    let pairing = pair_actions(&filtered);

    for discard in &pairing.discards {
        tracing::error!(
            stack = %stack.stack_name,
            event = ?discard.event,
            "ignoring event: {}",
            discard.reason
        );
    }

    Ok(pairing.actions)
}

/// Fetches and pairs every stack concurrently, then combines the results.
///
/// A fetch failure in any stack fails the whole run; no partial report is
/// produced.
async fn collect_actions(
    client: &Client,
    stacks: &[StackSummary],
    concurrency: usize,
) -> Result<Vec<Action>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut handles = Vec::with_capacity(stacks.len());
    for stack in stacks {
        let client = client.clone();
        let stack = stack.clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .context("semaphore closed")?;
            summarize_stack(&client, &stack).await
        }));
    }

    let mut actions = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(stack_actions) => actions.extend(stack_actions?),
            Err(e) => bail!("stack summarization task panicked: {e}"),
        }
    }
    Ok(actions)
}

/// Applies retention, ordering, and aggregation to the combined action set.
pub fn build_report(
    mut actions: Vec<Action>,
    stack_count: usize,
    retention_days: Option<u32>,
    now: DateTime<Utc>,
) -> ReportData {
    if let Some(days) = retention_days {
        actions = retain_recent(actions, TimeDelta::days(i64::from(days)), now);
    }
    sort_actions(&mut actions);

    let (unsuccessful, successful): (Vec<_>, Vec<_>) =
        actions.iter().cloned().partition(|a| !a.success);

    ReportData {
        generated_at: now,
        stack_count,
        actions,
        successful: summarize(&successful),
        unsuccessful: summarize(&unsuccessful),
    }
}

fn write_section(output: &mut String, title: &str, summaries: &[TransitionSummary]) {
    writeln!(output, "{title}").unwrap();
    if summaries.is_empty() {
        writeln!(output, "  (none)").unwrap();
        return;
    }
    for summary in summaries {
        writeln!(
            output,
            "  {} x {}: {} (avg: {})",
            summary.count,
            summary.signature,
            format_duration(summary.total_ms),
            format_duration(summary.avg_ms())
        )
        .unwrap();
    }
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "Found {} actions across {} stacks",
        data.actions.len(),
        data.stack_count
    )
    .unwrap();
    writeln!(output).unwrap();
    write_section(&mut output, "Things that went well:", &data.successful);
    writeln!(output).unwrap();
    write_section(
        &mut output,
        "Things that didn't go so well:",
        &data.unsuccessful,
    );

    output
}

#[derive(Debug, Serialize)]
struct JsonAction {
    stack_id: String,
    signature: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_ms: i64,
    success: bool,
}

#[derive(Debug, Serialize)]
struct JsonGroup {
    signature: String,
    count: usize,
    total_ms: i64,
    avg_ms: i64,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    generated_at: DateTime<Utc>,
    stack_count: usize,
    action_count: usize,
    successful: Vec<JsonGroup>,
    unsuccessful: Vec<JsonGroup>,
    /// Actions in display order: unsuccessful first, then longest first.
    actions: Vec<JsonAction>,
}

fn json_groups(summaries: &[TransitionSummary]) -> Vec<JsonGroup> {
    summaries
        .iter()
        .map(|s| JsonGroup {
            signature: s.signature.clone(),
            count: s.count,
            total_ms: s.total_ms,
            avg_ms: s.avg_ms(),
        })
        .collect()
}

/// Formats the report as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at,
        stack_count: data.stack_count,
        action_count: data.actions.len(),
        successful: json_groups(&data.successful),
        unsuccessful: json_groups(&data.unsuccessful),
        actions: data
            .actions
            .iter()
            .map(|a| JsonAction {
                stack_id: a.stack_id.to_string(),
                signature: signature(a),
                start: a.start,
                end: a.end,
                duration_ms: a.duration().num_milliseconds(),
                success: a.success,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report).context("failed to serialize report")
}

/// Runs the report command.
pub async fn run(
    client: &Client,
    concurrency: usize,
    retention_days: Option<u32>,
    json: bool,
) -> Result<()> {
    let stacks = client.list_stacks().await.context("failed to list stacks")?;
    let actions = collect_actions(client, &stacks, concurrency).await?;

    tracing::info!(
        actions = actions.len(),
        stacks = stacks.len(),
        "reconstructed actions"
    );

    let data = build_report(actions, stacks.len(), retention_days, Utc::now());
    if json {
        println!("{}", format_report_json(&data)?);
    } else {
        print!("{}", format_report(&data));
    }
    Ok(())
}
