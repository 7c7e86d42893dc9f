//! Stacks command: list the stacks known to the event source.

use anyhow::{Context, Result};

use sb_source::{Client, EventSource, StackSummary};

/// Formats the human-readable stack listing.
pub fn format_stacks(stacks: &[StackSummary]) -> String {
    if stacks.is_empty() {
        return "No stacks found.\n".to_string();
    }
    let mut output = String::new();
    for stack in stacks {
        output.push_str(&format!("{}\t{}\n", stack.stack_name, stack.stack_id));
    }
    output
}

/// Runs the stacks command.
pub async fn run(client: &Client, json: bool) -> Result<()> {
    let stacks = client.list_stacks().await.context("failed to list stacks")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stacks).context("failed to serialize stacks")?
        );
    } else {
        print!("{}", format_stacks(&stacks));
    }
    Ok(())
}
