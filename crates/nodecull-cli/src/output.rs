//! Run summary renderers.

use std::fmt::Write as _;

use anyhow::anyhow;
use clap::ValueEnum;
use nodecull_app::{FixedRunReport, RunOutcome};
use nodecull_core::RunReport;

use crate::error::{CliError, CliResult};

/// Summary output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

pub(crate) fn render_outcome(outcome: &RunOutcome, format: OutputFormat) -> CliResult<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
        OutputFormat::Table => match outcome {
            RunOutcome::Dynamic(report) => dynamic_table(report),
            RunOutcome::Fixed(report) => fixed_table(report),
        },
    };
    println!("{}", text.trim_end());
    Ok(())
}

pub(crate) fn dynamic_table(report: &RunReport) -> String {
    let plan = &report.plan;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "candidates: {}  eligible: {}  selected: {}",
        plan.candidates,
        plan.eligible,
        plan.victims.len()
    );
    if plan.victims.is_empty() {
        out.push_str("nothing to decommission\n");
        return out;
    }
    let _ = writeln!(out, "{:<24} {:<28} {:<16} CREATED", "INSTANCE", "HOST", "IP");
    for victim in plan.victims.victims() {
        let _ = writeln!(
            out,
            "{:<24} {:<28} {:<16} {}",
            victim.id.as_str(),
            victim.host_name,
            victim.internal_ip,
            victim.creation_time
        );
    }
    let phases: Vec<&str> = report
        .decommission
        .phases
        .iter()
        .map(|phase| phase.as_str())
        .collect();
    let _ = write!(out, "phases: {}", phases.join(", "));
    if report.decommission.dry_run {
        out.push_str(" (dry-run)");
    }
    out.push('\n');
    out
}

pub(crate) fn fixed_table(report: &FixedRunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "configured: {}  workers: {}  selected: {}",
        report.configured,
        report.workers,
        report.selected.len()
    );
    if report.selected.is_empty() {
        out.push_str("nothing to remove\n");
        return out;
    }
    let _ = writeln!(out, "{:<28} IP", "HOST");
    for node in &report.selected {
        let _ = writeln!(out, "{:<28} {}", node.host_name, node.internal_ip);
    }
    let _ = writeln!(
        out,
        "removed from cluster: {}",
        if report.removed { "yes" } else { "no" }
    );
    out
}
