//! Rendering of run results and plans.

use super::theme::Theme;
use crate::runner::{PlannedStep, RunResult, StepOutcome};

/// Lines describing each step of a finished run, then a tally.
pub fn render_run(result: &RunResult, theme: &Theme) -> Vec<String> {
    let mut lines: Vec<String> = result
        .records
        .iter()
        .map(|record| {
            let line = record.summary_line();
            match record.outcome {
                StepOutcome::Applied => theme.success.apply_to(line).to_string(),
                StepOutcome::SkippedAlreadySatisfied => theme.dim.apply_to(line).to_string(),
                StepOutcome::Failed(_) => theme.error.apply_to(line).to_string(),
            }
        })
        .collect();

    for name in &result.not_applicable {
        lines.push(
            theme
                .dim
                .apply_to(format!("- {} (not applicable)", name))
                .to_string(),
        );
    }

    lines.push(tally(result));
    lines
}

/// One-line tally of applied, skipped, and failed steps.
pub fn tally(result: &RunResult) -> String {
    let applied = result.count(&StepOutcome::Applied);
    let skipped = result.count(&StepOutcome::SkippedAlreadySatisfied);
    let failed = result.records.len() - applied - skipped;
    let mut line = format!("{} applied, {} already satisfied", applied, skipped);
    if failed > 0 {
        line.push_str(&format!(", {} failed", failed));
    }
    if !result.not_applicable.is_empty() {
        line.push_str(&format!(
            ", {} not applicable",
            result.not_applicable.len()
        ));
    }
    line
}

/// Lines describing what a run would do.
pub fn render_plan(planned: &[PlannedStep], theme: &Theme) -> Vec<String> {
    planned
        .iter()
        .map(|step| match &step.satisfied {
            Ok(true) => theme.format_skipped(&format!("{} (already satisfied)", step.name)),
            Ok(false) => format!("• {} (would apply)", step.name),
            Err(message) => theme.format_error(&format!("{} - {}", step.name, message)),
        })
        .collect()
}
