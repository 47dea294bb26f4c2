//! Report Module
//!
//! Summary printed at the end of a batch.

use crate::batch::{BatchResult, FailureKind};
use crate::progress::format_duration;
use console::style;
use std::time::Duration;

pub fn render_summary(result: &BatchResult, duration: Duration) -> String {
    let mut lines = vec![
        String::new(),
        format!("{}", style("Trace extraction summary").bold()),
        format!("  Files processed: {:>8}", result.total),
        format!("  Succeeded:       {:>8}", style(result.succeeded).green()),
        format!("  Failed:          {:>8}", style(result.failed).red()),
        format!("  Skipped:         {:>8}", result.skipped),
        format!("  Success rate:    {:>7.1}%", result.success_rate()),
        format!("  Trace lines:     {:>8}", result.lines_written),
        format!("  Total time:      {:>8}", format_duration(duration)),
    ];

    if !result.errors.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}", style("Errors encountered:").red().bold()));
        for error in &result.errors {
            let tag = match error.kind {
                FailureKind::Probe => "probe",
                FailureKind::Transform => "transform",
            };
            lines.push(format!(
                "   [{}] {} → {}",
                tag,
                error.path.display(),
                error.message
            ));
        }
    }

    lines.join("\n")
}

pub fn print_summary_report(result: &BatchResult, duration: Duration) {
    println!("{}", render_summary(result, duration));
}
