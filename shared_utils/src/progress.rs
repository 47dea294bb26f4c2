//! Batch progress bar and human-readable formatting helpers.

use indicatif::{ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub use indicatif::ProgressBar;

pub mod progress_style {
    pub const PROGRESS_CHARS: &str = "█▓░";
    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
    pub const BATCH_TEMPLATE: &str =
        "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {pos}/{len} • {elapsed_precise} • {msg}";
}

/// Progress bar for `total` files. A quiet bar is hidden but still counts.
pub fn create_progress_bar(total: u64, prefix: &str, quiet: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }

    match ProgressStyle::default_bar().template(progress_style::BATCH_TEMPLATE) {
        Ok(style) => pb.set_style(
            style
                .progress_chars(progress_style::PROGRESS_CHARS)
                .tick_chars(progress_style::SPINNER_CHARS),
        ),
        Err(e) => tracing::debug!(error = %e, "Falling back to default progress style"),
    }
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
