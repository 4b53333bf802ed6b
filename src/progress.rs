//! Progress reporting: count-style bars for threads fetched and dump files scanned.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Count-style progress bar (items processed out of total), with an optional label.
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         elapsed: {elapsed_precise}  eta: {eta_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    if !label.is_empty() {
        pb.set_message(label.to_string());
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// `Some(bar)` when progress is enabled, else `None`; callers `if let` on it.
pub fn maybe_count_progress(enabled: bool, total: u64, label: Option<&str>, fallback: &str) -> Option<ProgressBar> {
    enabled.then(|| make_count_progress(total, label.unwrap_or(fallback)))
}
