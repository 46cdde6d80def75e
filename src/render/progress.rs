//! Loading indicator shown while a request is in flight.

use crate::models::InputMode;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Message shown next to the spinner.
pub fn loading_message(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Url => "Fetching and analyzing comments... this may take a moment.",
        InputMode::Text => "Analyzing...",
    }
}

/// Start a spinner on stderr. Hidden when `enabled` is false.
pub fn start_spinner(mode: InputMode, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(loading_message(mode));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
