//src/progress.rs

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_MILLIS: u64 = 80;
const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A stderr spinner in the given colour (`blue`, `green`, ...). indicatif
/// hides it when stderr is not a terminal, so piped runs stay clean.
pub fn spinner(msg: &str, colour: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(TICKS)
        .template(&format!("{{spinner:.{}}} {{msg}}", colour))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(TICK_MILLIS));
    spinner
}
