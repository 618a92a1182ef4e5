//! Spinner shown while a non-streamed reply is pending

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Steady-ticking spinner; a hidden one when progress is disabled
pub struct ThinkingSpinner {
    bar: ProgressBar,
}

impl ThinkingSpinner {
    pub fn start(message: &str, enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg:.dim}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Remove the spinner line before the reply is printed
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for ThinkingSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
