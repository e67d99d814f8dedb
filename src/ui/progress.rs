//! Spinner shown while a function is packaged

use super::context::UiContext;
use super::output::{line, Mark};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A spinner on a terminal, a single `...` line otherwise
pub struct TaskSpinner {
    ctx: UiContext,
    bar: Option<ProgressBar>,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self { ctx: *ctx, bar: None }
    }

    pub fn start(&mut self, message: &str) {
        if !self.ctx.use_fancy_output() {
            println!("{} {}", style("...").dim(), message);
            return;
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(template) =
            ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}  {elapsed:.dim}")
        {
            bar.set_style(template);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Replace the spinner with a success line
    pub fn stop(&mut self, message: &str) {
        self.finish(Mark::Ok, message);
    }

    /// Replace the spinner with a failure line
    pub fn stop_error(&mut self, message: &str) {
        self.finish(Mark::Fail, message);
    }

    fn finish(&mut self, mark: Mark, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        line(&self.ctx, mark, message);
    }
}

impl Drop for TaskSpinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
