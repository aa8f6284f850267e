//! Progress reporting for model fan-outs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use stagegate_application::ports::progress::ProgressNotifier;
use std::sync::Mutex;

/// Reports fan-out progress with a progress bar on stderr
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_fan_out_start(&self, total_backends: usize) {
        let pb = ProgressBar::new(total_backends as u64);
        pb.set_style(Self::style());
        pb.set_prefix("Evaluating");
        pb.set_message("Waiting for backends...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_backend_complete(&self, backend_id: &str, success: bool) {
        let Ok(bar) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = bar.as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), backend_id)
            } else {
                format!("{} {}", "x".red(), backend_id)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_fan_out_complete(&self) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };
        if let Some(pb) = bar.take() {
            pb.finish_with_message(format!("{}", "all backends settled".green()));
        }
    }
}

/// Simple line-based progress (no redrawing), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_fan_out_start(&self, total_backends: usize) {
        eprintln!(
            "{} {} ({} backends)",
            "->".cyan(),
            "Evaluating".bold(),
            total_backends
        );
    }

    fn on_backend_complete(&self, backend_id: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), backend_id);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), backend_id);
        }
    }

    fn on_fan_out_complete(&self) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_lifecycle_clears_bar() {
        let reporter = ProgressReporter::new();
        reporter.on_fan_out_start(2);
        reporter.on_backend_complete("gpt", true);
        reporter.on_backend_complete("claude", false);
        assert_eq!(
            reporter.bar.lock().unwrap().as_ref().map(|pb| pb.position()),
            Some(2)
        );
        reporter.on_fan_out_complete();
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_completion_without_start_is_ignored() {
        let reporter = ProgressReporter::default();
        reporter.on_backend_complete("gpt", true);
        reporter.on_fan_out_complete();
        assert!(reporter.bar.lock().unwrap().is_none());
    }
}
