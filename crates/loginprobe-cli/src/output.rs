//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use loginprobe::reporter::{AttemptRecord, SuiteReport, TestRecord, TestStatus};
use loginprobe::runner::RunObserver;
use std::path::Path;

/// Progress reporter for a suite run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar for `total` tests
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            // A hidden bar (stderr not a terminal) swallows println.
            Some(ref pb) if !pb.is_hidden() => pb.println(text),
            _ => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn prefix(&self, glyph: &str, plain: &str, paint: Style) -> String {
        if self.use_color {
            paint.bold().apply_to(glyph).to_string()
        } else {
            plain.to_string()
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", Style::new().green());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message (even in quiet mode)
    pub fn failure(&self, message: &str) {
        let prefix = self.prefix("✗", "FAIL", Style::new().red());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", Style::new().yellow());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("ℹ", "INFO", Style::new().blue());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        self.line("");
        self.line(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, report: &SuiteReport) {
        let stats = &report.stats;
        if self.quiet && stats.failures == 0 {
            return;
        }

        let secs = stats.duration_ms as f64 / 1000.0;
        let _ = self.term.write_line("");
        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if stats.failures > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            let _ = self.term.write_line(&format!(
                "{} {} tests in {:.2}s ({} passed, {} failed, {} skipped, {} flaky)",
                status,
                stats.tests,
                secs,
                passed_style.apply_to(stats.passes),
                if stats.failures > 0 {
                    failed_style.apply_to(stats.failures).to_string()
                } else {
                    stats.failures.to_string()
                },
                skipped_style.apply_to(stats.skipped),
                stats.flaky,
            ));
        } else {
            let status = if stats.failures > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {} tests in {secs:.2}s ({} passed, {} failed, {} skipped, {} flaky)",
                stats.tests, stats.passes, stats.failures, stats.skipped, stats.flaky
            ));
        }
    }

    /// Print where the report went
    pub fn report_path(&self, path: &Path) {
        self.info(&format!("report written to {}", path.display()));
    }
}

impl RunObserver for ProgressReporter {
    fn on_run_started(&mut self, suite: &str, selected: usize) {
        self.header(&format!("{suite} ({selected} tests)"));
        self.start_progress(selected as u64, suite);
    }

    fn on_attempt_failed(&mut self, scenario: &str, attempt: &AttemptRecord) {
        let error = attempt.error.as_deref().unwrap_or("unknown error");
        self.warning(&format!("{scenario} attempt {}: {error}", attempt.attempt));
    }

    fn on_test_finished(&mut self, record: &TestRecord) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
            pb.set_message(record.id.clone());
        }
        match record.status {
            TestStatus::Passed if record.is_flaky() => {
                self.success(&format!("{} (flaky, {} attempts)", record.title, record.attempts.len()));
            }
            TestStatus::Passed => self.success(&record.title),
            TestStatus::Failed => self.failure(&format!(
                "{}: {}",
                record.title,
                record.last_error().unwrap_or("failed")
            )),
            TestStatus::Skipped => self.warning(&format!("{} (skipped)", record.title)),
        }
    }

    fn on_run_finished(&mut self, report: &SuiteReport) {
        self.finish();
        self.summary(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginprobe::config::RunMode;

    fn quiet() -> ProgressReporter {
        ProgressReporter::new(false, true)
    }

    #[test]
    fn test_quiet_reporter_has_no_bar() {
        let mut r = quiet();
        r.start_progress(3, "login");
        assert!(r.progress_bar.is_none());
    }

    #[test]
    fn test_observer_callbacks_do_not_panic() {
        let mut r = ProgressReporter::new(false, false);
        r.on_run_started("login", 2);
        r.on_attempt_failed("login/x", &AttemptRecord::failed(1, 5, "boom"));
        r.on_test_finished(&TestRecord::from_attempts(
            "login/x",
            "g",
            "x",
            vec![AttemptRecord::failed(1, 5, "boom"), AttemptRecord::passed(2, 5)],
        ));
        r.on_test_finished(&TestRecord::skipped("login/y", "g", "y"));
        let mut report = SuiteReport::new("login", RunMode::Run, "https://hr.test");
        report.finish();
        r.on_run_finished(&report);
    }
}
