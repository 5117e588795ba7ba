//! Reporter - structured JSON run report.
//!
//! One [`TestRecord`] per scenario, holding every attempt the runner made
//! (run-level retries show up as extra attempts). The report file is named
//! `report.json` when `overwrite` is set, otherwise
//! `report_<timestamp>.json` using the configured chrono format.

use crate::config::{ReporterConfig, RunMode};
use crate::result::{ProbeError, ProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What to do once a test has failed every attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop the line: skip every remaining test
    AndonCord,
    /// Keep going and report all failures
    #[default]
    CollectAll,
}

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// One execution of a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt: u32,
    /// Outcome
    pub status: TestStatus,
    /// Wall time
    pub duration_ms: u64,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure screenshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl AttemptRecord {
    /// A passing attempt
    #[must_use]
    pub const fn passed(attempt: u32, duration_ms: u64) -> Self {
        Self {
            attempt,
            status: TestStatus::Passed,
            duration_ms,
            error: None,
            screenshot: None,
        }
    }

    /// A failing attempt
    #[must_use]
    pub fn failed(attempt: u32, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            attempt,
            status: TestStatus::Failed,
            duration_ms,
            error: Some(error.into()),
            screenshot: None,
        }
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: PathBuf) -> Self {
        self.screenshot = Some(path);
        self
    }
}

/// Final outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Scenario id (`login/<group>/<slug>`)
    pub id: String,
    /// Group title
    pub group: String,
    /// Test title
    pub title: String,
    /// Status of the last attempt (or skipped)
    pub status: TestStatus,
    /// Every attempt, in order
    pub attempts: Vec<AttemptRecord>,
}

impl TestRecord {
    /// Build from attempts; status follows the last one
    #[must_use]
    pub fn from_attempts(id: &str, group: &str, title: &str, attempts: Vec<AttemptRecord>) -> Self {
        let status = attempts
            .last()
            .map_or(TestStatus::Skipped, |a| a.status);
        Self {
            id: id.to_string(),
            group: group.to_string(),
            title: title.to_string(),
            status,
            attempts,
        }
    }

    /// A test that never ran
    #[must_use]
    pub fn skipped(id: &str, group: &str, title: &str) -> Self {
        Self::from_attempts(id, group, title, Vec::new())
    }

    /// Passed, but not on the first attempt
    #[must_use]
    pub fn is_flaky(&self) -> bool {
        self.status.is_passed() && self.attempts.len() > 1
    }

    /// Sum of attempt durations
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.attempts.iter().map(|a| a.duration_ms).sum()
    }

    /// Error of the last attempt
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.attempts.last().and_then(|a| a.error.as_deref())
    }
}

/// Aggregate counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Tests in the report
    pub tests: usize,
    /// Passed tests
    pub passes: usize,
    /// Failed tests
    pub failures: usize,
    /// Skipped tests
    pub skipped: usize,
    /// Passed after a retry
    pub flaky: usize,
    /// Attempts across all tests
    pub attempts: usize,
    /// Total test time
    pub duration_ms: u64,
    /// Passed / (passed + failed), as a percentage
    pub pass_percent: f64,
}

impl Stats {
    fn from_tests(tests: &[TestRecord]) -> Self {
        let passes = tests.iter().filter(|t| t.status.is_passed()).count();
        let failures = tests.iter().filter(|t| t.status.is_failed()).count();
        let ran = passes + failures;
        Self {
            tests: tests.len(),
            passes,
            failures,
            skipped: tests.len() - ran,
            flaky: tests.iter().filter(|t| t.is_flaky()).count(),
            attempts: tests.iter().map(|t| t.attempts.len()).sum(),
            duration_ms: tests.iter().map(TestRecord::duration_ms).sum(),
            pass_percent: if ran == 0 {
                0.0
            } else {
                passes as f64 * 100.0 / ran as f64
            },
        }
    }
}

/// Report for one suite run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Unique run id
    pub run_id: Uuid,
    /// Suite name
    pub suite: String,
    /// Mode the run used
    pub mode: RunMode,
    /// Application under test
    pub base_url: String,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub ended_at: Option<DateTime<Utc>>,
    /// Aggregates
    pub stats: Stats,
    /// Per-test records
    pub tests: Vec<TestRecord>,
}

impl SuiteReport {
    /// Start a report
    #[must_use]
    pub fn new(suite: impl Into<String>, mode: RunMode, base_url: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            suite: suite.into(),
            mode,
            base_url: base_url.into(),
            started_at: Utc::now(),
            ended_at: None,
            stats: Stats::default(),
            tests: Vec::new(),
        }
    }

    /// Add a test record
    pub fn record(&mut self, test: TestRecord) {
        self.tests.push(test);
        self.stats = Stats::from_tests(&self.tests);
    }

    /// Stamp the end time
    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    /// No test failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.stats.failures == 0
    }

    /// Some attempt of some test failed (even if a retry passed)
    #[must_use]
    pub fn any_attempt_failed(&self) -> bool {
        self.tests
            .iter()
            .flat_map(|t| &t.attempts)
            .any(|a| a.status.is_failed())
    }

    /// Tests whose final status is failed
    pub fn failed_tests(&self) -> impl Iterator<Item = &TestRecord> {
        self.tests.iter().filter(|t| t.status.is_failed())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report according to `config`; returns the path written
    pub fn write(&self, config: &ReporterConfig) -> ProbeResult<Option<PathBuf>> {
        if !config.json {
            return Ok(None);
        }
        std::fs::create_dir_all(&config.report_dir)?;
        let path = if config.overwrite {
            config.report_dir.join("report.json")
        } else {
            let stamp = format_timestamp(self.started_at, &config.timestamp_format)?;
            unique_path(&config.report_dir, &format!("report_{stamp}"), "json")
        };
        std::fs::write(&path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(Some(path))
    }
}

/// Format with a user-supplied chrono pattern without panicking
pub fn format_timestamp(at: DateTime<Utc>, pattern: &str) -> ProbeResult<String> {
    let mut out = String::new();
    write!(out, "{}", at.format(pattern))
        .map_err(|_| ProbeError::config(format!("invalid timestamp format {pattern:?}")))?;
    Ok(out)
}

fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{ext}"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.{ext}"));
        n += 1;
    }
    path
}
