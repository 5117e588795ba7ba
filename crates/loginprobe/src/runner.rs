//! Sequential suite runner.
//!
//! ```text
//! for each selected scenario:
//!     for attempt in 1..=1 + retries(mode):
//!         reset browser state ─► before_each ─► scenario ─► drain page errors
//!         on failure: screenshot `failed_<title>_<ts>`
//!         stop on first passing attempt
//!     record; with FailureMode::AndonCord a failed test skips the rest
//! finally: video retention, report
//! ```
//!
//! Configuration and fixture problems abort the whole run; everything else
//! fails only the test it happened in.

use crate::config::RunMode;
use crate::context::TestContext;
use crate::driver::Driver;
use crate::exceptions::ExceptionPolicy;
use crate::reporter::{AttemptRecord, FailureMode, SuiteReport, TestRecord};
use crate::result::ProbeResult;
use crate::session::Session;
use futures::future::BoxFuture;
use regex::Regex;
use std::fmt;
use std::time::Instant;

/// Async body of a test or hook
pub type ScenarioFn<D> = for<'a> fn(&'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>>;

/// One named test
pub struct Scenario<D: Driver> {
    /// Stable id (`login/<group>/<slug>`), matched by `spec_pattern`
    pub id: &'static str,
    /// Group title
    pub group: &'static str,
    /// Test title
    pub title: &'static str,
    /// Body
    pub run: ScenarioFn<D>,
}

impl<D: Driver> Clone for Scenario<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Scenario<D> {}

impl<D: Driver> fmt::Debug for Scenario<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Ordered scenarios plus the hook run before each
pub struct Suite<D: Driver> {
    /// Suite name (also the video file stem)
    pub name: &'static str,
    /// Runs before every attempt of every scenario
    pub before_each: Option<ScenarioFn<D>>,
    /// Scenarios, in execution order
    pub scenarios: Vec<Scenario<D>>,
}

impl<D: Driver> fmt::Debug for Suite<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("before_each", &self.before_each.is_some())
            .field("scenarios", &self.scenarios)
            .finish()
    }
}

/// Progress callbacks
pub trait RunObserver {
    /// Before the first test
    fn on_run_started(&mut self, _suite: &str, _selected: usize) {}

    /// After an attempt fails, before any retry
    fn on_attempt_failed(&mut self, _scenario: &str, _attempt: &AttemptRecord) {}

    /// After a test's final attempt (or when it is skipped)
    fn on_test_finished(&mut self, _record: &TestRecord) {}

    /// After the report is complete
    fn on_run_finished(&mut self, _report: &SuiteReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Selection and failure handling for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Decides the retry count
    pub mode: RunMode,
    /// Continue or stop after a failed test
    pub failure_mode: FailureMode,
    /// Only scenarios whose id or title matches
    pub grep: Option<Regex>,
}

impl RunOptions {
    /// Options for a mode
    #[must_use]
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Stop after the first failed test
    #[must_use]
    pub const fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    /// Filter by regex
    #[must_use]
    pub fn with_grep(mut self, grep: Regex) -> Self {
        self.grep = Some(grep);
        self
    }
}

/// Runs a suite against one session
#[derive(Debug)]
pub struct SuiteRunner<'s, D: Driver> {
    session: &'s Session<D>,
    options: RunOptions,
    policy: ExceptionPolicy,
}

impl<'s, D: Driver> SuiteRunner<'s, D> {
    /// Runner over a session
    #[must_use]
    pub fn new(session: &'s Session<D>, options: RunOptions) -> Self {
        let policy = session.config().exception_policy();
        Self {
            session,
            options,
            policy,
        }
    }

    /// Scenarios this runner would execute, in order
    #[must_use]
    pub fn select<'a>(&self, suite: &'a Suite<D>) -> Vec<&'a Scenario<D>> {
        suite
            .scenarios
            .iter()
            .filter(|s| self.session.config().selects(s.id))
            .filter(|s| {
                self.options
                    .grep
                    .as_ref()
                    .map_or(true, |re| re.is_match(s.id) || re.is_match(s.title))
            })
            .collect()
    }

    /// Execute the suite and write the report
    pub async fn run(
        &self,
        suite: &Suite<D>,
        observer: &mut dyn RunObserver,
    ) -> ProbeResult<SuiteReport> {
        let config = self.session.config();
        let selected = self.select(suite);
        let max_attempts = config.retries_for(self.options.mode).saturating_add(1);
        let mut report = SuiteReport::new(suite.name, self.options.mode, &config.base_url);

        tracing::info!(
            suite = suite.name,
            run_id = %report.run_id,
            selected = selected.len(),
            max_attempts,
            "run started"
        );
        observer.on_run_started(suite.name, selected.len());

        let mut stopped = false;
        for scenario in selected {
            if stopped {
                let record = TestRecord::skipped(scenario.id, scenario.group, scenario.title);
                observer.on_test_finished(&record);
                report.record(record);
                continue;
            }

            let record = self.run_scenario(suite, scenario, max_attempts, observer).await?;
            let failed = record.status.is_failed();
            observer.on_test_finished(&record);
            report.record(record);

            if failed && self.options.failure_mode == FailureMode::AndonCord {
                tracing::warn!(scenario = scenario.id, "stopping run after failure");
                stopped = true;
            }
        }

        report.finish();
        if config.video {
            let video = self
                .session
                .artifacts()
                .videos_dir()
                .join(format!("{}.mp4", suite.name));
            let retention = self
                .session
                .artifacts()
                .retain_video(&video, report.any_attempt_failed())?;
            tracing::debug!(?retention, "video retention applied");
        }
        report.write(&config.reporter)?;

        tracing::info!(
            passes = report.stats.passes,
            failures = report.stats.failures,
            skipped = report.stats.skipped,
            "run finished"
        );
        observer.on_run_finished(&report);
        Ok(report)
    }

    async fn run_scenario(
        &self,
        suite: &Suite<D>,
        scenario: &Scenario<D>,
        max_attempts: u32,
        observer: &mut dyn RunObserver,
    ) -> ProbeResult<TestRecord> {
        let mut attempts = Vec::new();
        for attempt in 1..=max_attempts {
            let ctx = TestContext::new(self.session, scenario.title, attempt);
            let start = Instant::now();
            let outcome = self.run_attempt(suite, scenario, &ctx).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    tracing::info!(scenario = scenario.id, attempt, duration_ms, "passed");
                    attempts.push(AttemptRecord::passed(attempt, duration_ms));
                    break;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(scenario = scenario.id, attempt, error = %e, "failed");
                    let mut record = AttemptRecord::failed(attempt, duration_ms, e.to_string());
                    if let Some(path) = self.failure_screenshot(scenario.title).await {
                        record = record.with_screenshot(path);
                    }
                    observer.on_attempt_failed(scenario.id, &record);
                    attempts.push(record);
                }
            }
        }
        Ok(TestRecord::from_attempts(
            scenario.id,
            scenario.group,
            scenario.title,
            attempts,
        ))
    }

    async fn run_attempt(
        &self,
        suite: &Suite<D>,
        scenario: &Scenario<D>,
        ctx: &TestContext<'s, D>,
    ) -> ProbeResult<()> {
        self.session.reset_for_test().await?;
        if let Some(hook) = suite.before_each {
            hook(ctx).await?;
        }
        ctx.log(&format!("Starting test: {}", scenario.title));
        let body = (scenario.run)(ctx).await;
        let page_errors = self.session.driver().take_page_errors().await?;
        body?;
        self.policy.check(&page_errors)?;
        ctx.log(&format!("Completed test: {}", scenario.title));
        Ok(())
    }

    async fn failure_screenshot(&self, title: &str) -> Option<std::path::PathBuf> {
        if !self.session.config().screenshot_on_run_failure {
            return None;
        }
        let name = crate::artifacts::failure_screenshot_name(title, chrono::Utc::now());
        let shot = match self.session.driver().screenshot().await {
            Ok(shot) => shot,
            Err(e) => {
                tracing::warn!(error = %e, "failure screenshot not captured");
                return None;
            }
        };
        match self.session.artifacts().save_screenshot(&name, &shot) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "failure screenshot not saved");
                None
            }
        }
    }
}
