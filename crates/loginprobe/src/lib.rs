//! loginprobe: page objects, reusable commands and a login e2e suite for the
//! OrangeHRM demo application.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                       loginprobe Architecture                      │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐  │
//! │  │ Suite    │──►│ Commands   │──►│ LoginPage  │──►│ Driver     │  │
//! │  │ (login)  │   │            │   │ (locators) │   │ (trait)    │  │
//! │  └────┬─────┘   └─────┬──────┘   └─────┬──────┘   └─────┬──────┘  │
//! │       │               └───────┬────────┘                │         │
//! │       ▼                       ▼                 ┌───────┴──────┐  │
//! │  ┌──────────┐          ┌────────────┐           │ SimulatedHr  │  │
//! │  │ Runner + │          │ Assertion  │           │ ChromiumDrv  │  │
//! │  │ Reporter │          │ (polling)  │           └──────────────┘  │
//! │  └──────────┘          └────────────┘                             │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```no_run
//! use loginprobe::prelude::*;
//!
//! # async fn demo() -> ProbeResult<()> {
//! let config = SuiteConfig::default();
//! let app = SimulatedHrApp::new(&config.base_url);
//! let session = Session::new(app, config, CredentialsFixture::builtin()?);
//! let runner = SuiteRunner::new(&session, RunOptions::new(RunMode::Run));
//! let report = runner.run(&login_suite(), &mut NoopObserver).await?;
//! assert!(report.all_passed());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod artifacts;
pub mod assertion;
#[cfg(feature = "browser")]
pub mod browser;
pub mod commands;
pub mod config;
pub mod context;
pub mod driver;
pub mod exceptions;
pub mod fixture;
pub mod locator;
pub mod network;
pub mod page_object;
pub mod pages;
pub mod reporter;
pub mod result;
pub mod retry;
pub mod runner;
pub mod session;
pub mod sim;
pub mod suites;
pub mod testdata;

pub use result::{ProbeError, ProbeResult};

/// Everything a suite or a runner binary usually needs
pub mod prelude {
    pub use super::artifacts::{ArtifactStore, VideoRetention};
    pub use super::assertion::{
        expect_element, expect_eq, expect_not_contains, expect_url_includes, poll_until,
        AssertionCheck, Expectation,
    };
    #[cfg(feature = "browser")]
    pub use super::browser::ChromiumDriver;
    pub use super::commands::{Commands, LoginOptions};
    pub use super::config::{ReporterConfig, RetryModes, RunMode, SuiteConfig, Timeouts};
    pub use super::context::TestContext;
    pub use super::driver::{Driver, ElementSnapshot, Screenshot, Viewport};
    pub use super::exceptions::ExceptionPolicy;
    pub use super::fixture::{Credentials, CredentialsFixture};
    pub use super::locator::{Locator, LocatorOptions, Selector};
    pub use super::network::{wait_for_request, CapturedRequest, HttpMethod, Route, UrlPattern};
    pub use super::page_object::Element;
    pub use super::pages::{routes, selectors, LoginLocators, LoginPage};
    pub use super::reporter::{
        AttemptRecord, FailureMode, Stats, SuiteReport, TestRecord, TestStatus,
    };
    pub use super::result::{ProbeError, ProbeResult};
    pub use super::retry::{retry_action, RetryPolicy};
    pub use super::runner::{
        NoopObserver, RunObserver, RunOptions, Scenario, ScenarioFn, Suite, SuiteRunner,
    };
    pub use super::session::Session;
    pub use super::sim::SimulatedHrApp;
    pub use super::suites::{login_suite, SUITE_NAME};
    pub use super::testdata::{generate_test_data, generate_test_data_at};
}
