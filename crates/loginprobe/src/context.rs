//! Per-test context handed to every scenario.

use crate::commands::Commands;
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::fixture::CredentialsFixture;
use crate::pages::LoginPage;
use crate::session::Session;

/// What a scenario sees: the session, its fixture and which attempt this is
#[derive(Debug)]
pub struct TestContext<'s, D: Driver> {
    session: &'s Session<D>,
    title: String,
    attempt: u32,
}

impl<'s, D: Driver> TestContext<'s, D> {
    /// Context for attempt `attempt` (1-based) of the test titled `title`
    #[must_use]
    pub fn new(session: &'s Session<D>, title: impl Into<String>, attempt: u32) -> Self {
        Self {
            session,
            title: title.into(),
            attempt,
        }
    }

    /// A fresh login page object
    #[must_use]
    pub fn login_page(&self) -> LoginPage<'s, D> {
        LoginPage::new(self.session)
    }

    /// A fresh command library
    #[must_use]
    pub fn commands(&self) -> Commands<'s, D> {
        Commands::new(self.session)
    }

    /// The session
    #[must_use]
    pub const fn session(&self) -> &'s Session<D> {
        self.session
    }

    /// The driver
    #[must_use]
    pub const fn driver(&self) -> &'s D {
        self.session.driver()
    }

    /// Credential fixture
    #[must_use]
    pub const fn fixture(&self) -> &'s CredentialsFixture {
        self.session.fixture()
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &'s SuiteConfig {
        self.session.config()
    }

    /// Test title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 1-based attempt number
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Narrative step, recorded against the running test
    pub fn log(&self, message: &str) {
        tracing::info!(test = %self.title, attempt = self.attempt, "{message}");
    }
}
