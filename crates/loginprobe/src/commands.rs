//! Reusable, suite-facing test commands.
//!
//! Commands compose the login page object with environment setup and
//! teardown. Each one logs what it is doing through `tracing`, which is how
//! a run's step-by-step narrative shows up in the output.

use crate::assertion::{expect_url_includes, poll_until, AssertionCheck};
use crate::driver::Driver;
use crate::locator::{Locator, LocatorOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::page_object::Element;
use crate::pages::login::{routes, LoginPage, DEFAULT_REQUIRED_MESSAGE};
use crate::result::ProbeResult;
use crate::retry::{self, RetryPolicy};
use crate::session::Session;
use crate::testdata;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments to [`Commands::login`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Assert the dashboard landmarks afterwards
    pub verify: bool,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            username: "Admin".to_string(),
            password: "admin123".to_string(),
            verify: true,
        }
    }
}

impl LoginOptions {
    /// Explicit credentials, verified
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            verify: true,
        }
    }

    /// Skip the post-login assertions
    #[must_use]
    pub fn without_verify(mut self) -> Self {
        self.verify = false;
        self
    }
}

/// Command library bound to one session
#[derive(Debug)]
pub struct Commands<'s, D: Driver> {
    session: &'s Session<D>,
    page: LoginPage<'s, D>,
}

impl<'s, D: Driver> Commands<'s, D> {
    /// Commands over a session
    #[must_use]
    pub fn new(session: &'s Session<D>) -> Self {
        Self {
            session,
            page: LoginPage::new(session),
        }
    }

    /// The page object commands delegate to
    #[must_use]
    pub const fn page(&self) -> &LoginPage<'s, D> {
        &self.page
    }

    /// Log in, visiting the login page first when not already on it
    pub async fn login(&self, options: LoginOptions) -> ProbeResult<()> {
        tracing::info!(username = %options.username, "attempting login");
        let url = self.session.driver().current_url().await?;
        if !url.contains(routes::LOGIN_FRAGMENT) {
            self.page.visit().await?;
        }
        self.page.login(&options.username, &options.password).await?;
        if options.verify {
            self.page.verify_login_success().await?;
            tracing::info!(username = %options.username, "login successful");
        }
        Ok(())
    }

    /// Open the user menu, follow the logout link, land on the login form
    pub async fn logout(&self) -> ProbeResult<()> {
        tracing::info!("performing logout");
        self.page.user_dropdown_trigger().click().await?;
        self.page.logout_link().click().await?;
        expect_url_includes(
            self.session.driver(),
            routes::LOGIN_FRAGMENT,
            &self.session.config().command_options(),
        )
        .await?;
        self.page.login_container().should_be_visible().await?;
        tracing::info!("logout successful");
        Ok(())
    }

    /// Navigate to the login page and wait for the form
    pub async fn visit_login_page(&self) -> ProbeResult<()> {
        tracing::info!("visiting login page");
        self.page.visit().await?;
        tracing::debug!("login page loaded");
        Ok(())
    }

    /// Clear cookies, local storage and session storage
    pub async fn clear_browser_data(&self) -> ProbeResult<()> {
        tracing::debug!("clearing browser data");
        let driver = self.session.driver();
        driver.clear_cookies().await?;
        driver.clear_local_storage().await?;
        driver.clear_session_storage().await?;
        Ok(())
    }

    /// Save a named screenshot; no assertion
    pub async fn take_screenshot(&self, name: &str) -> ProbeResult<PathBuf> {
        tracing::info!(name, "taking screenshot");
        let shot = self.session.driver().screenshot().await?;
        self.session.artifacts().save_screenshot(name, &shot)
    }

    /// `document.readyState` is `complete` and `body` is visible within
    /// `timeout` (default 10 s)
    pub async fn wait_for_page_load(&self, timeout: Option<Duration>) -> ProbeResult<()> {
        let options = LocatorOptions {
            timeout: timeout.unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        };
        tracing::debug!(timeout_ms = options.timeout.as_millis() as u64, "waiting for page load");
        let driver = self.session.driver();
        poll_until(&options, "document.readyState to be complete", move || async move {
            let state = driver.ready_state().await?;
            Ok(if state == "complete" {
                AssertionCheck::Pass(())
            } else {
                AssertionCheck::Fail(format!("readyState was {state:?}"))
            })
        })
        .await?;
        Element::new(driver, Locator::new("body", "body").with_options(options))
            .should_be_visible()
            .await?;
        Ok(())
    }

    /// Error banner is visible and contains `text`
    pub async fn verify_error_message(&self, text: &str) -> ProbeResult<()> {
        tracing::info!(expected = text, "verifying error message");
        self.page.error_message().should_contain_text(text).await?;
        Ok(())
    }

    /// A required-field message is visible; `field_label` is only logged
    pub async fn verify_required_field_validation(&self, field_label: &str) -> ProbeResult<()> {
        tracing::info!(field = field_label, "verifying required field validation");
        self.page
            .verify_required_field_validation(Some(DEFAULT_REQUIRED_MESSAGE))
            .await?;
        Ok(())
    }

    /// See [`testdata::generate_test_data`]
    #[must_use]
    pub fn generate_test_data(&self, kind: &str) -> String {
        testdata::generate_test_data(kind)
    }

    /// See [`retry::retry_action`]
    pub async fn retry_action<T, F, Fut>(&self, policy: RetryPolicy, action: F) -> ProbeResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ProbeResult<T>>,
    {
        tracing::info!(retries = policy.retries, "retrying action");
        retry::retry_action(policy, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_defaults() {
        let o = LoginOptions::default();
        assert_eq!(o.username, "Admin");
        assert_eq!(o.password, "admin123");
        assert!(o.verify);
    }

    #[test]
    fn test_without_verify() {
        let o = LoginOptions::new("Admin", "wrongpass").without_verify();
        assert!(!o.verify);
        assert_eq!(o.password, "wrongpass");
    }
}
