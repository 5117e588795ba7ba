//! Login page (and the dashboard landmarks reached from it).

use crate::assertion::{expect_url_includes, poll_until, AssertionCheck};
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::{Locator, LocatorOptions};
use crate::page_object::Element;
use crate::result::ProbeResult;
use crate::session::Session;

/// Application routes
pub mod routes {
    /// Login form
    pub const LOGIN: &str = "/web/index.php/auth/login";
    /// Landing page after a successful login
    pub const DASHBOARD: &str = "/web/index.php/dashboard/index";
    /// Logout link target
    pub const LOGOUT: &str = "/web/index.php/auth/logout";
    /// Credential submission endpoint
    pub const VALIDATE: &str = "/web/index.php/auth/validate";
    /// Target of the forgot-password link
    pub const PASSWORD_RESET: &str = "/web/index.php/auth/requestPasswordResetCode";
    /// Route fragment identifying the login page
    pub const LOGIN_FRAGMENT: &str = "/auth/login";
}

/// CSS selectors
pub mod selectors {
    pub const USERNAME_INPUT: &str = r#"[name="username"]"#;
    pub const PASSWORD_INPUT: &str = r#"[name="password"]"#;
    pub const LOGIN_BUTTON: &str = r#"[type="submit"]"#;
    pub const ERROR_MESSAGE: &str = ".oxd-alert-content-text";
    pub const LOGIN_CONTAINER: &str = ".orangehrm-login-container";
    pub const LOGIN_TITLE: &str = ".orangehrm-login-title";
    pub const FORGOT_PASSWORD_LINK: &str = ".orangehrm-login-forgot-header";
    pub const REQUIRED_FIELD_MESSAGE: &str = ".oxd-input-field-error-message";
    pub const DASHBOARD_HEADER: &str = ".oxd-topbar-header-breadcrumb h6";
    pub const USER_DROPDOWN_NAME: &str = ".oxd-userdropdown-name";
    pub const SIDE_PANEL: &str = ".oxd-sidepanel";
    pub const USER_DROPDOWN_TRIGGER: &str = ".oxd-userdropdown";
    pub const LOGOUT_LINK: &str = r#"a[href="/web/index.php/auth/logout"]"#;
}

/// Fallback for [`LoginPage::verify_login_failure`]
pub const DEFAULT_LOGIN_ERROR: &str = "Invalid credentials";

/// Fallback for [`LoginPage::verify_required_field_validation`]
pub const DEFAULT_REQUIRED_MESSAGE: &str = "Required";

/// Locator table for the login page and dashboard fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginLocators {
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub error_message: Locator,
    pub login_container: Locator,
    pub login_title: Locator,
    pub forgot_password_link: Locator,
    pub required_field_message: Locator,
    pub dashboard_header: Locator,
    pub user_dropdown: Locator,
    pub side_panel: Locator,
    pub user_dropdown_trigger: Locator,
    pub logout_link: Locator,
}

impl LoginLocators {
    /// Build every locator with the same wait options
    #[must_use]
    pub fn new(options: LocatorOptions) -> Self {
        let loc = |name: &'static str, css: &str| Locator::new(name, css).with_options(options);
        Self {
            username_input: loc("username input", selectors::USERNAME_INPUT),
            password_input: loc("password input", selectors::PASSWORD_INPUT),
            login_button: loc("login button", selectors::LOGIN_BUTTON),
            error_message: loc("error message", selectors::ERROR_MESSAGE),
            login_container: loc("login container", selectors::LOGIN_CONTAINER),
            login_title: loc("login title", selectors::LOGIN_TITLE),
            forgot_password_link: loc("forgot password link", selectors::FORGOT_PASSWORD_LINK),
            required_field_message: loc("required field message", selectors::REQUIRED_FIELD_MESSAGE),
            dashboard_header: loc("dashboard header", selectors::DASHBOARD_HEADER),
            user_dropdown: loc("user dropdown", selectors::USER_DROPDOWN_NAME),
            side_panel: loc("side panel", selectors::SIDE_PANEL),
            user_dropdown_trigger: loc("user dropdown trigger", selectors::USER_DROPDOWN_TRIGGER),
            logout_link: loc("logout link", selectors::LOGOUT_LINK),
        }
    }
}

/// Login page object.
///
/// Holds no interaction state: mutators act on the page and hand back
/// `&Self`, so calls chain with `?`:
///
/// ```ignore
/// page.enter_username("Admin").await?
///     .enter_password("admin123").await?
///     .click_login().await?
///     .verify_login_success().await?;
/// ```
#[derive(Debug)]
pub struct LoginPage<'s, D: Driver> {
    driver: &'s D,
    config: &'s SuiteConfig,
    locators: LoginLocators,
}

impl<'s, D: Driver> LoginPage<'s, D> {
    /// Page object over a session's driver
    #[must_use]
    pub fn new(session: &'s Session<D>) -> Self {
        Self {
            driver: session.driver(),
            config: session.config(),
            locators: LoginLocators::new(session.config().command_options()),
        }
    }

    /// Locator table
    #[must_use]
    pub const fn locators(&self) -> &LoginLocators {
        &self.locators
    }

    fn element(&self, locator: &Locator) -> Element<'s, D> {
        Element::new(self.driver, locator.clone())
    }

    pub fn username_input(&self) -> Element<'s, D> {
        self.element(&self.locators.username_input)
    }

    pub fn password_input(&self) -> Element<'s, D> {
        self.element(&self.locators.password_input)
    }

    pub fn login_button(&self) -> Element<'s, D> {
        self.element(&self.locators.login_button)
    }

    pub fn error_message(&self) -> Element<'s, D> {
        self.element(&self.locators.error_message)
    }

    pub fn login_container(&self) -> Element<'s, D> {
        self.element(&self.locators.login_container)
    }

    pub fn login_title(&self) -> Element<'s, D> {
        self.element(&self.locators.login_title)
    }

    pub fn forgot_password_link(&self) -> Element<'s, D> {
        self.element(&self.locators.forgot_password_link)
    }

    pub fn required_field_message(&self) -> Element<'s, D> {
        self.element(&self.locators.required_field_message)
    }

    pub fn dashboard_header(&self) -> Element<'s, D> {
        self.element(&self.locators.dashboard_header)
    }

    pub fn user_dropdown(&self) -> Element<'s, D> {
        self.element(&self.locators.user_dropdown)
    }

    pub fn side_panel(&self) -> Element<'s, D> {
        self.element(&self.locators.side_panel)
    }

    pub fn user_dropdown_trigger(&self) -> Element<'s, D> {
        self.element(&self.locators.user_dropdown_trigger)
    }

    pub fn logout_link(&self) -> Element<'s, D> {
        self.element(&self.locators.logout_link)
    }

    /// Navigate to the login route and wait for the form
    pub async fn visit(&self) -> ProbeResult<&Self> {
        let url = self.config.resolve_url(routes::LOGIN);
        tracing::debug!(%url, "visiting login page");
        self.driver.navigate(&url).await?;
        let page_load = self.config.page_load_options();
        expect_url_includes(self.driver, routes::LOGIN_FRAGMENT, &page_load).await?;
        Element::new(
            self.driver,
            self.locators.login_container.clone().with_options(page_load),
        )
        .should_be_visible()
        .await?;
        self.verify_login_page_loaded().await
    }

    /// Container, title, both inputs and the submit button are rendered
    pub async fn verify_login_page_loaded(&self) -> ProbeResult<&Self> {
        self.login_container().should_be_visible().await?;
        self.login_title().should_contain_text("Login").await?;
        self.username_input().should_be_visible().await?;
        self.password_input().should_be_visible().await?;
        self.login_button().should_be_visible().await?;
        Ok(self)
    }

    pub async fn enter_username(&self, username: &str) -> ProbeResult<&Self> {
        self.username_input().fill(username).await?;
        Ok(self)
    }

    pub async fn enter_password(&self, password: &str) -> ProbeResult<&Self> {
        self.password_input().fill(password).await?;
        Ok(self)
    }

    pub async fn click_login(&self) -> ProbeResult<&Self> {
        self.login_button().click().await?;
        Ok(self)
    }

    pub async fn clear_username(&self) -> ProbeResult<&Self> {
        self.username_input().clear().await?;
        Ok(self)
    }

    pub async fn clear_password(&self) -> ProbeResult<&Self> {
        self.password_input().clear().await?;
        Ok(self)
    }

    /// Clear both fields
    pub async fn clear_credentials(&self) -> ProbeResult<&Self> {
        self.clear_username().await?.clear_password().await
    }

    pub async fn click_forgot_password(&self) -> ProbeResult<&Self> {
        self.forgot_password_link().click().await?;
        Ok(self)
    }

    /// Enter both fields and submit. Does not wait for the outcome.
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<&Self> {
        self.enter_username(username)
            .await?
            .enter_password(password)
            .await?
            .click_login()
            .await
    }

    /// Dashboard URL, header, user menu and side panel all present
    pub async fn verify_login_success(&self) -> ProbeResult<&Self> {
        expect_url_includes(self.driver, routes::DASHBOARD, &self.config.command_options())
            .await?;
        self.dashboard_header()
            .should_contain_text("Dashboard")
            .await?;
        self.user_dropdown().should_be_visible().await?;
        self.side_panel().should_be_visible().await?;
        Ok(self)
    }

    /// Error banner shows `expected` (default "Invalid credentials") and
    /// the browser is still on the login route
    pub async fn verify_login_failure(&self, expected: Option<&str>) -> ProbeResult<&Self> {
        let expected = expected.unwrap_or(DEFAULT_LOGIN_ERROR);
        self.error_message().should_contain_text(expected).await?;
        expect_url_includes(self.driver, routes::LOGIN, &self.config.command_options()).await?;
        Ok(self)
    }

    /// A required-field message shows `expected` (default "Required")
    pub async fn verify_required_field_validation(
        &self,
        expected: Option<&str>,
    ) -> ProbeResult<&Self> {
        let expected = expected.unwrap_or(DEFAULT_REQUIRED_MESSAGE);
        self.required_field_message()
            .should_contain_text(expected)
            .await?;
        Ok(self)
    }

    /// Exactly `expected` required-field messages are shown
    pub async fn verify_required_field_count(&self, expected: usize) -> ProbeResult<&Self> {
        let locator = &self.locators.required_field_message;
        let description = format!("{expected} x {locator}");
        let driver = self.driver;
        poll_until(locator.options(), &description, move || async move {
            let n = driver.count(locator.selector()).await?;
            Ok(if n == expected {
                AssertionCheck::Pass(())
            } else {
                AssertionCheck::Fail(format!("found {n}"))
            })
        })
        .await?;
        Ok(self)
    }

    /// Input placeholders read "Username" and "Password"
    pub async fn verify_placeholders(&self) -> ProbeResult<&Self> {
        self.username_input()
            .should_have_attribute("placeholder", "Username")
            .await?;
        self.password_input()
            .should_have_attribute("placeholder", "Password")
            .await?;
        Ok(self)
    }

    pub async fn get_username_value(&self) -> ProbeResult<String> {
        self.username_input().value().await
    }

    pub async fn get_password_value(&self) -> ProbeResult<String> {
        self.password_input().value().await
    }
}
