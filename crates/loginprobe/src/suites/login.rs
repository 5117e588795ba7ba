//! The login suite.
//!
//! Scenarios are grouped the way the login flow is usually reasoned about:
//! the happy path, bad credentials, blank fields, the form itself, what the
//! form must not leak, and behaviour under a slow backend. Every scenario
//! starts from a cleared browser sitting on a loaded login page.

use crate::assertion::{expect_eq, expect_not_contains, expect_url_includes};
use crate::commands::LoginOptions;
use crate::context::TestContext;
use crate::driver::Driver;
use crate::network::{wait_for_request, HttpMethod, Route};
use crate::pages::login::routes;
use crate::result::ProbeResult;
use crate::retry::RetryPolicy;
use crate::runner::{Scenario, Suite};
use futures::future::BoxFuture;
use std::time::Duration;

/// Suite name, also the stem of its video file
pub const SUITE_NAME: &str = "login";

const POSITIVE: &str = "Positive Login Tests";
const NEGATIVE: &str = "Negative Login Tests";
const EMPTY: &str = "Empty Credentials Tests";
const UI: &str = "UI Validation Tests";
const SECURITY: &str = "Security Tests";
const ERROR_HANDLING: &str = "Error Handling Tests";

const VALIDATE_GLOB: &str = "**/auth/validate";
const SLOW_LOGIN_DELAY: Duration = Duration::from_secs(2);
const SLOW_LOGIN_WAIT: Duration = Duration::from_secs(15);
const SPECIAL_PASSWORD: &str = "P@ssw0rd!@#$%";

/// Build the login suite for any driver
#[must_use]
pub fn login_suite<D: Driver>() -> Suite<D> {
    Suite {
        name: SUITE_NAME,
        before_each: Some(before_each),
        scenarios: vec![
            Scenario {
                id: "login/positive/valid-credentials",
                group: POSITIVE,
                title: "should successfully login with valid credentials",
                run: valid_credentials,
            },
            Scenario {
                id: "login/positive/page-object-methods",
                group: POSITIVE,
                title: "should login using page object methods directly",
                run: page_object_methods,
            },
            Scenario {
                id: "login/negative/invalid-password",
                group: NEGATIVE,
                title: "should show error message for invalid password",
                run: invalid_password,
            },
            Scenario {
                id: "login/negative/invalid-username",
                group: NEGATIVE,
                title: "should show error message for invalid username",
                run: invalid_username,
            },
            Scenario {
                id: "login/negative/both-invalid",
                group: NEGATIVE,
                title: "should show error message for both invalid credentials",
                run: both_invalid,
            },
            Scenario {
                id: "login/negative/generated-account",
                group: NEGATIVE,
                title: "should reject a freshly generated account",
                run: generated_account,
            },
            Scenario {
                id: "login/empty/both-empty",
                group: EMPTY,
                title: "should show required field validation for empty username and password",
                run: both_empty,
            },
            Scenario {
                id: "login/empty/empty-username",
                group: EMPTY,
                title: "should show required field validation for empty username",
                run: empty_username,
            },
            Scenario {
                id: "login/empty/empty-password",
                group: EMPTY,
                title: "should show required field validation for empty password",
                run: empty_password,
            },
            Scenario {
                id: "login/ui/page-elements",
                group: UI,
                title: "should verify login page elements are present",
                run: page_elements,
            },
            Scenario {
                id: "login/ui/input-functionality",
                group: UI,
                title: "should verify input field functionality",
                run: input_functionality,
            },
            Scenario {
                id: "login/ui/forgot-password",
                group: UI,
                title: "should open the password reset page from the forgot password link",
                run: forgot_password,
            },
            Scenario {
                id: "login/security/password-masked",
                group: SECURITY,
                title: "should mask password field input",
                run: password_masked,
            },
            Scenario {
                id: "login/security/credentials-not-in-url",
                group: SECURITY,
                title: "should not expose credentials in network requests",
                run: credentials_not_in_url,
            },
            Scenario {
                id: "login/errors/slow-network",
                group: ERROR_HANDLING,
                title: "should handle network timeouts gracefully",
                run: slow_network,
            },
            Scenario {
                id: "login/errors/special-characters",
                group: ERROR_HANDLING,
                title: "should handle special characters in credentials",
                run: special_characters,
            },
        ],
    }
}

fn before_each<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        let commands = ctx.commands();
        commands.clear_browser_data().await?;
        commands.visit_login_page().await?;
        commands.wait_for_page_load(None).await
    })
}

// Positive

fn valid_credentials<'a, D: Driver>(
    ctx: &'a TestContext<'a, D>,
) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Valid Login");
        let fixture = ctx.fixture();
        let creds = &fixture.valid_credentials;
        let commands = ctx.commands();

        commands
            .login(LoginOptions::new(&creds.username, &creds.password))
            .await?;
        expect_url_includes(
            ctx.driver(),
            &fixture.test_data.dashboard_url,
            &ctx.config().command_options(),
        )
        .await?;
        commands
            .page()
            .dashboard_header()
            .should_contain_text(&fixture.test_data.expected_texts.dashboard_title)
            .await?;
        commands.take_screenshot("successful_login").await?;
        commands.logout().await
    })
}

fn page_object_methods<'a, D: Driver>(
    ctx: &'a TestContext<'a, D>,
) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Login using POM methods");
        let creds = &ctx.fixture().valid_credentials;
        let page = ctx.login_page();

        page.enter_username(&creds.username)
            .await?
            .enter_password(&creds.password)
            .await?
            .click_login()
            .await?
            .verify_login_success()
            .await?;
        page.user_dropdown().should_be_visible().await?;
        page.side_panel().should_be_visible().await?;

        ctx.commands().logout().await
    })
}

// Negative

async fn rejects<D: Driver>(
    ctx: &TestContext<'_, D>,
    username: &str,
    password: &str,
    screenshot: &str,
) -> ProbeResult<()> {
    let data = &ctx.fixture().test_data;
    let expected = data.expected_error_messages.invalid_credentials.as_str();
    let commands = ctx.commands();

    commands
        .page()
        .login(username, password)
        .await?
        .verify_login_failure(Some(expected))
        .await?;
    expect_url_includes(ctx.driver(), &data.login_url, &ctx.config().command_options()).await?;
    commands.verify_error_message(expected).await?;
    commands.take_screenshot(screenshot).await?;
    Ok(())
}

fn invalid_password<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Invalid Password");
        let creds = &ctx.fixture().invalid_credentials.wrong_password;
        rejects(ctx, &creds.username, &creds.password, "invalid_password_error").await
    })
}

fn invalid_username<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Invalid Username");
        let creds = &ctx.fixture().invalid_credentials.wrong_username;
        rejects(ctx, &creds.username, &creds.password, "invalid_username_error").await
    })
}

fn both_invalid<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Both Credentials Invalid");
        let creds = &ctx.fixture().invalid_credentials.both_wrong;
        rejects(ctx, &creds.username, &creds.password, "both_credentials_invalid").await
    })
}

fn generated_account<'a, D: Driver>(
    ctx: &'a TestContext<'a, D>,
) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Generated Account");
        let commands = ctx.commands();
        let username = commands.generate_test_data("username");
        let password = commands.generate_test_data("password");
        let expected = ctx
            .fixture()
            .test_data
            .expected_error_messages
            .invalid_credentials
            .as_str();

        let page = commands.page();
        let (username, password) = (username.as_str(), password.as_str());
        commands
            .retry_action(
                RetryPolicy::new(2, Duration::from_millis(250)),
                move |attempt| async move {
                    tracing::debug!(attempt, username, "submitting generated account");
                    page.login(username, password)
                        .await?
                        .verify_login_failure(Some(expected))
                        .await?;
                    Ok(())
                },
            )
            .await
    })
}

// Empty credentials

async fn stays_on_login<D: Driver>(ctx: &TestContext<'_, D>, screenshot: &str) -> ProbeResult<()> {
    let commands = ctx.commands();
    commands.page().verify_required_field_validation(None).await?;
    expect_url_includes(
        ctx.driver(),
        &ctx.fixture().test_data.login_url,
        &ctx.config().command_options(),
    )
    .await?;
    commands.take_screenshot(screenshot).await?;
    Ok(())
}

fn both_empty<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Both Fields Empty");
        let commands = ctx.commands();
        let required = ctx
            .fixture()
            .test_data
            .expected_error_messages
            .required_field
            .as_str();

        commands
            .page()
            .click_login()
            .await?
            .verify_required_field_validation(Some(required))
            .await?
            .verify_required_field_count(2)
            .await?;
        commands
            .verify_required_field_validation("username and password")
            .await?;
        stays_on_login(ctx, "empty_credentials_validation").await
    })
}

fn empty_username<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Empty Username");
        let creds = &ctx.fixture().empty_credentials.empty_username;
        ctx.login_page()
            .enter_password(&creds.password)
            .await?
            .click_login()
            .await?
            .verify_required_field_count(1)
            .await?;
        stays_on_login(ctx, "empty_username_validation").await
    })
}

fn empty_password<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Empty Password");
        let creds = &ctx.fixture().empty_credentials.empty_password;
        ctx.login_page()
            .enter_username(&creds.username)
            .await?
            .click_login()
            .await?
            .verify_required_field_count(1)
            .await?;
        stays_on_login(ctx, "empty_password_validation").await
    })
}

// UI

fn page_elements<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Login Page UI Validation");
        let page = ctx.login_page();
        let title = &ctx.fixture().test_data.expected_texts.login_title;

        page.login_container().should_be_visible().await?;
        page.login_title().should_contain_text(title).await?;
        page.username_input().should_be_visible().await?;
        page.password_input().should_be_visible().await?;
        page.login_button().should_be_visible().await?;
        page.forgot_password_link().should_be_visible().await?;
        page.verify_placeholders().await?;

        ctx.commands()
            .take_screenshot("login_page_ui_validation")
            .await?;
        Ok(())
    })
}

fn input_functionality<'a, D: Driver>(
    ctx: &'a TestContext<'a, D>,
) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Input Field Functionality");
        let page = ctx.login_page();

        page.enter_username("testuser").await?;
        expect_eq("username value", page.get_username_value().await?.as_str(), "testuser")?;
        page.enter_password("testpass").await?;
        expect_eq("password value", page.get_password_value().await?.as_str(), "testpass")?;

        page.clear_credentials().await?;
        page.username_input().should_be_empty().await?;
        page.password_input().should_be_empty().await?;

        ctx.commands()
            .take_screenshot("input_field_functionality")
            .await?;
        Ok(())
    })
}

fn forgot_password<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Forgot Password Link");
        ctx.login_page().click_forgot_password().await?;
        expect_url_includes(
            ctx.driver(),
            routes::PASSWORD_RESET,
            &ctx.config().page_load_options(),
        )
        .await?;
        Ok(())
    })
}

// Security

fn password_masked<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Password Field Masking");
        let page = ctx.login_page();
        page.enter_password("secretpassword").await?;
        page.password_input()
            .should_have_attribute("type", "password")
            .await?;
        ctx.commands()
            .take_screenshot("password_field_masking")
            .await?;
        Ok(())
    })
}

fn credentials_not_in_url<'a, D: Driver>(
    ctx: &'a TestContext<'a, D>,
) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Credential Security in Network");
        let creds = &ctx.fixture().valid_credentials;
        let driver = ctx.driver();

        driver
            .intercept(Route::new(HttpMethod::Post, VALIDATE_GLOB).with_alias("loginRequest"))
            .await?;
        ctx.login_page()
            .login(&creds.username, &creds.password)
            .await?;

        let request = wait_for_request(
            driver,
            "loginRequest",
            ctx.config().request_options().timeout,
        )
        .await?;
        expect_not_contains("request url", &request.url, &creds.password)?;
        expect_not_contains("request url", &request.url, &creds.username)?;

        ctx.commands().logout().await
    })
}

// Error handling

fn slow_network<'a, D: Driver>(ctx: &'a TestContext<'a, D>) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Network Timeout Handling");
        let creds = &ctx.fixture().valid_credentials;
        let driver = ctx.driver();
        let page = ctx.login_page();

        driver
            .intercept(
                Route::new(HttpMethod::Post, VALIDATE_GLOB)
                    .with_alias("slowLogin")
                    .with_delay(SLOW_LOGIN_DELAY),
            )
            .await?;
        page.login(&creds.username, &creds.password).await?;

        wait_for_request(driver, "slowLogin", SLOW_LOGIN_WAIT).await?;
        expect_url_includes(driver, routes::DASHBOARD, &ctx.config().response_options()).await?;
        page.verify_login_success().await?;

        ctx.commands().logout().await
    })
}

fn special_characters<'a, D: Driver>(
    ctx: &'a TestContext<'a, D>,
) -> BoxFuture<'a, ProbeResult<()>> {
    Box::pin(async move {
        ctx.log("Test Case: Special Characters in Credentials");
        let creds = &ctx.fixture().valid_credentials;
        let page = ctx.login_page();

        page.enter_username(&creds.username)
            .await?
            .enter_password(SPECIAL_PASSWORD)
            .await?;
        page.password_input()
            .should_have_value(SPECIAL_PASSWORD)
            .await?;
        page.click_login().await?.verify_login_failure(None).await?;

        ctx.commands()
            .take_screenshot("special_characters_handling")
            .await?;
        Ok(())
    })
}
