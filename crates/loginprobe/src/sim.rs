//! SimulatedHrApp - in-memory model of the demo login flow.
//!
//! Implements [`Driver`] without a browser. It renders the same selectors
//! the real application does for four pages (login, dashboard, password
//! reset, not found) and reproduces the behaviour the login suite depends
//! on:
//!
//! - blank fields raise one `Required` message per field and send nothing
//! - a submit posts to `/auth/validate`; known accounts land on the
//!   dashboard with a session cookie, anything else stays on the login page
//!   with `Invalid credentials`
//! - registered routes capture the POST and may delay it, in which case the
//!   outcome arrives later on a tokio task while the page reports `loading`
//! - the dashboard emits the benign `ResizeObserver` error on load
//!
//! State sits behind a `std` mutex that is never held across an await.

use crate::driver::{Driver, ElementSnapshot, Screenshot, Viewport};
use crate::fixture::Credentials;
use crate::locator::Selector;
use crate::network::{CapturedRequest, HttpMethod, Route};
use crate::pages::login::{routes, selectors};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const BLANK: &str = "about:blank";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const RESET_TITLE: &str = ".orangehrm-forgot-password-title";
const RESIZE_OBSERVER_ERROR: &str = "ResizeObserver loop limit exceeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Login,
    Dashboard,
    PasswordReset,
    NotFound,
}

#[derive(Debug)]
struct AppState {
    origin: String,
    accounts: HashMap<String, String>,
    url: String,
    page: Page,
    nav_seq: u64,
    session_user: Option<String>,
    local_storage: HashMap<String, String>,
    session_storage: HashMap<String, String>,
    username: String,
    password: String,
    error_banner: Option<String>,
    required: Vec<&'static str>,
    menu_open: bool,
    pending_submit: bool,
    viewport: Viewport,
    headers: Vec<(String, String)>,
    routes: Vec<Route>,
    captured: Vec<CapturedRequest>,
    page_errors: Vec<String>,
    history: Vec<String>,
    withheld: Vec<String>,
    closed: bool,
}

impl AppState {
    fn check_open(&self) -> ProbeResult<()> {
        if self.closed {
            Err(ProbeError::BrowserClosed {
                operation: "drive the page".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn path_of<'u>(&self, url: &'u str) -> Option<&'u str> {
        url.strip_prefix(self.origin.as_str())
            .map(|p| p.split(['?', '#']).next().unwrap_or(p))
    }

    fn go(&mut self, path: &str) {
        let (page, path) = match path {
            routes::LOGIN if self.session_user.is_some() => (Page::Dashboard, routes::DASHBOARD),
            routes::LOGIN | "/" | "" => (Page::Login, routes::LOGIN),
            routes::DASHBOARD if self.session_user.is_some() => (Page::Dashboard, routes::DASHBOARD),
            routes::DASHBOARD => (Page::Login, routes::LOGIN),
            routes::LOGOUT => {
                self.session_user = None;
                (Page::Login, routes::LOGIN)
            }
            routes::PASSWORD_RESET => (Page::PasswordReset, routes::PASSWORD_RESET),
            other => (Page::NotFound, other),
        };
        self.url = format!("{}{path}", self.origin);
        self.page = page;
        self.nav_seq += 1;
        self.username.clear();
        self.password.clear();
        self.error_banner = None;
        self.required.clear();
        self.menu_open = false;
        self.pending_submit = false;
        if page == Page::Dashboard {
            self.page_errors.push(RESIZE_OBSERVER_ERROR.to_string());
        }
    }

    fn complete_login(&mut self, username: &str, password: &str) {
        self.pending_submit = false;
        if self.accounts.get(username).is_some_and(|p| p == password) {
            self.session_user = Some(username.to_string());
            self.go(routes::DASHBOARD);
        } else {
            self.go(routes::LOGIN);
            self.error_banner = Some("Invalid credentials".to_string());
        }
    }

    fn elements(&self) -> Vec<(&'static str, ElementSnapshot)> {
        let mut out = vec![("body", ElementSnapshot::new("body"))];
        match self.page {
            Page::Blank | Page::NotFound => {}
            Page::Login => {
                out.push((selectors::LOGIN_CONTAINER, ElementSnapshot::new("div")));
                out.push((
                    selectors::LOGIN_TITLE,
                    ElementSnapshot::new("h5").with_text("Login"),
                ));
                out.push((
                    selectors::USERNAME_INPUT,
                    ElementSnapshot::new("input")
                        .with_value(self.username.clone())
                        .with_attribute("name", "username")
                        .with_attribute("placeholder", "Username")
                        .with_attribute("type", "text"),
                ));
                out.push((
                    selectors::PASSWORD_INPUT,
                    ElementSnapshot::new("input")
                        .with_value(self.password.clone())
                        .with_attribute("name", "password")
                        .with_attribute("placeholder", "Password")
                        .with_attribute("type", "password"),
                ));
                out.push((
                    selectors::LOGIN_BUTTON,
                    ElementSnapshot::new("button")
                        .with_text(" Login ")
                        .with_attribute("type", "submit"),
                ));
                out.push((
                    selectors::FORGOT_PASSWORD_LINK,
                    ElementSnapshot::new("p").with_text("Forgot your password? "),
                ));
                if let Some(banner) = &self.error_banner {
                    out.push((
                        selectors::ERROR_MESSAGE,
                        ElementSnapshot::new("p").with_text(banner.clone()),
                    ));
                }
                for _ in &self.required {
                    out.push((
                        selectors::REQUIRED_FIELD_MESSAGE,
                        ElementSnapshot::new("span").with_text("Required"),
                    ));
                }
            }
            Page::Dashboard => {
                let user = self.session_user.clone().unwrap_or_default();
                out.push((
                    selectors::DASHBOARD_HEADER,
                    ElementSnapshot::new("h6").with_text("Dashboard"),
                ));
                out.push((selectors::USER_DROPDOWN_TRIGGER, ElementSnapshot::new("li")));
                out.push((
                    selectors::USER_DROPDOWN_NAME,
                    ElementSnapshot::new("p").with_text(format!("{user} User")),
                ));
                out.push((selectors::SIDE_PANEL, ElementSnapshot::new("aside")));
                out.push((
                    selectors::LOGOUT_LINK,
                    ElementSnapshot::new("a")
                        .with_text("Logout")
                        .with_attribute("href", routes::LOGOUT)
                        .with_visible(self.menu_open),
                ));
            }
            Page::PasswordReset => {
                out.push((
                    RESET_TITLE,
                    ElementSnapshot::new("h6").with_text("Reset Password"),
                ));
            }
        }
        out.retain(|(css, _)| !self.withheld.iter().any(|w| w == css));
        out
    }

    fn matching(&self, selector: &Selector) -> Vec<ElementSnapshot> {
        let (css, text) = match selector {
            Selector::Css(css) => (css.as_str(), None),
            Selector::CssWithText { css, text } => (css.as_str(), Some(text.as_str())),
        };
        self.elements()
            .into_iter()
            .filter(|(sel, el)| *sel == css && text.map_or(true, |t| el.text.contains(t)))
            .map(|(_, el)| el)
            .collect()
    }

    fn field_mut(&mut self, selector: &Selector) -> ProbeResult<&mut String> {
        if self.page == Page::Login {
            match selector.as_css() {
                Some(selectors::USERNAME_INPUT) => return Ok(&mut self.username),
                Some(selectors::PASSWORD_INPUT) => return Ok(&mut self.password),
                _ => {}
            }
        }
        Err(ProbeError::ElementNotFound {
            selector: selector.to_string(),
        })
    }
}

/// What a submit turned into
enum Submit {
    Nothing,
    Immediate(String, String),
    Delayed(String, String, Duration, u64),
}

/// In-memory demo application
#[derive(Debug, Clone)]
pub struct SimulatedHrApp {
    state: Arc<Mutex<AppState>>,
}

impl SimulatedHrApp {
    /// App served at `base_url` with the demo's `Admin`/`admin123` account
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let mut accounts = HashMap::new();
        let _ = accounts.insert("Admin".to_string(), "admin123".to_string());
        Self {
            state: Arc::new(Mutex::new(AppState {
                origin: base_url.trim_end_matches('/').to_string(),
                accounts,
                url: BLANK.to_string(),
                page: Page::Blank,
                nav_seq: 0,
                session_user: None,
                local_storage: HashMap::new(),
                session_storage: HashMap::new(),
                username: String::new(),
                password: String::new(),
                error_banner: None,
                required: Vec::new(),
                menu_open: false,
                pending_submit: false,
                viewport: Viewport::default(),
                headers: Vec::new(),
                routes: Vec::new(),
                captured: Vec::new(),
                page_errors: Vec::new(),
                history: Vec::new(),
                withheld: Vec::new(),
                closed: false,
            })),
        }
    }

    /// Register another account
    #[must_use]
    pub fn with_account(self, credentials: &Credentials) -> Self {
        if let Ok(mut s) = self.state.lock() {
            let _ = s
                .accounts
                .insert(credentials.username.clone(), credentials.password.clone());
        }
        self
    }

    /// Stop rendering elements matching `css` on every page
    pub fn withhold_element(&self, css: &str) -> ProbeResult<()> {
        self.lock()?.withheld.push(css.to_string());
        Ok(())
    }

    /// Queue an uncaught exception as if the page had thrown it
    pub fn inject_page_error(&self, message: impl Into<String>) -> ProbeResult<()> {
        self.lock()?.page_errors.push(message.into());
        Ok(())
    }

    /// Driver calls made so far, oldest first
    pub fn history(&self) -> ProbeResult<Vec<String>> {
        Ok(self.lock()?.history.clone())
    }

    /// Viewport last applied
    pub fn viewport(&self) -> ProbeResult<Viewport> {
        Ok(self.lock()?.viewport)
    }

    /// Extra headers last applied
    pub fn extra_headers(&self) -> ProbeResult<Vec<(String, String)>> {
        Ok(self.lock()?.headers.clone())
    }

    /// Whether a session cookie is set
    pub fn is_authenticated(&self) -> ProbeResult<bool> {
        Ok(self.lock()?.session_user.is_some())
    }

    /// Seed local storage
    pub fn set_local_storage(&self, key: &str, value: &str) -> ProbeResult<()> {
        let _ = self
            .lock()?
            .local_storage
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Seed session storage
    pub fn set_session_storage(&self, key: &str, value: &str) -> ProbeResult<()> {
        let _ = self
            .lock()?
            .session_storage
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Number of (local, session) storage entries
    pub fn storage_len(&self) -> ProbeResult<(usize, usize)> {
        let s = self.lock()?;
        Ok((s.local_storage.len(), s.session_storage.len()))
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, AppState>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::page("simulated app state poisoned"))
    }

    fn record(&self, call: String) -> ProbeResult<MutexGuard<'_, AppState>> {
        let mut s = self.lock()?;
        s.check_open()?;
        s.history.push(call);
        Ok(s)
    }

    fn submit(s: &mut AppState) -> Submit {
        s.required.clear();
        s.error_banner = None;
        if s.username.is_empty() {
            s.required.push("username");
        }
        if s.password.is_empty() {
            s.required.push("password");
        }
        if !s.required.is_empty() {
            return Submit::Nothing;
        }

        let url = format!("{}{}", s.origin, routes::VALIDATE);
        let body = format!(
            "_token=sim&username={}&password={}",
            form_encode(&s.username),
            form_encode(&s.password)
        );
        let timestamp_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut delay = Duration::ZERO;
        let matched: Vec<Route> = s
            .routes
            .iter()
            .filter(|r| r.matches(&HttpMethod::Post, &url))
            .cloned()
            .collect();
        for route in matched {
            delay = delay.max(route.delay.unwrap_or_default());
            s.captured.push(CapturedRequest {
                url: url.clone(),
                method: HttpMethod::Post,
                body: Some(body.clone()),
                alias: route.alias.clone(),
                timestamp_ms,
            });
        }

        let (u, p) = (s.username.clone(), s.password.clone());
        if delay.is_zero() {
            Submit::Immediate(u, p)
        } else {
            s.pending_submit = true;
            Submit::Delayed(u, p, delay, s.nav_seq)
        }
    }
}

fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[async_trait]
impl Driver for SimulatedHrApp {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut s = self.record(format!("navigate:{url}"))?;
        let Some(path) = s.path_of(url).map(str::to_string) else {
            return Err(ProbeError::NavigationError {
                url: url.to_string(),
                message: format!("simulated app only serves {}", s.origin),
            });
        };
        s.go(&path);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let s = self.lock()?;
        s.check_open()?;
        Ok(s.url.clone())
    }

    async fn query(&self, selector: &Selector) -> ProbeResult<Option<ElementSnapshot>> {
        let s = self.lock()?;
        s.check_open()?;
        Ok(s.matching(selector).into_iter().next())
    }

    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        let s = self.lock()?;
        s.check_open()?;
        Ok(s.matching(selector).len())
    }

    async fn clear(&self, selector: &Selector) -> ProbeResult<()> {
        let mut s = self.record(format!("clear:{selector}"))?;
        s.field_mut(selector)?.clear();
        Ok(())
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> ProbeResult<()> {
        let mut s = self.record(format!("type:{selector}"))?;
        s.field_mut(selector)?.push_str(text);
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        let submit = {
            let mut s = self.record(format!("click:{selector}"))?;
            let visible = s.matching(selector).iter().any(|el| el.visible);
            if !visible {
                return Err(ProbeError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            match selector.as_css() {
                Some(selectors::LOGIN_BUTTON) if !s.pending_submit => Self::submit(&mut s),
                Some(selectors::FORGOT_PASSWORD_LINK) => {
                    s.go(routes::PASSWORD_RESET);
                    Submit::Nothing
                }
                Some(selectors::USER_DROPDOWN_TRIGGER) => {
                    s.menu_open = !s.menu_open;
                    Submit::Nothing
                }
                Some(selectors::LOGOUT_LINK) => {
                    s.go(routes::LOGOUT);
                    Submit::Nothing
                }
                _ => Submit::Nothing,
            }
        };

        match submit {
            Submit::Nothing => {}
            Submit::Immediate(u, p) => self.lock()?.complete_login(&u, &p),
            Submit::Delayed(u, p, delay, seq) => {
                let state = Arc::clone(&self.state);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Ok(mut s) = state.lock() {
                        if s.nav_seq == seq && s.pending_submit {
                            s.complete_login(&u, &p);
                        }
                    }
                });
            }
        }
        Ok(())
    }

    async fn clear_cookies(&self) -> ProbeResult<()> {
        self.record("clear_cookies".to_string())?.session_user = None;
        Ok(())
    }

    async fn clear_local_storage(&self) -> ProbeResult<()> {
        self.record("clear_local_storage".to_string())?
            .local_storage
            .clear();
        Ok(())
    }

    async fn clear_session_storage(&self) -> ProbeResult<()> {
        self.record("clear_session_storage".to_string())?
            .session_storage
            .clear();
        Ok(())
    }

    async fn set_viewport(&self, viewport: Viewport) -> ProbeResult<()> {
        self.record(format!("viewport:{}x{}", viewport.width, viewport.height))?
            .viewport = viewport;
        Ok(())
    }

    async fn set_extra_headers(&self, headers: &[(String, String)]) -> ProbeResult<()> {
        self.record("extra_headers".to_string())?.headers = headers.to_vec();
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        let s = self.lock()?;
        s.check_open()?;
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(s.url.as_bytes());
        Ok(Screenshot::new(data, s.viewport.width, s.viewport.height))
    }

    async fn ready_state(&self) -> ProbeResult<String> {
        let s = self.lock()?;
        s.check_open()?;
        Ok(if s.pending_submit { "loading" } else { "complete" }.to_string())
    }

    async fn intercept(&self, route: Route) -> ProbeResult<()> {
        self.record(format!("intercept:{}", route.method.as_str()))?
            .routes
            .push(route);
        Ok(())
    }

    async fn clear_routes(&self) -> ProbeResult<()> {
        let mut s = self.record("clear_routes".to_string())?;
        s.routes.clear();
        s.captured.clear();
        Ok(())
    }

    async fn captured_requests(&self) -> ProbeResult<Vec<CapturedRequest>> {
        Ok(self.lock()?.captured.clone())
    }

    async fn take_page_errors(&self) -> ProbeResult<Vec<String>> {
        Ok(std::mem::take(&mut self.lock()?.page_errors))
    }

    async fn close(&self) -> ProbeResult<()> {
        self.record("close".to_string())?.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::wait_for_request;

    const BASE: &str = "https://hr.test/";

    fn css(s: &str) -> Selector {
        Selector::css(s)
    }

    async fn on_login(app: &SimulatedHrApp) {
        app.navigate("https://hr.test/web/index.php/auth/login")
            .await
            .unwrap();
    }

    async fn submit(app: &SimulatedHrApp, user: &str, pass: &str) {
        app.type_text(&css(selectors::USERNAME_INPUT), user).await.unwrap();
        app.type_text(&css(selectors::PASSWORD_INPUT), pass).await.unwrap();
        app.click(&css(selectors::LOGIN_BUTTON)).await.unwrap();
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_starts_blank() {
            let app = SimulatedHrApp::new(BASE);
            assert_eq!(app.current_url().await.unwrap(), "about:blank");
            assert!(app.query(&css(selectors::LOGIN_CONTAINER)).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_foreign_origin_rejected() {
            let app = SimulatedHrApp::new(BASE);
            let err = app.navigate("https://elsewhere.test/").await.unwrap_err();
            assert!(matches!(err, ProbeError::NavigationError { .. }));
        }

        #[tokio::test]
        async fn test_dashboard_requires_session() {
            let app = SimulatedHrApp::new(BASE);
            app.navigate("https://hr.test/web/index.php/dashboard/index")
                .await
                .unwrap();
            assert!(app.current_url().await.unwrap().ends_with(routes::LOGIN));
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_valid_account_reaches_dashboard() {
            let app = SimulatedHrApp::new(BASE);
            on_login(&app).await;
            submit(&app, "Admin", "admin123").await;
            assert!(app.current_url().await.unwrap().contains(routes::DASHBOARD));
            let header = app.query(&css(selectors::DASHBOARD_HEADER)).await.unwrap().unwrap();
            assert_eq!(header.text, "Dashboard");
            assert!(app.is_authenticated().unwrap());
        }

        #[tokio::test]
        async fn test_only_exact_pair_is_accepted() {
            for (user, pass) in [("Admin", "wrongpass"), ("invaliduser", "admin123"), ("admin", "admin123")] {
                let app = SimulatedHrApp::new(BASE);
                on_login(&app).await;
                submit(&app, user, pass).await;
                assert!(app.current_url().await.unwrap().contains(routes::LOGIN));
                let banner = app.query(&css(selectors::ERROR_MESSAGE)).await.unwrap().unwrap();
                assert_eq!(banner.text, "Invalid credentials");
            }
        }

        #[tokio::test]
        async fn test_blank_fields_flag_required_and_send_nothing() {
            let app = SimulatedHrApp::new(BASE);
            app.intercept(Route::new(HttpMethod::Post, "**/auth/validate").with_alias("r"))
                .await
                .unwrap();
            on_login(&app).await;
            app.click(&css(selectors::LOGIN_BUTTON)).await.unwrap();
            assert_eq!(app.count(&css(selectors::REQUIRED_FIELD_MESSAGE)).await.unwrap(), 2);
            assert!(app.captured_requests().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_credentials_travel_in_body() {
            let app = SimulatedHrApp::new(BASE);
            app.intercept(Route::new(HttpMethod::Post, "**/auth/validate").with_alias("loginRequest"))
                .await
                .unwrap();
            on_login(&app).await;
            submit(&app, "Admin", "admin123").await;
            let req = wait_for_request(&app, "loginRequest", Duration::from_millis(100))
                .await
                .unwrap();
            assert!(!req.url.contains("admin123"));
            assert!(req.body.unwrap().contains("password=admin123"));
        }

        #[tokio::test]
        async fn test_delayed_submit_completes_later() {
            let app = SimulatedHrApp::new(BASE);
            app.intercept(
                Route::new(HttpMethod::Post, "**/auth/validate")
                    .with_delay(Duration::from_millis(50)),
            )
            .await
            .unwrap();
            on_login(&app).await;
            submit(&app, "Admin", "admin123").await;
            assert_eq!(app.ready_state().await.unwrap(), "loading");
            assert!(app.current_url().await.unwrap().contains(routes::LOGIN));
            tokio::time::sleep(Duration::from_millis(150)).await;
            assert!(app.current_url().await.unwrap().contains(routes::DASHBOARD));
            assert_eq!(app.ready_state().await.unwrap(), "complete");
        }

        #[tokio::test]
        async fn test_extra_account() {
            let app = SimulatedHrApp::new(BASE).with_account(&Credentials::new("ess", "ess123"));
            on_login(&app).await;
            submit(&app, "ess", "ess123").await;
            assert!(app.is_authenticated().unwrap());
        }
    }

    mod field_tests {
        use super::*;

        #[tokio::test]
        async fn test_type_appends_and_clear_empties() {
            let app = SimulatedHrApp::new(BASE);
            on_login(&app).await;
            let field = css(selectors::PASSWORD_INPUT);
            app.type_text(&field, "P@ss").await.unwrap();
            app.type_text(&field, "w0rd!@#$%").await.unwrap();
            let el = app.query(&field).await.unwrap().unwrap();
            assert_eq!(el.value.as_deref(), Some("P@ssw0rd!@#$%"));
            app.clear(&field).await.unwrap();
            let el = app.query(&field).await.unwrap().unwrap();
            assert_eq!(el.value.as_deref(), Some(""));
        }

        #[tokio::test]
        async fn test_typing_off_page_is_not_found() {
            let app = SimulatedHrApp::new(BASE);
            let err = app
                .type_text(&css(selectors::USERNAME_INPUT), "x")
                .await
                .unwrap_err();
            assert!(err.is_retryable());
        }

        #[tokio::test]
        async fn test_text_filter_narrows_matches() {
            let app = SimulatedHrApp::new(BASE);
            on_login(&app).await;
            let title = Selector::CssWithText {
                css: selectors::LOGIN_TITLE.to_string(),
                text: "Login".to_string(),
            };
            let wrong = Selector::CssWithText {
                css: selectors::LOGIN_TITLE.to_string(),
                text: "Dashboard".to_string(),
            };
            assert_eq!(app.count(&title).await.unwrap(), 1);
            assert_eq!(app.count(&wrong).await.unwrap(), 0);
        }
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_logout_via_menu() {
            let app = SimulatedHrApp::new(BASE);
            on_login(&app).await;
            submit(&app, "Admin", "admin123").await;
            let link = css(selectors::LOGOUT_LINK);
            assert!(app.click(&link).await.is_err());
            app.click(&css(selectors::USER_DROPDOWN_TRIGGER)).await.unwrap();
            app.click(&link).await.unwrap();
            assert!(app.current_url().await.unwrap().contains(routes::LOGIN));
            assert!(!app.is_authenticated().unwrap());
        }

        #[tokio::test]
        async fn test_clearing_state() {
            let app = SimulatedHrApp::new(BASE);
            app.set_local_storage("k", "v").unwrap();
            app.set_session_storage("k", "v").unwrap();
            app.clear_local_storage().await.unwrap();
            app.clear_session_storage().await.unwrap();
            assert_eq!(app.storage_len().unwrap(), (0, 0));
        }

        #[tokio::test]
        async fn test_dashboard_emits_benign_error() {
            let app = SimulatedHrApp::new(BASE);
            on_login(&app).await;
            submit(&app, "Admin", "admin123").await;
            let errors = app.take_page_errors().await.unwrap();
            assert_eq!(errors, vec![RESIZE_OBSERVER_ERROR.to_string()]);
            assert!(app.take_page_errors().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_closed_browser_rejects_calls() {
            let app = SimulatedHrApp::new(BASE);
            app.close().await.unwrap();
            assert!(app.current_url().await.is_err());
            assert!(app.history().unwrap().contains(&"close".to_string()));
        }

        #[tokio::test]
        async fn test_closed_browser_fails_assertions_immediately() {
            let app = SimulatedHrApp::new(BASE);
            on_login(&app).await;
            app.close().await.unwrap();

            let locator = crate::locator::Locator::new("login container", selectors::LOGIN_CONTAINER)
                .with_timeout(std::time::Duration::from_secs(5));
            let start = std::time::Instant::now();
            let err = crate::assertion::expect_element(
                &app,
                &locator,
                &[crate::assertion::Expectation::BeVisible],
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::BrowserClosed { .. }));
            assert!(!err.is_retryable());
            assert!(start.elapsed() < std::time::Duration::from_secs(1));
        }
    }

    #[test]
    fn test_form_encode() {
        assert_eq!(form_encode("P@ssw0rd!@#$%"), "P%40ssw0rd%21%40%23%24%25");
        assert_eq!(form_encode("a b"), "a+b");
    }
}
