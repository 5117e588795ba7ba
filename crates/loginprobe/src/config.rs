//! Runner configuration (`loginprobe.yaml`).
//!
//! Every field has a default matching the demo-site setup, so an empty file
//! (or no file at one) is a valid configuration. The loaded value is passed
//! into the session and the runner; nothing here is global.

use crate::driver::Viewport;
use crate::exceptions::{ExceptionPolicy, DEFAULT_IGNORED};
use crate::locator::{LocatorOptions, DEFAULT_POLL_INTERVAL_MS};
use crate::network::UrlPattern;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default application under test
pub const DEFAULT_BASE_URL: &str = "https://opensource-demo.orangehrmlive.com/";

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "loginprobe.yaml";

/// Upper bound on run-level retries in either mode
pub const MAX_RETRIES: u32 = 10;

/// Interactive or batch execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Batch, headless, retries on
    #[default]
    Run,
    /// Interactive, no retries
    Open,
}

impl RunMode {
    /// Parse from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "run" => Some(Self::Run),
            "open" => Some(Self::Open),
            _ => None,
        }
    }
}

/// Wait budgets, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element and URL assertions
    pub command_ms: u64,
    /// Waiting for an intercepted request to be sent
    pub request_ms: u64,
    /// Waiting for a response
    pub response_ms: u64,
    /// Page load
    pub page_load_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command_ms: 10_000,
            request_ms: 10_000,
            response_ms: 10_000,
            page_load_ms: 30_000,
        }
    }
}

/// Run-level retries per mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryModes {
    /// Extra attempts in run mode
    pub run_mode: u32,
    /// Extra attempts in open mode
    pub open_mode: u32,
}

impl Default for RetryModes {
    fn default() -> Self {
        Self {
            run_mode: 2,
            open_mode: 0,
        }
    }
}

/// JSON report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Output directory
    pub report_dir: PathBuf,
    /// Write `report.json` instead of a timestamped name
    pub overwrite: bool,
    /// Emit JSON
    pub json: bool,
    /// Emit HTML (not supported; rejected by validation)
    pub html: bool,
    /// chrono format for report file names
    pub timestamp_format: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("loginprobe/reports"),
            overwrite: false,
            json: true,
            html: false,
            timestamp_format: "%m%d%Y_%H%M%S".to_string(),
        }
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root of the application under test
    pub base_url: String,
    /// Viewport applied before each test
    pub viewport: Viewport,
    /// Wait budgets
    pub timeouts: Timeouts,
    /// Run-level retries
    pub retries: RetryModes,
    /// Keep recorded videos
    pub video: bool,
    /// Where recorded videos live
    pub videos_folder: PathBuf,
    /// Where screenshots are written
    pub screenshots_folder: PathBuf,
    /// Capture a screenshot when a test attempt fails
    pub screenshot_on_run_failure: bool,
    /// Glob over scenario ids selecting what runs
    pub spec_pattern: String,
    /// Where `credentials.json` is looked up
    pub fixtures_folder: PathBuf,
    /// Leave same-origin policy on
    pub chrome_web_security: bool,
    /// Run the browser without a window
    pub headless: bool,
    /// Explicit browser binary
    pub chromium_path: Option<PathBuf>,
    /// `Accept-Language` header sent with every request
    pub accept_language: String,
    /// Uncaught exception substrings that do not fail a test
    pub ignored_exceptions: Vec<String>,
    /// Report settings
    pub reporter: ReporterConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            viewport: Viewport::default(),
            timeouts: Timeouts::default(),
            retries: RetryModes::default(),
            video: true,
            videos_folder: PathBuf::from("loginprobe/videos"),
            screenshots_folder: PathBuf::from("loginprobe/screenshots"),
            screenshot_on_run_failure: true,
            spec_pattern: "login/*".to_string(),
            fixtures_folder: PathBuf::from("fixtures"),
            chrome_web_security: false,
            headless: true,
            chromium_path: None,
            accept_language: "en-US,en;q=0.9".to_string(),
            ignored_exceptions: DEFAULT_IGNORED.iter().map(ToString::to_string).collect(),
            reporter: ReporterConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Load and validate a YAML file
    pub fn from_path(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must be http(s), got {:?}",
                self.base_url
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ProbeError::config("viewport dimensions must be non-zero"));
        }
        let t = &self.timeouts;
        if t.command_ms == 0 || t.request_ms == 0 || t.response_ms == 0 || t.page_load_ms == 0 {
            return Err(ProbeError::config("timeouts must be non-zero"));
        }
        if self.retries.run_mode > MAX_RETRIES || self.retries.open_mode > MAX_RETRIES {
            return Err(ProbeError::config(format!(
                "retries must be at most {MAX_RETRIES} per mode"
            )));
        }
        if self.reporter.html {
            return Err(ProbeError::config("HTML reports are not supported; set reporter.html: false"));
        }
        if self.reporter.timestamp_format.trim().is_empty() {
            return Err(ProbeError::config("reporter.timestamp_format must not be empty"));
        }
        crate::reporter::format_timestamp(chrono::Utc::now(), &self.reporter.timestamp_format)?;
        Ok(())
    }

    /// Override the base URL, re-validating
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> ProbeResult<Self> {
        self.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    /// Absolute URL for an application path
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Run-level retries for a mode
    #[must_use]
    pub const fn retries_for(&self, mode: RunMode) -> u32 {
        match mode {
            RunMode::Run => self.retries.run_mode,
            RunMode::Open => self.retries.open_mode,
        }
    }

    /// Wait options for element and URL assertions
    #[must_use]
    pub const fn command_options(&self) -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(self.timeouts.command_ms),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Wait options for an intercepted request to be sent
    #[must_use]
    pub const fn request_options(&self) -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(self.timeouts.request_ms),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Wait options for the application to react to a sent request
    #[must_use]
    pub const fn response_options(&self) -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(self.timeouts.response_ms),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Wait options for page loads
    #[must_use]
    pub const fn page_load_options(&self) -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(self.timeouts.page_load_ms),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Exception policy built from `ignored_exceptions`
    #[must_use]
    pub fn exception_policy(&self) -> ExceptionPolicy {
        ExceptionPolicy::new(self.ignored_exceptions.clone())
    }

    /// Whether a scenario id is selected by `spec_pattern`
    #[must_use]
    pub fn selects(&self, scenario_id: &str) -> bool {
        UrlPattern::Glob(self.spec_pattern.clone()).matches(scenario_id)
    }

    /// Headers applied to every request
    #[must_use]
    pub fn extra_headers(&self) -> Vec<(String, String)> {
        vec![("Accept-Language".to_string(), self.accept_language.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults_match_demo_setup() {
            let c = SuiteConfig::default();
            assert_eq!(c.base_url, DEFAULT_BASE_URL);
            assert_eq!(c.viewport, Viewport::new(1280, 720));
            assert_eq!(c.timeouts.command_ms, 10_000);
            assert_eq!(c.timeouts.page_load_ms, 30_000);
            assert_eq!(c.retries_for(RunMode::Run), 2);
            assert_eq!(c.retries_for(RunMode::Open), 0);
            assert!(c.video);
            assert!(!c.chrome_web_security);
            assert!(!c.reporter.overwrite);
            assert_eq!(c.reporter.timestamp_format, "%m%d%Y_%H%M%S");
            assert!(c.validate().is_ok());
        }

        #[test]
        fn test_empty_yaml_is_default() {
            assert_eq!(SuiteConfig::from_yaml_str("").unwrap(), SuiteConfig::default());
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let c = SuiteConfig::from_yaml_str(
                "base_url: http://localhost:8080\ntimeouts:\n  command_ms: 500\n",
            )
            .unwrap();
            assert_eq!(c.base_url, "http://localhost:8080");
            assert_eq!(c.timeouts.command_ms, 500);
            assert_eq!(c.timeouts.page_load_ms, 30_000);
            assert_eq!(c.viewport.width, 1280);
        }

        #[test]
        fn test_yaml_roundtrip() {
            let c = SuiteConfig::default();
            let back = SuiteConfig::from_yaml_str(&c.to_yaml().unwrap()).unwrap();
            assert_eq!(back, c);
        }

        #[test]
        fn test_from_path() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(CONFIG_FILE_NAME);
            std::fs::write(&path, "headless: false\n").unwrap();
            let c = SuiteConfig::from_path(&path).unwrap();
            assert!(!c.headless);
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = SuiteConfig::from_path(Path::new("/nonexistent/loginprobe.yaml")).unwrap_err();
            assert!(err.is_fatal());
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_rejects_non_http_base_url() {
            assert!(SuiteConfig::from_yaml_str("base_url: ftp://x\n").is_err());
        }

        #[test]
        fn test_rejects_zero_viewport() {
            assert!(SuiteConfig::from_yaml_str("viewport:\n  width: 0\n  height: 720\n").is_err());
        }

        #[test]
        fn test_rejects_unbounded_retries() {
            let err = SuiteConfig::from_yaml_str("retries:\n  run_mode: 4294967295\n").unwrap_err();
            assert!(err.to_string().contains("retries"));
            assert!(SuiteConfig::from_yaml_str("retries:\n  open_mode: 10\n").is_ok());
        }

        #[test]
        fn test_rejects_html_reporter() {
            assert!(SuiteConfig::from_yaml_str("reporter:\n  html: true\n").is_err());
        }

        #[test]
        fn test_rejects_bad_timestamp_format() {
            assert!(SuiteConfig::from_yaml_str("reporter:\n  timestamp_format: \"%Q\"\n").is_err());
        }

        #[test]
        fn test_with_base_url_revalidates() {
            assert!(SuiteConfig::default().with_base_url("nope").is_err());
            assert!(SuiteConfig::default().with_base_url("http://127.0.0.1").is_ok());
        }
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_resolve_url() {
            let c = SuiteConfig::default();
            assert_eq!(
                c.resolve_url("/web/index.php/auth/login"),
                "https://opensource-demo.orangehrmlive.com/web/index.php/auth/login"
            );
            assert_eq!(c.resolve_url("http://other/x"), "http://other/x");
        }

        #[test]
        fn test_selects() {
            let mut c = SuiteConfig::default();
            assert!(c.selects("login/positive/valid-admin"));
            c.spec_pattern = "login/security/*".to_string();
            assert!(c.selects("login/security/password-masked"));
            assert!(!c.selects("login/positive/valid-admin"));
        }

        #[test]
        fn test_selects_by_suffix() {
            let mut c = SuiteConfig::default();
            c.spec_pattern = "login/*credentials".to_string();
            assert!(c.selects("login/positive/valid-credentials"));
            assert!(!c.selects("login/security/credentials-not-in-url"));
            c.spec_pattern = "login/*e".to_string();
            assert!(c.selects("login/negative/invalid-username"));
            assert!(!c.selects("login/ui/page-elements"));
        }

        #[test]
        fn test_mode_parse() {
            assert_eq!(RunMode::parse("OPEN"), Some(RunMode::Open));
            assert_eq!(RunMode::parse("watch"), None);
        }

        #[test]
        fn test_command_options() {
            let c = SuiteConfig::default();
            assert_eq!(c.command_options().timeout, Duration::from_secs(10));
            assert_eq!(c.page_load_options().timeout, Duration::from_secs(30));
        }

        #[test]
        fn test_each_timeout_feeds_its_own_options() {
            let c = SuiteConfig::from_yaml_str(
                "timeouts:\n  command_ms: 1000\n  request_ms: 2000\n  response_ms: 3000\n  page_load_ms: 4000\n",
            )
            .unwrap();
            assert_eq!(c.command_options().timeout, Duration::from_secs(1));
            assert_eq!(c.request_options().timeout, Duration::from_secs(2));
            assert_eq!(c.response_options().timeout, Duration::from_secs(3));
            assert_eq!(c.page_load_options().timeout, Duration::from_secs(4));
        }
    }
}
