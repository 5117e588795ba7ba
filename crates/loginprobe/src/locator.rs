//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a named selector plus the auto-wait options used when an
//! assertion or an interaction polls for the element. Locators never hold a
//! reference to a live page: they are plain data, resolved against a
//! [`Driver`](crate::Driver) at the moment of use.

use std::fmt;
use std::time::Duration;

/// Default timeout for auto-waiting (10 seconds, the command timeout)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., `[name="username"]`)
    Css(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Convert to a JavaScript expression yielding the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::CssWithText { css, text } => {
                format!("Array.from(document.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?}))")
            }
        }
    }

    /// The CSS string, when this is a plain CSS selector
    #[must_use]
    pub fn as_css(&self) -> Option<&str> {
        match self {
            Self::Css(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "{s}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

/// Locator options for customizing auto-wait behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for auto-waiting
    pub timeout: Duration,
    /// Polling interval for auto-waiting
    pub poll_interval: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

/// A named, auto-waiting handle on one element of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    name: &'static str,
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(name: &'static str, css: impl Into<String>) -> Self {
        Self {
            name,
            selector: Selector::css(css),
            options: LocatorOptions::default(),
        }
    }

    /// Filter by text content
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self { selector, ..self }
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Replace all options
    #[must_use]
    pub const fn with_options(mut self, options: LocatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Human-readable name used in logs and failure messages
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let sel = Selector::css(r#"[name="username"]"#);
            assert_eq!(
                sel.to_query(),
                r#"document.querySelector("[name=\"username\"]")"#
            );
        }

        #[test]
        fn test_css_with_text_query() {
            let sel = Selector::CssWithText {
                css: ".oxd-input-field-error-message".into(),
                text: "Required".into(),
            };
            assert!(sel.to_query().contains("textContent.includes(\"Required\")"));
        }

        #[test]
        fn test_as_css() {
            assert_eq!(Selector::css(".a").as_css(), Some(".a"));
            let with_text = Selector::CssWithText {
                css: "h6".into(),
                text: "Dashboard".into(),
            };
            assert_eq!(with_text.as_css(), None);
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css(".oxd-sidepanel").to_string(), ".oxd-sidepanel");
            let with_text = Selector::CssWithText {
                css: "h6".into(),
                text: "Dashboard".into(),
            };
            assert_eq!(with_text.to_string(), "h6:has-text(\"Dashboard\")");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_default_options() {
            let loc = Locator::new("button", "button");
            assert_eq!(loc.options().timeout, Duration::from_secs(10));
            assert_eq!(loc.options().poll_interval, Duration::from_millis(50));
        }

        #[test]
        fn test_with_text_on_css() {
            let loc = Locator::new("button", "button").with_text("Login");
            assert!(matches!(loc.selector(), Selector::CssWithText { .. }));
        }

        #[test]
        fn test_with_text_keeps_first_filter() {
            let loc = Locator::new("title", "h6").with_text("Login").with_text("ignored");
            assert_eq!(
                loc.selector(),
                &Selector::CssWithText {
                    css: "h6".to_string(),
                    text: "Login".to_string(),
                }
            );
        }

        #[test]
        fn test_with_timeout() {
            let loc = Locator::new("a", "a").with_timeout(Duration::from_millis(250));
            assert_eq!(loc.options().timeout, Duration::from_millis(250));
        }

        #[test]
        fn test_display_includes_name() {
            let loc = Locator::new("side panel", ".oxd-sidepanel");
            assert_eq!(loc.to_string(), "side panel (.oxd-sidepanel)");
        }
    }
}
