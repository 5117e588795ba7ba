//! Result and error types for loginprobe.

use thiserror::Error;

/// Result type for loginprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the application under test
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page-level driver error (evaluation, protocol, detached context)
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched a selector
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// A wait elapsed without the awaited event occurring
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// `retry_action` exhausted its attempt budget
    #[error("Max retries exceeded after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last failure
        last_error: String,
    },

    /// Uncaught exception raised by the application under test
    #[error("Uncaught application exception: {message}")]
    UncaughtException {
        /// Exception message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Fixture could not be loaded or is malformed
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Runner configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// The browser was closed; nothing further can be driven
    #[error("Browser closed: cannot {operation}")]
    BrowserClosed {
        /// Operation attempted
        operation: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::FixtureError {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Errors a polling assertion may absorb and try again.
    ///
    /// A missing element or a page caught mid-navigation usually resolves on
    /// the next poll; anything else is surfaced immediately.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::PageError { .. } | Self::NavigationError { .. }
        )
    }

    /// Errors that abort the entire run rather than a single test
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FixtureError { .. }
                | Self::ConfigError { .. }
                | Self::BrowserLaunchError { .. }
                | Self::Yaml(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_message() {
        let err = ProbeError::RetriesExhausted {
            attempts: 3,
            last_error: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Max retries exceeded"));
        assert!(msg.contains('3'));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ProbeError::ElementNotFound {
            selector: ".x".into()
        }
        .is_retryable());
        assert!(ProbeError::page("context destroyed").is_retryable());
        assert!(!ProbeError::assertion("nope").is_retryable());
        assert!(!ProbeError::fixture("bad").is_retryable());
        assert!(!ProbeError::BrowserClosed {
            operation: "query".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ProbeError::fixture("missing validCredentials").is_fatal());
        assert!(ProbeError::config("viewport").is_fatal());
        assert!(!ProbeError::assertion("x").is_fatal());
        assert!(!ProbeError::UncaughtException {
            message: "TypeError".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ProbeError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
