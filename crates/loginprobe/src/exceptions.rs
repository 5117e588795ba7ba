//! Uncaught application exception policy.
//!
//! The demo application throws a couple of harmless errors from its
//! front-end framework. Those are suppressed; anything else the page throws
//! fails the test that was running.

use crate::result::{ProbeError, ProbeResult};

/// Messages that never fail a test
pub const DEFAULT_IGNORED: [&str; 2] = [
    "ResizeObserver loop limit exceeded",
    "Non-Error promise rejection captured",
];

/// Decides which uncaught page errors fail a test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionPolicy {
    ignored: Vec<String>,
}

impl Default for ExceptionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED.iter().map(ToString::to_string).collect())
    }
}

impl ExceptionPolicy {
    /// Policy ignoring every message containing one of `ignored`
    #[must_use]
    pub fn new(ignored: Vec<String>) -> Self {
        Self { ignored }
    }

    /// Whether `message` is benign
    #[must_use]
    pub fn is_ignored(&self, message: &str) -> bool {
        self.ignored.iter().any(|p| message.contains(p.as_str()))
    }

    /// Fail on the first error that is not ignored
    pub fn check(&self, errors: &[String]) -> ProbeResult<()> {
        for message in errors {
            if self.is_ignored(message) {
                tracing::debug!(%message, "suppressed uncaught exception");
                continue;
            }
            return Err(ProbeError::UncaughtException {
                message: message.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_messages_suppressed() {
        let policy = ExceptionPolicy::default();
        let errors = vec![
            "Error: ResizeObserver loop limit exceeded".to_string(),
            "Non-Error promise rejection captured with value: undefined".to_string(),
        ];
        assert!(policy.check(&errors).is_ok());
    }

    #[test]
    fn test_other_messages_fail() {
        let policy = ExceptionPolicy::default();
        let errors = vec![
            "ResizeObserver loop limit exceeded".to_string(),
            "TypeError: cannot read properties of undefined".to_string(),
        ];
        let err = policy.check(&errors).unwrap_err();
        assert!(err.to_string().contains("TypeError"));
    }

    #[test]
    fn test_custom_patterns() {
        let policy = ExceptionPolicy::new(vec!["chunk load".to_string()]);
        assert!(policy.is_ignored("Loading chunk load failed"));
        assert!(!policy.is_ignored("ResizeObserver loop limit exceeded"));
    }
}
