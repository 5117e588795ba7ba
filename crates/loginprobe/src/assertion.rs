//! Auto-retrying assertions for eventually-consistent UI state.
//!
//! Every element and location check in the crate goes through [`poll_until`]:
//! the check runs, and until it passes (or the locator's timeout elapses) the
//! engine sleeps for the poll interval and tries again. Transient driver
//! errors (element missing, page mid-navigation) count as a failed check
//! rather than aborting the wait.
//!
//! The page object and the command library share this module, so a given
//! check has exactly one definition of "passed".

use crate::driver::{Driver, ElementSnapshot};
use crate::locator::{Locator, LocatorOptions};
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::future::Future;
use std::time::Instant;

/// Result of one check inside a polling assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionCheck<T> {
    /// Assertion passed, carrying the observed value
    Pass(T),
    /// Assertion failed with message
    Fail(String),
}

impl<T> AssertionCheck<T> {
    /// Check if the result is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    /// Check if the result is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Poll `check` until it passes or `options.timeout` elapses.
///
/// Non-retryable driver errors abort immediately. On timeout the last
/// failure message is reported as [`ProbeError::AssertionFailed`].
pub async fn poll_until<T, F, Fut>(
    options: &LocatorOptions,
    description: &str,
    mut check: F,
) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<AssertionCheck<T>>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let last_error = match check().await {
            Ok(AssertionCheck::Pass(value)) => {
                tracing::trace!(description, attempts, "assertion passed");
                return Ok(value);
            }
            Ok(AssertionCheck::Fail(msg)) => msg,
            Err(e) if e.is_retryable() => e.to_string(),
            Err(e) => return Err(e),
        };

        if start.elapsed() >= options.timeout {
            tracing::debug!(description, attempts, %last_error, "assertion timed out");
            return Err(ProbeError::assertion(format!(
                "Timed out retrying after {}ms: {description}: {last_error}",
                options.timeout.as_millis()
            )));
        }

        tokio::time::sleep(options.poll_interval).await;
    }
}

/// One condition on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Element is present in the DOM
    Exist,
    /// Element is present and rendered
    BeVisible,
    /// Text content contains the string
    ContainText(String),
    /// Attribute has exactly the value
    HaveAttribute {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Form value equals the string
    HaveValue(String),
    /// Form value is empty
    BeEmpty,
}

impl Expectation {
    /// Text containment
    #[must_use]
    pub fn contain_text(text: impl Into<String>) -> Self {
        Self::ContainText(text.into())
    }

    /// Attribute equality
    #[must_use]
    pub fn have_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::HaveAttribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value equality
    #[must_use]
    pub fn have_value(value: impl Into<String>) -> Self {
        Self::HaveValue(value.into())
    }

    fn check(&self, el: &ElementSnapshot) -> Result<(), String> {
        match self {
            Self::Exist => Ok(()),
            Self::BeVisible if el.visible => Ok(()),
            Self::BeVisible => Err("element is not visible".to_string()),
            Self::ContainText(text) if el.text.contains(text.as_str()) => Ok(()),
            Self::ContainText(text) => Err(format!(
                "expected text to contain {text:?}, but the text was {:?}",
                el.text
            )),
            Self::HaveAttribute { name, value } => match el.attribute(name) {
                Some(actual) if actual == value.as_str() => Ok(()),
                Some(actual) => Err(format!(
                    "expected attribute {name} to be {value:?}, but it was {actual:?}"
                )),
                None => Err(format!("expected attribute {name}, but it is missing")),
            },
            Self::HaveValue(value) => match el.value.as_deref() {
                Some(actual) if actual == value.as_str() => Ok(()),
                actual => Err(format!(
                    "expected value {value:?}, but it was {:?}",
                    actual.unwrap_or_default()
                )),
            },
            Self::BeEmpty => match el.value.as_deref() {
                None | Some("") => Ok(()),
                Some(actual) => Err(format!("expected empty value, but it was {actual:?}")),
            },
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exist => write!(f, "exist"),
            Self::BeVisible => write!(f, "be.visible"),
            Self::ContainText(t) => write!(f, "contain {t:?}"),
            Self::HaveAttribute { name, value } => write!(f, "have.attr {name}={value:?}"),
            Self::HaveValue(v) => write!(f, "have.value {v:?}"),
            Self::BeEmpty => write!(f, "be.empty"),
        }
    }
}

/// Evaluate a set of expectations against one snapshot
#[must_use]
pub fn evaluate(
    el: Option<ElementSnapshot>,
    expectations: &[Expectation],
) -> AssertionCheck<ElementSnapshot> {
    let Some(el) = el else {
        return AssertionCheck::Fail("element not found".to_string());
    };
    for expectation in expectations {
        if let Err(msg) = expectation.check(&el) {
            return AssertionCheck::Fail(msg);
        }
    }
    AssertionCheck::Pass(el)
}

/// Wait until the element behind `locator` satisfies every expectation.
///
/// Returns the snapshot that passed.
pub async fn expect_element<D: Driver + ?Sized>(
    driver: &D,
    locator: &Locator,
    expectations: &[Expectation],
) -> ProbeResult<ElementSnapshot> {
    let description = describe(locator, expectations);
    poll_until(locator.options(), &description, move || async move {
        let snapshot = driver.query(locator.selector()).await?;
        Ok(evaluate(snapshot, expectations))
    })
    .await
}

/// Wait until the current location contains `fragment`
pub async fn expect_url_includes<D: Driver + ?Sized>(
    driver: &D,
    fragment: &str,
    options: &LocatorOptions,
) -> ProbeResult<String> {
    let description = format!("url to include {fragment:?}");
    poll_until(options, &description, move || async move {
        let url = driver.current_url().await?;
        if url.contains(fragment) {
            Ok(AssertionCheck::Pass(url))
        } else {
            Ok(AssertionCheck::Fail(format!("location was {url:?}")))
        }
    })
    .await
}

/// Immediate check that `haystack` does not contain `needle`
pub fn expect_not_contains(what: &str, haystack: &str, needle: &str) -> ProbeResult<()> {
    if haystack.contains(needle) {
        Err(ProbeError::assertion(format!(
            "expected {what} not to contain {needle:?}"
        )))
    } else {
        Ok(())
    }
}

/// Immediate equality check on a value already read from the page
pub fn expect_eq<T: PartialEq + std::fmt::Debug + ?Sized>(
    what: &str,
    actual: &T,
    expected: &T,
) -> ProbeResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ProbeError::assertion(format!(
            "expected {what} to equal {expected:?}, got {actual:?}"
        )))
    }
}

fn describe(locator: &Locator, expectations: &[Expectation]) -> String {
    let parts: Vec<String> = expectations.iter().map(ToString::to_string).collect();
    format!("expected {locator} to {}", parts.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast() -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(5),
        }
    }

    mod evaluate_tests {
        use super::*;

        #[test]
        fn test_missing_element_fails() {
            assert!(evaluate(None, &[Expectation::Exist]).is_fail());
        }

        #[test]
        fn test_all_expectations_must_hold() {
            let el = ElementSnapshot::new("h6").with_text("Dashboard");
            let ok = evaluate(
                Some(el.clone()),
                &[Expectation::BeVisible, Expectation::contain_text("Dash")],
            );
            assert!(ok.is_pass());

            let hidden = el.with_visible(false);
            let failed = evaluate(
                Some(hidden),
                &[Expectation::contain_text("Dash"), Expectation::BeVisible],
            );
            assert_eq!(failed, AssertionCheck::Fail("element is not visible".to_string()));
        }

        #[test]
        fn test_have_attribute() {
            let el = ElementSnapshot::new("input").with_attribute("type", "password");
            assert!(evaluate(Some(el.clone()), &[Expectation::have_attribute("type", "password")]).is_pass());
            assert!(evaluate(Some(el.clone()), &[Expectation::have_attribute("type", "text")]).is_fail());
            assert!(evaluate(Some(el), &[Expectation::have_attribute("name", "x")]).is_fail());
        }

        #[test]
        fn test_value_and_empty() {
            let el = ElementSnapshot::new("input").with_value("P@ssw0rd!@#$%");
            assert!(evaluate(Some(el.clone()), &[Expectation::have_value("P@ssw0rd!@#$%")]).is_pass());
            assert!(evaluate(Some(el), &[Expectation::BeEmpty]).is_fail());
            let blank = ElementSnapshot::new("input").with_value("");
            assert!(evaluate(Some(blank), &[Expectation::BeEmpty]).is_pass());
        }

        #[test]
        fn test_expect_eq() {
            assert!(expect_eq("username", "Admin", "Admin").is_ok());
            let err = expect_eq("password", "", "secret").unwrap_err();
            assert!(err.to_string().contains("expected password to equal \"secret\""));
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_passes_eventually() {
            let calls = AtomicU32::new(0);
            let counter = &calls;
            let value = poll_until(&fast(), "third time lucky", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) >= 2 {
                    Ok(AssertionCheck::Pass(42))
                } else {
                    Ok(AssertionCheck::Fail("not yet".to_string()))
                }
            })
            .await
            .unwrap();
            assert_eq!(value, 42);
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_times_out_with_last_message() {
            let err = poll_until::<(), _, _>(&fast(), "never", || async {
                Ok(AssertionCheck::Fail("still hidden".to_string()))
            })
            .await
            .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("Timed out retrying after 100ms"));
            assert!(msg.contains("still hidden"));
        }

        #[tokio::test]
        async fn test_retryable_errors_are_absorbed() {
            let calls = AtomicU32::new(0);
            let counter = &calls;
            let result = poll_until(&fast(), "recovers", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ProbeError::ElementNotFound {
                        selector: ".x".into(),
                    })
                } else {
                    Ok(AssertionCheck::Pass(()))
                }
            })
            .await;
            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn test_fatal_errors_abort() {
            let calls = AtomicU32::new(0);
            let counter = &calls;
            let err = poll_until::<(), _, _>(&fast(), "aborts", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ProbeError::BrowserClosed {
                    operation: "query".into(),
                })
            })
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::BrowserClosed { .. }));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_expect_not_contains() {
        assert!(expect_not_contains("url", "https://h/auth/validate", "admin123").is_ok());
        assert!(expect_not_contains("url", "https://h/?p=admin123", "admin123").is_err());
    }

    #[test]
    fn test_describe_joins_expectations() {
        let loc = Locator::new("dashboard header", ".oxd-topbar-header-breadcrumb h6");
        let d = describe(&loc, &[Expectation::BeVisible, Expectation::contain_text("Dashboard")]);
        assert!(d.contains("be.visible and contain \"Dashboard\""));
    }
}
