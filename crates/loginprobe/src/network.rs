//! Network routes and request capture.
//!
//! A [`Route`] names the requests a test cares about (method plus URL
//! pattern) and optionally delays them before they reach the server. Every
//! matching request is recorded as a [`CapturedRequest`] that tests read back
//! through [`wait_for_request`].

use crate::driver::Driver;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// HTTP method for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// Any method
    Any,
}

impl HttpMethod {
    /// Parse from string
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            _ => Self::Any,
        }
    }

    /// Convert to string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Any => "*",
        }
    }

    /// Check if this method matches another
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        *self == Self::Any || *other == Self::Any || self == other
    }
}

/// URL pattern for matching requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/auth/validate")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Glob(pattern) => Self::glob_matches(pattern, url),
            Self::Any => true,
        }
    }

    /// `*` matches any run of characters; everything else is literal.
    /// The first literal is anchored at the start and the last at the end.
    fn glob_matches(pattern: &str, url: &str) -> bool {
        let parts: Vec<&str> = pattern.split('*').collect();
        let Some((first, rest)) = parts.split_first() else {
            return false;
        };
        let Some((last, middle)) = rest.split_last() else {
            return pattern == url;
        };
        let Some(mut remaining) = url.strip_prefix(first) else {
            return false;
        };
        for part in middle.iter().filter(|p| !p.is_empty()) {
            match remaining.find(part) {
                Some(found) => remaining = &remaining[found + part.len()..],
                None => return false,
            }
        }
        remaining.ends_with(last)
    }
}

/// A request the driver should watch (and optionally hold back)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Method to match
    pub method: HttpMethod,
    /// URL pattern to match
    pub pattern: UrlPattern,
    /// Name tests use to look the capture up
    pub alias: Option<String>,
    /// Delay applied before the request continues
    pub delay: Option<Duration>,
}

impl Route {
    /// Watch `method` requests whose URL matches a glob
    #[must_use]
    pub fn new(method: HttpMethod, glob: impl Into<String>) -> Self {
        Self {
            method,
            pattern: UrlPattern::Glob(glob.into()),
            alias: None,
            delay: None,
        }
    }

    /// Name the route
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Hold matching requests back for `delay`
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Whether a request is covered by this route
    #[must_use]
    pub fn matches(&self, method: &HttpMethod, url: &str) -> bool {
        self.method.matches(method) && self.pattern.matches(url)
    }
}

/// A captured network request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request body, when the driver can see it
    pub body: Option<String>,
    /// Alias of the route that captured it
    pub alias: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// Poll the driver until a request captured under `alias` shows up.
///
/// Returns the oldest matching capture. Fails with [`ProbeError::Timeout`]
/// when nothing arrives within `timeout`.
pub async fn wait_for_request<D: Driver + ?Sized>(
    driver: &D,
    alias: &str,
    timeout: Duration,
) -> ProbeResult<CapturedRequest> {
    let start = Instant::now();
    loop {
        let captured = driver.captured_requests().await?;
        if let Some(req) = captured
            .into_iter()
            .find(|r| r.alias.as_deref() == Some(alias))
        {
            tracing::debug!(alias, url = %req.url, "request captured");
            return Ok(req);
        }
        if start.elapsed() >= timeout {
            return Err(ProbeError::Timeout {
                ms: timeout.as_millis() as u64,
                waited_for: format!("request @{alias}"),
            });
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
