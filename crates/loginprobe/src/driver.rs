//! Driver - Abstract Browser Automation Trait
//!
//! Every page object, command and assertion in this crate talks to the
//! browser through [`Driver`]. Swapping the implementation swaps the
//! browser:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Driver (async trait)                                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐      ┌──────────────────────────┐  │
//! │  │  ChromiumDriver      │      │  SimulatedHrApp          │  │
//! │  │  (feature "browser") │      │  (in-memory login app)   │  │
//! │  │  CDP via chromiumoxide│     │  unit + suite tests      │  │
//! │  └──────────────────────┘      └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods take `&self`; implementations keep their mutable state behind
//! locks so one driver can be shared by a page object and a command set
//! within the same test.

use crate::locator::Selector;
use crate::network::{CapturedRequest, Route};
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Point-in-time read of one DOM element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// Lower-case tag name
    pub tag_name: String,
    /// Whether the element is rendered with a non-empty box
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Current `value` for form controls
    pub value: Option<String>,
    /// Attributes as rendered
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ElementSnapshot {
    /// Create a visible element with no text
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            visible: true,
            ..Self::default()
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Look up an attribute
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Timestamp when screenshot was taken
    pub timestamp: std::time::SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot is valid (has data)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - real browser over CDP (feature `browser`)
/// - `SimulatedHrApp` - in-memory model of the login page and dashboard
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to an absolute URL and wait for the load event
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Current location
    async fn current_url(&self) -> ProbeResult<String>;

    /// Read the first element matching `selector`, if any
    async fn query(&self, selector: &Selector) -> ProbeResult<Option<ElementSnapshot>>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &Selector) -> ProbeResult<usize>;

    /// Clear a form control
    async fn clear(&self, selector: &Selector) -> ProbeResult<()>;

    /// Type text into a form control, appending to its value
    async fn type_text(&self, selector: &Selector, text: &str) -> ProbeResult<()>;

    /// Click an element
    async fn click(&self, selector: &Selector) -> ProbeResult<()>;

    /// Remove every cookie visible to the browser
    async fn clear_cookies(&self) -> ProbeResult<()>;

    /// Clear `localStorage` for the current origin
    async fn clear_local_storage(&self) -> ProbeResult<()>;

    /// Clear `sessionStorage` for the current origin
    async fn clear_session_storage(&self) -> ProbeResult<()>;

    /// Resize the viewport
    async fn set_viewport(&self, viewport: Viewport) -> ProbeResult<()>;

    /// Headers added to every outgoing request
    async fn set_extra_headers(&self, headers: &[(String, String)]) -> ProbeResult<()>;

    /// Capture the visible page as PNG
    async fn screenshot(&self) -> ProbeResult<Screenshot>;

    /// `document.readyState`
    async fn ready_state(&self) -> ProbeResult<String>;

    /// Register a network route; matching requests are captured and may be delayed
    async fn intercept(&self, route: Route) -> ProbeResult<()>;

    /// Drop every registered route and the requests it captured
    async fn clear_routes(&self) -> ProbeResult<()>;

    /// Requests captured by registered routes, oldest first
    async fn captured_requests(&self) -> ProbeResult<Vec<CapturedRequest>>;

    /// Drain uncaught exceptions raised by the page since the last call
    async fn take_page_errors(&self) -> ProbeResult<Vec<String>>;

    /// Close the browser
    async fn close(&self) -> ProbeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_snapshot_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let el = ElementSnapshot::new("input")
                .with_value("Admin")
                .with_attribute("placeholder", "Username");
            assert!(el.visible);
            assert_eq!(el.value.as_deref(), Some("Admin"));
            assert_eq!(el.attribute("placeholder"), Some("Username"));
            assert_eq!(el.attribute("type"), None);
        }

        #[test]
        fn test_deserialize_from_page_json() {
            let json = serde_json::json!({
                "tagName": "h6",
                "visible": true,
                "text": "Dashboard",
                "value": null,
                "attributes": {"class": "oxd-text"}
            });
            let el: ElementSnapshot = serde_json::from_value(json).unwrap();
            assert_eq!(el.tag_name, "h6");
            assert_eq!(el.text, "Dashboard");
            assert!(el.value.is_none());
        }
    }

    mod screenshot_tests {
        use super::*;

        #[test]
        fn test_screenshot_is_valid() {
            assert!(Screenshot::new(vec![1, 2, 3], 100, 100).is_valid());
            assert!(!Screenshot::new(vec![], 100, 100).is_valid());
            assert!(!Screenshot::new(vec![1], 0, 100).is_valid());
        }

        #[test]
        fn test_screenshot_size_bytes() {
            assert_eq!(Screenshot::new(vec![0; 1024], 10, 10).size_bytes(), 1024);
        }
    }

    #[test]
    fn test_viewport_default_matches_runner_default() {
        assert_eq!(Viewport::default(), Viewport::new(1280, 720));
    }
}
