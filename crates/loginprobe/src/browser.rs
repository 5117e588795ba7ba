//! Chromium driver over the Chrome DevTools Protocol.
//!
//! Element reads are a single `Runtime.evaluate` returning a JSON snapshot,
//! so one poll of an assertion is one round trip. Typing goes through
//! `Input.insertText` after focusing the element, which is what the
//! application's input handlers expect from a real keyboard.
//!
//! Three tokio tasks run beside the page: the CDP handler, a
//! `Fetch.requestPaused` listener (capture, optional delay, continue) and a
//! `Runtime.exceptionThrown` listener feeding uncaught page errors.

use crate::config::SuiteConfig;
use crate::driver::{Driver, ElementSnapshot, Screenshot, Viewport};
use crate::locator::Selector;
use crate::network::{CapturedRequest, HttpMethod, Route};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::network::{
    ClearBrowserCookiesParams, Headers, PostDataEntry, SetExtraHttpHeadersParams,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::cdp::js_protocol::runtime::EventExceptionThrown;
use chromiumoxide::page::Page as CdpPage;
use base64::Engine;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// State shared with the listener tasks
#[derive(Debug, Default)]
struct Shared {
    routes: Vec<Route>,
    captured: Vec<CapturedRequest>,
    page_errors: Vec<String>,
}

fn lock(shared: &Mutex<Shared>) -> ProbeResult<MutexGuard<'_, Shared>> {
    shared
        .lock()
        .map_err(|_| ProbeError::page("driver state poisoned"))
}

/// Driver backed by a launched Chromium
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: tokio::sync::Mutex<CdpBrowser>,
    page: CdpPage,
    shared: Arc<Mutex<Shared>>,
    fetch_enabled: AtomicBool,
    page_load_timeout: Duration,
    tasks: Vec<JoinHandle<()>>,
}

impl ChromiumDriver {
    /// Launch Chromium according to `config` and open one blank page
    pub async fn launch(config: &SuiteConfig) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport.width, config.viewport.height)
            .no_sandbox();
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.chrome_web_security {
            builder = builder.arg("--disable-web-security");
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunchError { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        let mut tasks = vec![tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        })];

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;

        let shared = Arc::new(Mutex::new(Shared::default()));
        tasks.push(spawn_exception_listener(&page, Arc::clone(&shared)).await?);
        tasks.push(spawn_request_listener(&page, Arc::clone(&shared)).await?);

        tracing::info!(
            headless = config.headless,
            width = config.viewport.width,
            height = config.viewport.height,
            "chromium launched"
        );
        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            shared,
            fetch_enabled: AtomicBool::new(false),
            page_load_timeout: config.page_load_options().timeout,
            tasks,
        })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, expr: String) -> ProbeResult<T> {
        self.page
            .evaluate(expr)
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?
            .into_value()
            .map_err(|e| ProbeError::page(e.to_string()))
    }

    /// Run `body` against the element (`el`); `false` when nothing matched
    async fn with_element(&self, selector: &Selector, body: &str) -> ProbeResult<()> {
        let found: bool = self
            .eval(format!(
                "(() => {{ const el = {}; if (!el) return false; {body} return true; }})()",
                selector.to_query()
            ))
            .await?;
        if found {
            Ok(())
        } else {
            Err(ProbeError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }
}

async fn spawn_exception_listener(
    page: &CdpPage,
    shared: Arc<Mutex<Shared>>,
) -> ProbeResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventExceptionThrown>()
        .await
        .map_err(|e| ProbeError::page(e.to_string()))?;
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let details = &event.exception_details;
            let message = details
                .exception
                .as_ref()
                .and_then(|ex| ex.description.clone())
                .unwrap_or_else(|| details.text.clone());
            tracing::debug!(%message, "uncaught page exception");
            if let Ok(mut s) = shared.lock() {
                s.page_errors.push(message);
            }
        }
    }))
}

async fn spawn_request_listener(
    page: &CdpPage,
    shared: Arc<Mutex<Shared>>,
) -> ProbeResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| ProbeError::page(e.to_string()))?;
    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let url = event.request.url.clone();
            let method = HttpMethod::parse(&event.request.method);
            let body = post_data_body(event.request.post_data_entries.as_deref());
            let delay = match shared.lock() {
                Ok(mut s) => {
                    let matched: Vec<Route> = s
                        .routes
                        .iter()
                        .filter(|r| r.matches(&method, &url))
                        .cloned()
                        .collect();
                    let timestamp_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
                    let mut delay = None;
                    for route in matched {
                        delay = delay.max(route.delay);
                        s.captured.push(CapturedRequest {
                            url: url.clone(),
                            method,
                            body: body.clone(),
                            alias: route.alias.clone(),
                            timestamp_ms,
                        });
                    }
                    delay
                }
                Err(_) => None,
            };

            let page = page.clone();
            let request_id = event.request_id.clone();
            drop(tokio::spawn(async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                if let Err(e) = page.execute(ContinueRequestParams::new(request_id)).await {
                    tracing::warn!(error = %e, "paused request not continued");
                }
            }));
        }
    }))
}

/// Request body from its base64 `postDataEntries`; `None` when empty or undecodable
fn post_data_body(entries: Option<&[PostDataEntry]>) -> Option<String> {
    let mut bytes = Vec::new();
    for entry in entries? {
        let Some(ref chunk) = entry.bytes else {
            continue;
        };
        let encoded: &str = chunk.as_ref();
        match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(decoded) => bytes.extend_from_slice(&decoded),
            Err(e) => {
                tracing::debug!(error = %e, "undecodable post data entry");
                return None;
            }
        }
    }
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn count_expr(selector: &Selector) -> String {
    match selector {
        Selector::Css(css) => format!("document.querySelectorAll({css:?}).length"),
        Selector::CssWithText { css, text } => format!(
            "Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?})).length"
        ),
    }
}

fn snapshot_expr(selector: &Selector) -> String {
    format!(
        r"(() => {{
            const el = {};
            if (!el) return null;
            const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            const attributes = {{}};
            for (const a of el.attributes) attributes[a.name] = a.value;
            return {{
                tagName: el.tagName.toLowerCase(),
                visible: rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none',
                text: el.textContent || '',
                value: ('value' in el) ? String(el.value) : null,
                attributes,
            }};
        }})()",
        selector.to_query()
    )
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let ms = self.page_load_timeout.as_millis() as u64;
        tokio::time::timeout(self.page_load_timeout, self.page.goto(url))
            .await
            .map_err(|_| ProbeError::Timeout {
                ms,
                waited_for: format!("page load of {url}"),
            })?
            .map_err(|e| ProbeError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn query(&self, selector: &Selector) -> ProbeResult<Option<ElementSnapshot>> {
        self.eval(snapshot_expr(selector)).await
    }

    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        self.eval(count_expr(selector)).await
    }

    async fn clear(&self, selector: &Selector) -> ProbeResult<()> {
        self.with_element(
            selector,
            "el.focus(); el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true }));",
        )
        .await
    }

    async fn type_text(&self, selector: &Selector, text: &str) -> ProbeResult<()> {
        self.with_element(selector, "el.focus();").await?;
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        self.with_element(selector, "el.click();").await
    }

    async fn clear_cookies(&self) -> ProbeResult<()> {
        self.page
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        Ok(())
    }

    async fn clear_local_storage(&self) -> ProbeResult<()> {
        // about:blank has no storage; a throw there is not an error.
        let _: bool = self
            .eval("(() => { try { localStorage.clear(); } catch (e) {} return true; })()".to_string())
            .await?;
        Ok(())
    }

    async fn clear_session_storage(&self) -> ProbeResult<()> {
        let _: bool = self
            .eval("(() => { try { sessionStorage.clear(); } catch (e) {} return true; })()".to_string())
            .await?;
        Ok(())
    }

    async fn set_viewport(&self, viewport: Viewport) -> ProbeResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(ProbeError::page)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        Ok(())
    }

    async fn set_extra_headers(&self, headers: &[(String, String)]) -> ProbeResult<()> {
        let map: serde_json::Map<String, serde_json::Value> = headers
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        self.page
            .execute(SetExtraHttpHeadersParams::new(Headers::new(
                serde_json::Value::Object(map),
            )))
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        Ok(())
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| ProbeError::ScreenshotError {
                message: e.to_string(),
            })?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| ProbeError::ScreenshotError {
                message: e.to_string(),
            })?;
        let (width, height): (u32, u32) = self
            .eval("[window.innerWidth, window.innerHeight]".to_string())
            .await?;
        Ok(Screenshot::new(data, width, height))
    }

    async fn ready_state(&self) -> ProbeResult<String> {
        self.eval("document.readyState".to_string()).await
    }

    async fn intercept(&self, route: Route) -> ProbeResult<()> {
        if !self.fetch_enabled.swap(true, Ordering::SeqCst) {
            let params = EnableParams::builder()
                .pattern(RequestPattern::builder().url_pattern("*").build())
                .build();
            self.page
                .execute(params)
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            tracing::debug!("request interception enabled");
        }
        lock(&self.shared)?.routes.push(route);
        Ok(())
    }

    async fn clear_routes(&self) -> ProbeResult<()> {
        let mut s = lock(&self.shared)?;
        s.routes.clear();
        s.captured.clear();
        Ok(())
    }

    async fn captured_requests(&self) -> ProbeResult<Vec<CapturedRequest>> {
        Ok(lock(&self.shared)?.captured.clone())
    }

    async fn take_page_errors(&self) -> ProbeResult<Vec<String>> {
        Ok(std::mem::take(&mut lock(&self.shared)?.page_errors))
    }

    async fn close(&self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ProbeError::BrowserLaunchError {
                message: e.to_string(),
            })?;
        for task in &self.tasks {
            task.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_expr_css() {
        let expr = count_expr(&Selector::css(".oxd-input-field-error-message"));
        assert_eq!(
            expr,
            "document.querySelectorAll(\".oxd-input-field-error-message\").length"
        );
    }

    #[test]
    fn test_count_expr_with_text() {
        let expr = count_expr(&Selector::CssWithText {
            css: "p".into(),
            text: "Required".into(),
        });
        assert!(expr.contains("filter"));
        assert!(expr.ends_with(".length"));
    }

    mod post_data_tests {
        use super::*;

        fn entry(encoded: &str) -> PostDataEntry {
            PostDataEntry::builder().bytes(encoded.to_string()).build()
        }

        #[test]
        fn test_entries_are_decoded_and_joined() {
            let entries = vec![
                entry(&base64::engine::general_purpose::STANDARD.encode("username=Admin&")),
                PostDataEntry::builder().build(),
                entry(&base64::engine::general_purpose::STANDARD.encode("password=admin123")),
            ];
            assert_eq!(
                post_data_body(Some(&entries)).as_deref(),
                Some("username=Admin&password=admin123")
            );
        }

        #[test]
        fn test_no_entries_is_none() {
            assert_eq!(post_data_body(None), None);
            assert_eq!(post_data_body(Some(&[])), None);
            assert_eq!(post_data_body(Some(&[PostDataEntry::builder().build()])), None);
        }

        #[test]
        fn test_invalid_base64_is_none() {
            assert_eq!(post_data_body(Some(&[entry("not base64!")])), None);
        }
    }

    #[test]
    fn test_snapshot_expr_embeds_query() {
        let expr = snapshot_expr(&Selector::css("[name=\"username\"]"));
        assert!(expr.contains("document.querySelector(\"[name=\\\"username\\\"]\")"));
        assert!(expr.contains("tagName"));
    }
}
