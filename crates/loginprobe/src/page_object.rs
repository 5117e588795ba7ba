//! Page Object Model support.
//!
//! A page object owns a table of [`Locator`]s and hands out [`Element`]
//! handles. An element handle is re-queried on every use, so it never goes
//! stale across navigations. Interactions wait for the element to be
//! visible first and fail once the locator's timeout runs out.

use crate::assertion::{expect_element, Expectation};
use crate::driver::{Driver, ElementSnapshot};
use crate::locator::Locator;
use crate::result::ProbeResult;

/// Live handle on one element of a page
#[derive(Debug)]
pub struct Element<'s, D: Driver + ?Sized> {
    driver: &'s D,
    locator: Locator,
}

impl<'s, D: Driver + ?Sized> Element<'s, D> {
    /// Bind a locator to a driver
    #[must_use]
    pub fn new(driver: &'s D, locator: Locator) -> Self {
        Self { driver, locator }
    }

    /// The locator
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Wait until every expectation holds
    pub async fn should(&self, expectations: &[Expectation]) -> ProbeResult<ElementSnapshot> {
        expect_element(self.driver, &self.locator, expectations).await
    }

    /// Wait until visible
    pub async fn should_be_visible(&self) -> ProbeResult<ElementSnapshot> {
        self.should(&[Expectation::BeVisible]).await
    }

    /// Wait until visible and containing `text`
    pub async fn should_contain_text(&self, text: &str) -> ProbeResult<ElementSnapshot> {
        self.should(&[Expectation::BeVisible, Expectation::contain_text(text)])
            .await
    }

    /// Wait until attribute `name` equals `value`
    pub async fn should_have_attribute(&self, name: &str, value: &str) -> ProbeResult<ElementSnapshot> {
        self.should(&[Expectation::have_attribute(name, value)]).await
    }

    /// Wait until the form value equals `value`
    pub async fn should_have_value(&self, value: &str) -> ProbeResult<ElementSnapshot> {
        self.should(&[Expectation::have_value(value)]).await
    }

    /// Wait until the form value is empty
    pub async fn should_be_empty(&self) -> ProbeResult<ElementSnapshot> {
        self.should(&[Expectation::BeEmpty]).await
    }

    /// Current form value, once the element exists
    pub async fn value(&self) -> ProbeResult<String> {
        let el = self.should(&[Expectation::Exist]).await?;
        Ok(el.value.unwrap_or_default())
    }

    /// Clear the control
    pub async fn clear(&self) -> ProbeResult<()> {
        self.should_be_visible().await?;
        self.driver.clear(self.locator.selector()).await
    }

    /// Type into the control
    pub async fn type_text(&self, text: &str) -> ProbeResult<()> {
        self.should_be_visible().await?;
        self.driver.type_text(self.locator.selector(), text).await
    }

    /// Clear, then type
    pub async fn fill(&self, text: &str) -> ProbeResult<()> {
        self.clear().await?;
        if text.is_empty() {
            return Ok(());
        }
        self.driver.type_text(self.locator.selector(), text).await
    }

    /// Click
    pub async fn click(&self) -> ProbeResult<()> {
        self.should_be_visible().await?;
        self.driver.click(self.locator.selector()).await
    }
}
