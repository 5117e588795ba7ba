//! A browser session shared by every test of one run.

use crate::artifacts::ArtifactStore;
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::fixture::CredentialsFixture;
use crate::result::ProbeResult;

/// Driver plus the immutable per-run inputs
#[derive(Debug)]
pub struct Session<D: Driver> {
    driver: D,
    config: SuiteConfig,
    fixture: CredentialsFixture,
    artifacts: ArtifactStore,
}

impl<D: Driver> Session<D> {
    /// Wrap a launched driver
    #[must_use]
    pub fn new(driver: D, config: SuiteConfig, fixture: CredentialsFixture) -> Self {
        let artifacts = ArtifactStore::new(
            config.screenshots_folder.clone(),
            config.videos_folder.clone(),
        );
        Self {
            driver,
            config,
            fixture,
            artifacts,
        }
    }

    /// The driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Run configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Credential fixture
    #[must_use]
    pub const fn fixture(&self) -> &CredentialsFixture {
        &self.fixture
    }

    /// Artifact store
    #[must_use]
    pub const fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Absolute URL for an application path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.config.resolve_url(path)
    }

    /// Browser-level state every test starts from: empty cookie jar and
    /// local storage, no routes, the configured viewport and
    /// `Accept-Language`.
    pub async fn reset_for_test(&self) -> ProbeResult<()> {
        self.driver.clear_cookies().await?;
        self.driver.clear_local_storage().await?;
        self.driver.clear_routes().await?;
        self.driver.set_viewport(self.config.viewport).await?;
        self.driver
            .set_extra_headers(&self.config.extra_headers())
            .await?;
        // Errors left over from the previous test belong to that test.
        let stale = self.driver.take_page_errors().await?;
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "discarded stale page errors");
        }
        Ok(())
    }

    /// Close the browser
    pub async fn close(self) -> ProbeResult<()> {
        self.driver.close().await
    }
}
