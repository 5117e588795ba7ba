//! Credential fixture (`credentials.json`).
//!
//! Loaded once per run, immutable afterwards. The library embeds a copy so
//! the suite runs without any files on disk; a file in the configured
//! fixtures folder replaces it.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixture file name inside the fixtures folder
pub const FIXTURE_FILE_NAME: &str = "credentials.json";

/// Embedded fixture
pub const BUILTIN_FIXTURE: &str = include_str!("../fixtures/credentials.json");

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Credentials the application must reject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidCredentials {
    /// Valid username, wrong password
    pub wrong_password: Credentials,
    /// Unknown username, valid password
    pub wrong_username: Credentials,
    /// Both wrong
    pub both_wrong: Credentials,
}

/// Credentials with one field blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyCredentials {
    /// Blank username
    pub empty_username: Credentials,
    /// Blank password
    pub empty_password: Credentials,
}

/// Page titles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedTexts {
    /// Login page title
    pub login_title: String,
    /// Dashboard header
    pub dashboard_title: String,
}

/// Error banner texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedErrorMessages {
    /// Shown for rejected credentials
    pub invalid_credentials: String,
    /// Shown under a blank required field
    pub required_field: String,
}

/// Routes and expected texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    /// Login route
    pub login_url: String,
    /// Dashboard route
    pub dashboard_url: String,
    /// Titles
    pub expected_texts: ExpectedTexts,
    /// Error texts
    pub expected_error_messages: ExpectedErrorMessages,
}

/// The full credential fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsFixture {
    /// Account that can log in
    pub valid_credentials: Credentials,
    /// Rejected combinations
    pub invalid_credentials: InvalidCredentials,
    /// Blank-field combinations
    pub empty_credentials: EmptyCredentials,
    /// Routes and expected texts
    pub test_data: TestData,
}

impl CredentialsFixture {
    /// The embedded fixture
    pub fn builtin() -> ProbeResult<Self> {
        Self::from_json_str(BUILTIN_FIXTURE)
    }

    /// Parse and validate
    pub fn from_json_str(json: &str) -> ProbeResult<Self> {
        let fixture: Self = serde_json::from_str(json)
            .map_err(|e| ProbeError::fixture(format!("malformed {FIXTURE_FILE_NAME}: {e}")))?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Load from a file
    pub fn from_path(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProbeError::fixture(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// `<folder>/credentials.json` when present, otherwise the embedded copy
    pub fn load_from_folder(folder: &Path) -> ProbeResult<Self> {
        let path = folder.join(FIXTURE_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading fixture");
            Self::from_path(&path)
        } else {
            tracing::debug!(folder = %folder.display(), "no fixture on disk, using builtin");
            Self::builtin()
        }
    }

    /// Structural checks the suite depends on
    pub fn validate(&self) -> ProbeResult<()> {
        let valid = &self.valid_credentials;
        if valid.username.is_empty() || valid.password.is_empty() {
            return Err(ProbeError::fixture("validCredentials must not be blank"));
        }
        if !self.empty_credentials.empty_username.username.is_empty() {
            return Err(ProbeError::fixture("emptyCredentials.emptyUsername.username must be blank"));
        }
        if !self.empty_credentials.empty_password.password.is_empty() {
            return Err(ProbeError::fixture("emptyCredentials.emptyPassword.password must be blank"));
        }
        for (name, route) in [
            ("loginUrl", &self.test_data.login_url),
            ("dashboardUrl", &self.test_data.dashboard_url),
        ] {
            if !route.starts_with('/') {
                return Err(ProbeError::fixture(format!(
                    "testData.{name} must be an absolute path, got {route:?}"
                )));
            }
        }
        Ok(())
    }

    /// Serialize as pretty JSON
    pub fn to_json_pretty(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let f = CredentialsFixture::builtin().unwrap();
        assert_eq!(f.valid_credentials, Credentials::new("Admin", "admin123"));
        assert_eq!(f.invalid_credentials.wrong_password.password, "wrongpass");
        assert_eq!(f.test_data.login_url, "/web/index.php/auth/login");
        assert_eq!(f.test_data.expected_texts.dashboard_title, "Dashboard");
        assert_eq!(
            f.test_data.expected_error_messages.invalid_credentials,
            "Invalid credentials"
        );
    }

    #[test]
    fn test_missing_key_is_fixture_error() {
        let err = CredentialsFixture::from_json_str(r#"{"validCredentials": {"username": "a", "password": "b"}}"#)
            .unwrap_err();
        assert!(matches!(err, ProbeError::FixtureError { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_blank_valid_credentials_rejected() {
        let mut f = CredentialsFixture::builtin().unwrap();
        f.valid_credentials.password.clear();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_relative_route_rejected() {
        let mut f = CredentialsFixture::builtin().unwrap();
        f.test_data.dashboard_url = "dashboard".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_load_from_folder_prefers_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = CredentialsFixture::builtin().unwrap();
        f.valid_credentials.password = "s3cret".to_string();
        std::fs::write(dir.path().join(FIXTURE_FILE_NAME), f.to_json_pretty().unwrap()).unwrap();

        let loaded = CredentialsFixture::load_from_folder(dir.path()).unwrap();
        assert_eq!(loaded.valid_credentials.password, "s3cret");
    }

    #[test]
    fn test_load_from_empty_folder_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CredentialsFixture::load_from_folder(dir.path()).unwrap();
        assert_eq!(loaded, CredentialsFixture::builtin().unwrap());
    }
}
