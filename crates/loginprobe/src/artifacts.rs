//! Screenshot and video artifacts.

use crate::driver::Screenshot;
use crate::result::{ProbeError, ProbeResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to a recorded video after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRetention {
    /// At least one attempt failed; video kept
    Kept,
    /// Every attempt passed; video deleted
    Deleted,
    /// No video at the given path
    Missing,
}

/// Writes artifacts under the configured folders
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    screenshots_dir: PathBuf,
    videos_dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store; folders are created lazily
    #[must_use]
    pub fn new(screenshots_dir: impl Into<PathBuf>, videos_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshots_dir: screenshots_dir.into(),
            videos_dir: videos_dir.into(),
        }
    }

    /// Screenshot folder
    #[must_use]
    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// Video folder
    #[must_use]
    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    /// Write `<name>.png`, suffixing `_N` rather than overwriting
    pub fn save_screenshot(&self, name: &str, screenshot: &Screenshot) -> ProbeResult<PathBuf> {
        if !screenshot.is_valid() {
            return Err(ProbeError::ScreenshotError {
                message: format!("empty capture for {name:?}"),
            });
        }
        fs::create_dir_all(&self.screenshots_dir)?;
        let stem = sanitize_name(name);
        let mut path = self.screenshots_dir.join(format!("{stem}.png"));
        let mut n = 1;
        while path.exists() {
            path = self.screenshots_dir.join(format!("{stem}_{n}.png"));
            n += 1;
        }
        fs::write(&path, &screenshot.data)?;
        tracing::info!(path = %path.display(), bytes = screenshot.size_bytes(), "screenshot saved");
        Ok(path)
    }

    /// Delete `video` unless some attempt in the run failed
    pub fn retain_video(&self, video: &Path, any_attempt_failed: bool) -> ProbeResult<VideoRetention> {
        if !video.exists() {
            return Ok(VideoRetention::Missing);
        }
        if any_attempt_failed {
            return Ok(VideoRetention::Kept);
        }
        fs::remove_file(video)?;
        tracing::debug!(path = %video.display(), "deleted video of passing run");
        Ok(VideoRetention::Deleted)
    }
}

/// `failed_<title>_<timestamp>` with path-hostile characters replaced
#[must_use]
pub fn failure_screenshot_name(title: &str, at: DateTime<Utc>) -> String {
    let title = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stamp = at
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("failed_{title}_{stamp}")
}

/// Keep `[A-Za-z0-9_-]`, map everything else to `_`
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "screenshot".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn png() -> Screenshot {
        Screenshot::new(vec![0x89, b'P', b'N', b'G'], 1280, 720)
    }

    #[test]
    fn test_failure_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let name = failure_screenshot_name("should mask  password field", at);
        assert_eq!(name, "failed_should_mask_password_field_2024-03-05T14-07-09-000Z");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("login/ok page"), "login_ok_page");
        assert_eq!(sanitize_name(""), "screenshot");
    }

    #[test]
    fn test_save_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("shots"), dir.path().join("videos"));
        let first = store.save_screenshot("successful_login", &png()).unwrap();
        let second = store.save_screenshot("successful_login", &png()).unwrap();
        assert!(first.ends_with("successful_login.png"));
        assert!(second.ends_with("successful_login_1.png"));
        assert_eq!(std::fs::read(&first).unwrap(), png().data);
    }

    #[test]
    fn test_save_rejects_empty_capture() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("shots"), dir.path().join("videos"));
        let err = store
            .save_screenshot("blank", &Screenshot::new(Vec::new(), 1280, 720))
            .unwrap_err();
        assert!(matches!(err, ProbeError::ScreenshotError { .. }));
        assert!(!dir.path().join("shots").exists());
    }

    mod video_tests {
        use super::*;

        #[test]
        fn test_passing_run_deletes_video() {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("login.mp4");
            std::fs::write(&video, b"v").unwrap();
            let store = ArtifactStore::new(dir.path(), dir.path());
            assert_eq!(store.retain_video(&video, false).unwrap(), VideoRetention::Deleted);
            assert!(!video.exists());
        }

        #[test]
        fn test_failing_run_keeps_video() {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("login.mp4");
            std::fs::write(&video, b"v").unwrap();
            let store = ArtifactStore::new(dir.path(), dir.path());
            assert_eq!(store.retain_video(&video, true).unwrap(), VideoRetention::Kept);
            assert!(video.exists());
        }

        #[test]
        fn test_missing_video() {
            let dir = tempfile::tempdir().unwrap();
            let store = ArtifactStore::new(dir.path(), dir.path());
            assert_eq!(
                store.retain_video(&dir.path().join("none.mp4"), false).unwrap(),
                VideoRetention::Missing
            );
        }
    }
}
