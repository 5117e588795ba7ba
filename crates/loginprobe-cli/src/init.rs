//! `init`: scaffold a project directory

use crate::error::{CliError, CliResult};
use loginprobe::config::{SuiteConfig, CONFIG_FILE_NAME};
use loginprobe::fixture::{BUILTIN_FIXTURE, FIXTURE_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `loginprobe.yaml` and `fixtures/credentials.json` under `dir`.
///
/// Existing files are left alone unless `force` is set. Returns the paths
/// written.
pub fn init_project(dir: &Path, force: bool) -> CliResult<Vec<PathBuf>> {
    let config = SuiteConfig::default();
    let config_path = dir.join(CONFIG_FILE_NAME);
    let fixture_path = dir.join(&config.fixtures_folder).join(FIXTURE_FILE_NAME);

    if !force {
        if let Some(existing) = [&config_path, &fixture_path].into_iter().find(|p| p.exists()) {
            return Err(CliError::invalid_argument(format!(
                "{} already exists (use --force to overwrite)",
                existing.display()
            )));
        }
    }

    fs::create_dir_all(dir)?;
    fs::write(&config_path, config.to_yaml()?)?;
    if let Some(parent) = fixture_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&fixture_path, BUILTIN_FIXTURE)?;

    tracing::info!(dir = %dir.display(), "project initialised");
    Ok(vec![config_path, fixture_path])
}
