//! Suite execution for the `run` and `list` commands

use crate::commands::{ListArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use loginprobe::config::{RunMode, SuiteConfig, CONFIG_FILE_NAME};
use loginprobe::driver::Driver;
use loginprobe::fixture::CredentialsFixture;
use loginprobe::reporter::{FailureMode, SuiteReport};
use loginprobe::runner::{RunOptions, SuiteRunner};
use loginprobe::session::Session;
use loginprobe::sim::SimulatedHrApp;
use loginprobe::suites::login_suite;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Load the suite configuration.
///
/// An explicit path must exist. Otherwise `./loginprobe.yaml` is used when
/// present, else the defaults. Relative folders in a file are taken relative
/// to the file's directory.
pub fn resolve_config(path: Option<&Path>) -> CliResult<SuiteConfig> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.is_file().then_some(local)
        }
    };
    let Some(path) = path else {
        tracing::debug!("no config file, using defaults");
        return Ok(SuiteConfig::default());
    };

    tracing::debug!(path = %path.display(), "loading config");
    let config = SuiteConfig::from_path(&path)?;
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(rebase(config, root))
}

fn rebase(mut config: SuiteConfig, root: &Path) -> SuiteConfig {
    if root.as_os_str().is_empty() {
        return config;
    }
    let join = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = root.join(&*p);
        }
    };
    join(&mut config.videos_folder);
    join(&mut config.screenshots_folder);
    join(&mut config.fixtures_folder);
    join(&mut config.reporter.report_dir);
    config
}

/// `--fixture` when given, else `<fixtures_folder>/credentials.json`, else built in
pub fn load_fixture(path: Option<&Path>, config: &SuiteConfig) -> CliResult<CredentialsFixture> {
    let fixture = match path {
        Some(p) => CredentialsFixture::from_path(p)?,
        None => CredentialsFixture::load_from_folder(&config.fixtures_folder)?,
    };
    Ok(fixture)
}

fn compile_grep(grep: Option<&str>) -> CliResult<Option<Regex>> {
    Ok(grep.map(Regex::new).transpose()?)
}

/// Execute the `run` command
pub fn run_suite(cli: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut config = resolve_config(args.config.as_deref())?;
    if let Some(ref url) = args.base_url {
        config = config.with_base_url(url.clone())?;
    }
    if args.headed {
        config.headless = false;
    }
    let fixture = load_fixture(args.fixture.as_deref(), &config)?;

    let mut options = RunOptions::new(RunMode::from(args.mode));
    if args.bail {
        options = options.with_failure_mode(FailureMode::AndonCord);
    }
    if let Some(re) = compile_grep(args.grep.as_deref())? {
        options = options.with_grep(re);
    }

    let mut reporter = ProgressReporter::new(cli.color.should_color(), cli.verbosity.is_quiet());
    let report_dir = config.reporter.report_dir.clone();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::test_execution(format!("cannot start runtime: {e}")))?;

    let report = runtime.block_on(async {
        if args.simulate {
            let app = SimulatedHrApp::new(&config.base_url);
            execute(app, config, fixture, options, &mut reporter).await
        } else {
            launch_and_execute(config, fixture, options, &mut reporter).await
        }
    })?;

    if report.stats.tests > 0 {
        reporter.report_path(&report_dir);
    }
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::TestsFailed {
            failures: report.stats.failures,
            tests: report.stats.tests,
        })
    }
}

#[cfg(feature = "browser")]
async fn launch_and_execute(
    config: SuiteConfig,
    fixture: CredentialsFixture,
    options: RunOptions,
    reporter: &mut ProgressReporter,
) -> CliResult<SuiteReport> {
    let driver = loginprobe::browser::ChromiumDriver::launch(&config).await?;
    execute(driver, config, fixture, options, reporter).await
}

#[cfg(not(feature = "browser"))]
async fn launch_and_execute(
    _config: SuiteConfig,
    _fixture: CredentialsFixture,
    _options: RunOptions,
    _reporter: &mut ProgressReporter,
) -> CliResult<SuiteReport> {
    Err(CliError::invalid_argument(
        "built without the `browser` feature; use --simulate",
    ))
}

async fn execute<D: Driver>(
    driver: D,
    config: SuiteConfig,
    fixture: CredentialsFixture,
    options: RunOptions,
    reporter: &mut ProgressReporter,
) -> CliResult<SuiteReport> {
    let session = Session::new(driver, config, fixture);
    let suite = login_suite::<D>();
    let outcome = SuiteRunner::new(&session, options).run(&suite, reporter).await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "closing the browser failed");
    }
    Ok(outcome?)
}

/// Execute the `list` command; returns the printed lines
pub fn list_scenarios(args: &ListArgs) -> CliResult<Vec<String>> {
    let config = resolve_config(args.config.as_deref())?;
    let mut options = RunOptions::new(RunMode::Open);
    if let Some(re) = compile_grep(args.grep.as_deref())? {
        options = options.with_grep(re);
    }

    let app = SimulatedHrApp::new(&config.base_url);
    let session = Session::new(app, config, CredentialsFixture::builtin()?);
    let suite = login_suite::<SimulatedHrApp>();
    let lines = SuiteRunner::new(&session, options)
        .select(&suite)
        .into_iter()
        .map(|s| format!("{:<40} {}", s.id, s.title))
        .collect();
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    mod config_tests {
        use super::*;

        #[test]
        fn test_missing_explicit_config_is_error() {
            let dir = TempDir::new().unwrap();
            let err = resolve_config(Some(&dir.path().join("nope.yaml"))).unwrap_err();
            assert!(err.to_string().contains("nope.yaml"));
        }

        #[test]
        fn test_relative_folders_follow_config_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join(CONFIG_FILE_NAME);
            fs::write(&path, "screenshots_folder: shots\nvideos_folder: /abs/videos\n").unwrap();

            let config = resolve_config(Some(&path)).unwrap();
            assert_eq!(config.screenshots_folder, dir.path().join("shots"));
            assert_eq!(config.videos_folder, PathBuf::from("/abs/videos"));
            assert_eq!(config.fixtures_folder, dir.path().join("fixtures"));
        }

        #[test]
        fn test_invalid_config_is_rejected() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join(CONFIG_FILE_NAME);
            fs::write(&path, "base_url: ftp://hr.test\n").unwrap();
            assert!(resolve_config(Some(&path)).is_err());
        }
    }

    mod fixture_tests {
        use super::*;

        #[test]
        fn test_falls_back_to_builtin() {
            let dir = TempDir::new().unwrap();
            let config = SuiteConfig {
                fixtures_folder: dir.path().join("missing"),
                ..SuiteConfig::default()
            };
            let fixture = load_fixture(None, &config).unwrap();
            assert_eq!(fixture.valid_credentials.username, "Admin");
        }

        #[test]
        fn test_explicit_fixture_must_parse() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("bad.json");
            fs::write(&path, "{").unwrap();
            assert!(load_fixture(Some(&path), &SuiteConfig::default()).is_err());
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_lists_every_scenario() {
            let lines = list_scenarios(&ListArgs {
                config: None,
                grep: None,
            })
            .unwrap();
            assert_eq!(lines.len(), 16);
            assert!(lines[0].starts_with("login/positive/valid-credentials"));
        }

        #[test]
        fn test_grep_filters() {
            let lines = list_scenarios(&ListArgs {
                config: None,
                grep: Some("^login/empty/".into()),
            })
            .unwrap();
            assert_eq!(lines.len(), 3);
        }

        #[test]
        fn test_bad_grep_is_invalid_argument() {
            let err = list_scenarios(&ListArgs {
                config: None,
                grep: Some("(".into()),
            })
            .unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }
    }
}
