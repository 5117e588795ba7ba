//! loginprobe CLI library
//!
//! Command-line runner for the loginprobe login suite.

#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
mod init;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigFormat, InitArgs, ListArgs, ModeArg, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use init::init_project;
pub use output::ProgressReporter;
pub use runner::{list_scenarios, load_fixture, resolve_config, run_suite};
