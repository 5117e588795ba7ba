//! CLI command definitions using clap

use crate::config::ColorChoice;
use clap::{Parser, Subcommand, ValueEnum};
use loginprobe::config::RunMode;
use std::path::PathBuf;

/// loginprobe: run the OrangeHRM login suite
#[derive(Parser, Debug)]
#[command(name = "loginprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures and summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the login suite
    Run(RunArgs),

    /// List scenario ids and titles
    List(ListArgs),

    /// Write a starter loginprobe.yaml and fixtures/credentials.json
    Init(InitArgs),

    /// Print the resolved configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Configuration file (default: ./loginprobe.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Credentials fixture (default: <fixtures_folder>/credentials.json, else built in)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Run mode; decides how many times a failed test is retried
    #[arg(short, long, default_value = "run")]
    pub mode: ModeArg,

    /// Only scenarios whose id or title matches this regex
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Run against the in-memory application instead of a browser
    #[arg(long)]
    pub simulate: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Override base_url
    #[arg(long, env = "LOGINPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Stop after the first failed test
    #[arg(long)]
    pub bail: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Configuration file (its spec_pattern applies)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only scenarios whose id or title matches this regex
    #[arg(short, long)]
    pub grep: Option<String>,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Project directory
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file (default: ./loginprobe.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Color argument for clap
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Run mode argument for clap
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ModeArg {
    /// Batch run, retries on
    #[default]
    Run,
    /// Interactive run, no retries
    Open,
}

impl From<ModeArg> for RunMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Run => Self::Run,
            ModeArg::Open => Self::Open,
        }
    }
}

/// Output format for `config`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML
    #[default]
    Yaml,
    /// JSON
    Json,
}
