//! loginprobe: run the OrangeHRM login suite
//!
//! ## Usage
//!
//! ```bash
//! loginprobe init                          # Write loginprobe.yaml and fixtures
//! loginprobe list --grep negative          # Show matching scenarios
//! loginprobe run                           # Run against Chromium
//! loginprobe run --simulate --mode open    # In-memory app, no retries
//! ```

use clap::Parser;
use loginprobe_cli::{
    init_project, list_scenarios, resolve_config, run_suite, Cli, CliConfig, CliError,
    CliResult, ColorChoice, Commands, ConfigArgs, ConfigFormat, Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Run(args) => run_suite(&config, &args),
        Commands::List(args) => {
            for line in list_scenarios(&args)? {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Init(args) => {
            for path in init_project(&args.dir, args.force)? {
                if !config.verbosity.is_quiet() {
                    println!("wrote {}", path.display());
                }
            }
            Ok(())
        }
        Commands::Config(args) => print_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color))
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_config(args: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(args.config.as_deref())?;
    let text = match args.format {
        ConfigFormat::Yaml => config.to_yaml()?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)
            .map_err(|e| CliError::config(format!("cannot serialize config: {e}")))?,
    };
    println!("{}", text.trim_end());
    Ok(())
}
