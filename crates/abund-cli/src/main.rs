//! Abundance table cleaning CLI.

use clap::{ColorChoice, Parser};
use abund_cli::logging::{LogConfig, LogFormat, init_logging};
use abund_cli::pipeline::{profile_table, run_pipeline};
use abund_cli::types::RunOptions;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, RunArgs};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run_pipeline(&run_options(&args)) {
            Ok(summary) => {
                print_summary(&summary);
                if let Some(path) = &summary.output {
                    println!("Cleaned data saved to {}", path.display());
                }
                0
            }
            Err(error) => {
                eprintln!("error: {error}");
                1
            }
        },
        Command::Profile(args) => {
            match profile_table(&args.input.input, &args.input.load_options()) {
                Ok(_) => 0,
                Err(error) => {
                    eprintln!("error: {error}");
                    1
                }
            }
        }
    };
    std::process::exit(exit_code);
}

fn run_options(args: &RunArgs) -> RunOptions {
    RunOptions {
        output: args.output.clone(),
        dry_run: args.dry_run,
        report_json: args.report_json.clone(),
        load: args.input.load_options(),
        repair: args.repair_options(),
        normalize: args.normalize_options(),
        ..RunOptions::new(args.input.input.clone())
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
