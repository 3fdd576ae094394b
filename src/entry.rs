use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use wmetrics::args::TesterArgs;
use wmetrics::config::{apply_config, load_config};
use wmetrics::error::{AppError, AppResult, ValidationError};

use crate::app::run_local;

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["wmetrics.toml", "wmetrics.json"];

pub(crate) fn run() -> ExitCode {
    let (args, matches) = match parse_args() {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    match execute(args, &matches) {
        Ok(code) => ExitCode::from(code),
        Err(AppError::Validation(err @ ValidationError::UserAgentTemplateList { .. })) => {
            println!("{}", err);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn execute(mut args: TesterArgs, matches: &ArgMatches) -> AppResult<u8> {
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_local(args))
}
