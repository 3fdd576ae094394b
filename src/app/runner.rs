use std::time::Duration;

use wmetrics::args::{OutputFormat, TesterArgs, build_parameters, validate};
use wmetrics::error::{AppError, AppResult};
use wmetrics::http::{self, Parameters};
use wmetrics::output::{exit_code, render_json, render_text};
use wmetrics::statistics::{Statistics, get_statistics};

use super::progress::{ProgressBar, finish_progress_line};

/// Runs a load test from parsed CLI arguments and returns the process exit code.
pub(crate) async fn run_local(args: TesterArgs) -> AppResult<u8> {
    validate(&args)?;
    let parameters = build_parameters(&args)?;
    let format = parameters.output_format;
    let triggers = parameters.exit_on_codes.clone();

    if format.is_human() {
        print!("{}", greeting(&parameters));
    }

    let mut progress_bar = if format.shows_progress() {
        ProgressBar::for_terminal(args.no_color)
    } else {
        None
    };
    let draws_progress = progress_bar.is_some();

    let (results, elapsed) = http::test(parameters, move |progress| {
        if let Some(bar) = progress_bar.as_mut() {
            bar.update(&progress);
        }
    })
    .await?;

    if draws_progress {
        finish_progress_line();
    }

    if results.is_empty() {
        return Err(AppError::NoResults);
    }

    let stats = get_statistics(&results, elapsed);

    if format.is_human() {
        print!("\n\n\n");
    }
    print_results(format, &stats)?;
    if format.is_human() {
        println!();
    }

    let code = exit_code(&stats, &triggers);
    Ok(u8::try_from(code).unwrap_or(1))
}

fn print_results(format: OutputFormat, stats: &Statistics) -> AppResult<()> {
    match format {
        OutputFormat::Std | OutputFormat::Text => print!("{}", render_text(stats)?),
        OutputFormat::Json => println!("{}", render_json(stats, false)?),
        OutputFormat::JsonPretty => println!("{}", render_json(stats, true)?),
    }
    Ok(())
}

fn greeting(parameters: &Parameters) -> String {
    let plan = parameters.time_limit().map_or_else(
        || {
            format!(
                "Performing {} [{}] requests with concurrency level of {}",
                parameters.requests,
                parameters.method.as_str(),
                parameters.concurrency
            )
        },
        |limit| {
            format!(
                "Performing [{}] requests with concurrency level of {} with time limit of {}",
                parameters.method.as_str(),
                parameters.concurrency,
                format_duration(limit)
            )
        },
    );
    format!(
        "{} v{}\n{}\n\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        plan
    )
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 && duration.as_secs() > 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
