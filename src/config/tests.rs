use super::{ConfigFile, DurationValue, apply_config, load_config_file};
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{HttpMethod, OutputFormat, StatusCodeTrigger, TesterArgs};
use crate::error::{AppError, AppResult, ConfigError};

fn args_from(argv: &[&str]) -> AppResult<(TesterArgs, clap::ArgMatches)> {
    let matches = TesterArgs::command().try_get_matches_from(argv)?;
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("wmetrics.toml");
    let content = r#"
urls = ["http://localhost:3000/a", "http://localhost:3000/b"]
method = "post"
requests = 20
concurrency = 4
timeout = "5s"
idle_conn_timeout = 1500
headers = ["X-Token: abc"]
exit_on_codes = ["4xx"]
"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    if config.urls.as_ref().map(Vec::len) != Some(2) {
        return Err(AppError::config("Unexpected urls"));
    }
    if config.method.as_deref() != Some("post") {
        return Err(AppError::config("Unexpected method"));
    }
    if config.timeout != Some(DurationValue::Text("5s".to_owned())) {
        return Err(AppError::config("Unexpected timeout"));
    }
    if config.idle_conn_timeout != Some(DurationValue::Millis(1500)) {
        return Err(AppError::config("Unexpected idle_conn_timeout"));
    }
    Ok(())
}

#[test]
fn parse_json_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("wmetrics.json");
    let content = r#"{
  "urls": ["https://example.com"],
  "output_format": "json-pretty",
  "time_limit": "2s",
  "keep_alive": true
}"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    if config.output_format.as_deref() != Some("json-pretty") {
        return Err(AppError::config("Unexpected output_format"));
    }
    if config.keep_alive != Some(true) {
        return Err(AppError::config("Unexpected keep_alive"));
    }
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("wmetrics.toml");
    std::fs::write(&path, "rate = 10\n")?;

    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ParseToml { .. })) => Ok(()),
        other => Err(AppError::config(format!("Expected ParseToml, got {:?}", other))),
    }
}

#[test]
fn unsupported_extension_is_rejected() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("wmetrics.yaml");
    std::fs::write(&path, "requests: 1\n")?;

    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(AppError::config(format!(
            "Expected UnsupportedExtension, got {:?}",
            other
        ))),
    }
}

#[test]
fn apply_config_fills_unset_options() -> AppResult<()> {
    let config = ConfigFile {
        urls: Some(vec!["http://localhost:3000".to_owned()]),
        requests: Some(12),
        concurrency: Some(3),
        timeout: Some(DurationValue::Text("5s".to_owned())),
        method: Some("put".to_owned()),
        keep_alive: Some(true),
        tls_handshake_timeout: Some(DurationValue::Millis(250)),
        output_format: Some("json".to_owned()),
        headers: Some(vec!["X-Trace: 1".to_owned()]),
        time_limit: Some(DurationValue::Text("3s".to_owned())),
        exit_on_codes: Some(vec!["503".to_owned(), "4xx".to_owned()]),
        ..ConfigFile::default()
    };
    let (mut args, matches) = args_from(&["wmetrics"])?;

    apply_config(&mut args, &matches, &config)?;

    let checks = [
        (args.urls == ["http://localhost:3000"], "Unexpected urls"),
        (args.requests == 12, "Unexpected requests"),
        (args.concurrency == 3, "Unexpected concurrency"),
        (args.timeout == Duration::from_secs(5), "Unexpected timeout"),
        (matches!(args.method, HttpMethod::Put), "Expected PUT"),
        (args.keep_alive, "Expected keep_alive"),
        (
            args.tls_handshake_timeout == Duration::from_millis(250),
            "Unexpected TLS handshake timeout",
        ),
        (
            matches!(args.output_format, OutputFormat::Json),
            "Expected json output",
        ),
        (
            args.headers == [("X-Trace".to_owned(), "1".to_owned())],
            "Unexpected headers",
        ),
        (
            args.time_limit() == Some(Duration::from_secs(3)),
            "Unexpected time limit",
        ),
        (
            args.exit_on_codes
                == [StatusCodeTrigger::Exact(503), StatusCodeTrigger::Class(4)],
            "Unexpected exit codes",
        ),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::config(message));
        }
    }
    Ok(())
}

#[test]
fn command_line_wins_over_config() -> AppResult<()> {
    let config = ConfigFile {
        urls: Some(vec!["http://from-config".to_owned()]),
        requests: Some(50),
        method: Some("post".to_owned()),
        ..ConfigFile::default()
    };
    let (mut args, matches) = args_from(&["wmetrics", "-n", "7", "-m", "head", "http://cli"])?;

    apply_config(&mut args, &matches, &config)?;

    if args.urls != ["http://cli"] {
        return Err(AppError::config("Expected CLI urls"));
    }
    if args.requests != 7 {
        return Err(AppError::config("Expected CLI requests"));
    }
    if !matches!(args.method, HttpMethod::Head) {
        return Err(AppError::config("Expected CLI method"));
    }
    Ok(())
}

#[test]
fn apply_config_rejects_invalid_values() -> AppResult<()> {
    let cases = [
        ConfigFile {
            method: Some("trace".to_owned()),
            ..ConfigFile::default()
        },
        ConfigFile {
            output_format: Some("xml".to_owned()),
            ..ConfigFile::default()
        },
        ConfigFile {
            headers: Some(vec!["NoColon".to_owned()]),
            ..ConfigFile::default()
        },
        ConfigFile {
            timeout: Some(DurationValue::Text("soon".to_owned())),
            ..ConfigFile::default()
        },
        ConfigFile {
            exit_on_codes: Some(vec!["6xx".to_owned()]),
            ..ConfigFile::default()
        },
    ];

    for config in cases {
        let (mut args, matches) = args_from(&["wmetrics"])?;
        match apply_config(&mut args, &matches, &config) {
            Err(AppError::Config(
                ConfigError::InvalidMethod { .. }
                | ConfigError::InvalidOutputFormat { .. }
                | ConfigError::InvalidHeader { .. }
                | ConfigError::InvalidDuration { .. }
                | ConfigError::InvalidExitCode { .. },
            )) => {}
            other => {
                return Err(AppError::config(format!(
                    "Expected config error, got {:?}",
                    other
                )));
            }
        }
    }
    Ok(())
}
