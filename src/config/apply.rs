use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{HttpMethod, OutputFormat, StatusCodeTrigger, TesterArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// Options given explicitly on the command line (or through their environment
/// variable) are left untouched.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "urls")
        && let Some(urls) = config.urls.clone()
    {
        args.urls = urls;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = requests;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = concurrency;
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = timeout.to_duration("timeout")?;
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method.as_deref()
    {
        args.method = method.parse::<HttpMethod>().map_err(|_err| {
            AppError::config(ConfigError::InvalidMethod {
                value: method.to_owned(),
            })
        })?;
    }

    if !is_cli(matches, "user_agent")
        && let Some(user_agent) = config.user_agent.clone()
    {
        args.user_agent = user_agent;
    }

    if !is_cli(matches, "user_agent_template")
        && let Some(template) = config.user_agent_template.clone()
    {
        args.user_agent_template = Some(template);
    }

    if !is_cli(matches, "keep_alive")
        && let Some(keep_alive) = config.keep_alive
    {
        args.keep_alive = keep_alive;
    }

    if !is_cli(matches, "max_idle_connections")
        && let Some(max_idle) = config.max_idle_connections
    {
        args.max_idle_connections = max_idle;
    }

    if !is_cli(matches, "idle_conn_timeout")
        && let Some(timeout) = config.idle_conn_timeout.as_ref()
    {
        args.idle_conn_timeout = timeout.to_duration("idle_conn_timeout")?;
    }

    if !is_cli(matches, "proxy")
        && let Some(proxy) = config.proxy.clone()
    {
        args.proxy = Some(proxy);
    }

    if !is_cli(matches, "tls_handshake_timeout")
        && let Some(timeout) = config.tls_handshake_timeout.as_ref()
    {
        args.tls_handshake_timeout = timeout.to_duration("tls_handshake_timeout")?;
    }

    if !is_cli(matches, "ipv4_only")
        && let Some(ipv4) = config.ipv4
    {
        args.ipv4_only = ipv4;
    }

    if !is_cli(matches, "ipv6_only")
        && let Some(ipv6) = config.ipv6
    {
        args.ipv6_only = ipv6;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        args.insecure = insecure;
    }

    if !is_cli(matches, "client_certificate")
        && let Some(path) = config.client_certificate.clone()
    {
        args.client_certificate = Some(path);
    }

    if !is_cli(matches, "post_data_file")
        && let Some(path) = config.post_data_file.clone()
    {
        args.post_data_file = Some(path);
    }

    if !is_cli(matches, "post_data")
        && let Some(data) = config.post_data.clone()
    {
        args.post_data = Some(data);
    }

    if !is_cli(matches, "form_data")
        && let Some(form) = config.form_data.clone()
    {
        args.form_data = Some(form);
    }

    if !is_cli(matches, "content_type")
        && let Some(content_type) = config.content_type.clone()
    {
        args.content_type = content_type;
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format.as_deref()
    {
        args.output_format = format.parse::<OutputFormat>().map_err(|_err| {
            AppError::config(ConfigError::InvalidOutputFormat {
                value: format.to_owned(),
            })
        })?;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|source| AppError::config(ConfigError::InvalidHeader { source }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "time_limit")
        && let Some(limit) = config.time_limit.as_ref()
    {
        args.time_limit = limit.to_duration("time_limit")?;
    }

    if !is_cli(matches, "url_list_file")
        && let Some(path) = config.url_list_file.clone()
    {
        args.url_list_file = Some(path);
    }

    if !is_cli(matches, "exit_on_codes")
        && let Some(codes) = config.exit_on_codes.as_ref()
    {
        let mut parsed = Vec::with_capacity(codes.len());
        for code in codes {
            parsed.push(
                code.parse::<StatusCodeTrigger>()
                    .map_err(|source| AppError::config(ConfigError::InvalidExitCode { source }))?,
            );
        }
        args.exit_on_codes = parsed;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
