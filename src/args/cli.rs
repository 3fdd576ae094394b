use clap::Parser;
use std::time::Duration;

use super::defaults::{DEFAULT_CONTENT_TYPE, DEFAULT_MAX_IDLE_CONNECTIONS, DEFAULT_USER_AGENT};
use super::parsers::{parse_duration_arg, parse_exit_code, parse_header};
use super::types::{HttpMethod, OutputFormat, StatusCodeTrigger};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "wmetrics",
    version,
    about = "HTTP load tester that measures DNS, TCP, TLS, TTFB and total latency for every request."
)]
pub struct TesterArgs {
    /// Target URLs
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Number of requests to perform (per URL)
    #[arg(short = 'n', long = "requests", default_value_t = 1)]
    pub requests: u64,

    /// Number of multiple requests to make at a time
    #[arg(short = 'c', long = "concurrency", default_value_t = 1)]
    pub concurrency: usize,

    /// Time to wait at most for each response (800ms, 30s, ...)
    #[arg(
        short = 's',
        long = "timeout",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub timeout: Duration,

    /// HTTP method
    #[arg(short = 'm', long = "method", default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// User-Agent header value
    #[arg(short = 'u', long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// User-Agent template (chrome, firefox, edge)[-(linux, mac, android, iphone, ipod, ipad)]; "list" shows all templates
    #[arg(long = "user-agent-template", alias = "ut")]
    pub user_agent_template: Option<String>,

    /// Use HTTP keep-alive
    #[arg(short = 'k', long = "keep-alive")]
    pub keep_alive: bool,

    /// Max idle connections
    #[arg(long = "max-idle-connections", alias = "km", default_value_t = DEFAULT_MAX_IDLE_CONNECTIONS)]
    pub max_idle_connections: usize,

    /// Max idle connection timeout (90s, 800ms, ...)
    #[arg(
        long = "idle-timeout",
        alias = "kt",
        default_value = "90s",
        value_parser = parse_duration_arg
    )]
    pub idle_conn_timeout: Duration,

    /// Proxy URL or host[:port] (http proxies only)
    #[arg(short = 'P', long = "proxy", env = "WMETRICS_PROXY")]
    pub proxy: Option<String>,

    /// TLS handshake timeout (10s, 800ms, ...)
    #[arg(
        long = "tls-handshake-timeout",
        alias = "tt",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub tls_handshake_timeout: Duration,

    /// Resolve IPv4 addresses only
    #[arg(short = '4', long = "ipv4")]
    pub ipv4_only: bool,

    /// Resolve IPv6 addresses only
    #[arg(short = '6', long = "ipv6")]
    pub ipv6_only: bool,

    /// Allow insecure TLS connections
    #[arg(short = 'i', long = "insecure")]
    pub insecure: bool,

    /// Client PEM certificate file (certificate and private key)
    #[arg(short = 'C', long = "cert")]
    pub client_certificate: Option<String>,

    /// Post data file
    #[arg(short = 'f', long = "data-file")]
    pub post_data_file: Option<String>,

    /// Post data string
    #[arg(short = 'd', long = "data")]
    pub post_data: Option<String>,

    /// Content type
    #[arg(short = 'T', long = "content-type", default_value = DEFAULT_CONTENT_TYPE)]
    pub content_type: String,

    /// URL-encoded form data
    #[arg(short = 'F', long = "form")]
    pub form_data: Option<String>,

    /// Output format
    #[arg(short = 'O', long = "output-format", default_value = "std", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Custom header in 'Name: Value' format (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Time limit (1s, 200ms, ...). When reached the test stops and results are printed
    #[arg(
        short = 't',
        long = "time-limit",
        default_value = "0s",
        value_parser = parse_duration_arg
    )]
    pub time_limit: Duration,

    /// Path to a file with a list of URLs
    #[arg(short = 'l', long = "url-list")]
    pub url_list_file: Option<String>,

    /// Exit with an error on HTTP code (repeatable, e.g. -e 403 -e 3xx)
    #[arg(short = 'e', long = "exit-on-code", value_parser = parse_exit_code)]
    pub exit_on_codes: Vec<StatusCodeTrigger>,

    /// Path to config file (TOML/JSON). Defaults to ./wmetrics.toml or ./wmetrics.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by WMETRICS_LOG/RUST_LOG)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl TesterArgs {
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        Some(self.time_limit).filter(|limit| !limit.is_zero())
    }
}

