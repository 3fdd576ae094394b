use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use crate::args::{
    DEFAULT_CONTENT_TYPE, DEFAULT_IDLE_CONN_TIMEOUT, DEFAULT_MAX_IDLE_CONNECTIONS,
    DEFAULT_TIMEOUT, DEFAULT_TLS_HANDSHAKE_TIMEOUT, DEFAULT_USER_AGENT, HttpMethod, OutputFormat,
    StatusCodeTrigger,
};
use crate::error::{ConnectError, ResponseError};

/// An endpoint under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: Url,
}

impl Resource {
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parses an absolute URL, rejecting inputs without a scheme or host.
    ///
    /// # Errors
    ///
    /// Returns the parse error, or `EmptyHost` when the URL has no host.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw.trim())?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(url::ParseError::EmptyHost);
        }
        Ok(Self { url })
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }

    #[must_use]
    pub const fn matches(self, addr: &std::net::SocketAddr) -> bool {
        match self {
            AddressFamily::V4 => addr.is_ipv4(),
            AddressFamily::V6 => addr.is_ipv6(),
        }
    }
}

/// Settings for one test run. Validated before it reaches the engine.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub resources: Vec<Arc<Resource>>,
    /// Total planned requests across all resources.
    pub requests: u64,
    pub concurrency: usize,
    pub timeout: Duration,
    pub method: HttpMethod,
    pub user_agent: String,
    pub user_agent_template: Option<String>,
    pub keep_alive: bool,
    pub proxy: Option<String>,
    /// Accepted for parity with pooled clients; connections are never reused across requests.
    pub max_idle_connections: usize,
    pub idle_conn_timeout: Duration,
    pub tls_handshake_timeout: Duration,
    pub ipv4_only: bool,
    pub ipv6_only: bool,
    pub allow_insecure_tls: bool,
    pub client_certificate_file: Option<PathBuf>,
    pub post_data_file: Option<PathBuf>,
    pub post_data: Option<String>,
    pub form_data: Option<String>,
    pub content_type: String,
    pub custom_headers: Vec<(String, String)>,
    /// Zero means no time limit.
    pub time_limit: Duration,
    pub output_format: OutputFormat,
    pub exit_on_codes: Vec<StatusCodeTrigger>,
}

impl Parameters {
    /// Parameters with CLI defaults for the given resources: one request per resource.
    #[must_use]
    pub fn new(resources: Vec<Resource>) -> Self {
        let requests = u64::try_from(resources.len()).unwrap_or(u64::MAX);
        Self {
            resources: resources.into_iter().map(Arc::new).collect(),
            requests,
            concurrency: 1,
            timeout: DEFAULT_TIMEOUT,
            method: HttpMethod::Get,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            user_agent_template: None,
            keep_alive: false,
            proxy: None,
            max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
            idle_conn_timeout: DEFAULT_IDLE_CONN_TIMEOUT,
            tls_handshake_timeout: DEFAULT_TLS_HANDSHAKE_TIMEOUT,
            ipv4_only: false,
            ipv6_only: false,
            allow_insecure_tls: false,
            client_certificate_file: None,
            post_data_file: None,
            post_data: None,
            form_data: None,
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            custom_headers: Vec::new(),
            time_limit: Duration::ZERO,
            output_format: OutputFormat::Std,
            exit_on_codes: Vec::new(),
        }
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        Some(self.time_limit).filter(|limit| !limit.is_zero())
    }

    /// IPv6 only when it is the sole restriction, IPv4 otherwise.
    #[must_use]
    pub const fn address_family(&self) -> AddressFamily {
        if self.ipv6_only && !self.ipv4_only {
            AddressFamily::V6
        } else {
            AddressFamily::V4
        }
    }

    /// Planned total for progress reporting; `-1` when a time limit governs the run.
    #[must_use]
    pub fn planned_total(&self) -> i64 {
        if self.time_limit().is_some() {
            return -1;
        }
        i64::try_from(self.requests).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestsProgress {
    pub total: i64,
    pub completed: u64,
    pub failed: u64,
}

impl RequestsProgress {
    #[must_use]
    pub const fn new(total: i64) -> Self {
        Self {
            total,
            completed: 0,
            failed: 0,
        }
    }

    pub const fn record(&mut self, failed: bool) {
        self.completed = self.completed.saturating_add(1);
        if failed {
            self.failed = self.failed.saturating_add(1);
        }
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.total < 0
    }
}

/// Absolute timestamps captured while one request is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub start: Option<Instant>,
    pub dns_start: Option<Instant>,
    pub dns_end: Option<Instant>,
    pub tcp_connect: Option<Instant>,
    pub tls_handshake_start: Option<Instant>,
    pub tls_handshake_end: Option<Instant>,
    pub server_connect: Option<Instant>,
    pub request_sent: Option<Instant>,
    pub ttfb: Option<Instant>,
    pub total_time: Option<Instant>,
}

impl Timing {
    /// Fills the milestones that never fire on reused or plaintext connections.
    ///
    /// No DNS event: DNS start collapses onto DNS end. No TLS event: both TLS
    /// timestamps collapse onto TCP connect.
    #[must_use]
    pub const fn normalized(mut self) -> Self {
        if self.dns_start.is_none() {
            self.dns_start = self.dns_end;
        }
        if self.tls_handshake_start.is_none() {
            self.tls_handshake_start = self.tcp_connect;
            self.tls_handshake_end = self.tcp_connect;
        }
        self
    }

    #[must_use]
    pub fn durations(&self) -> Durations {
        Durations {
            dns_lookup: phase(self.start, self.dns_start, self.dns_end),
            tcp_connection: phase(self.start, self.dns_end, self.tcp_connect),
            tls_handshake: phase(self.start, self.tls_handshake_start, self.tls_handshake_end),
            connection_establishment: phase(
                self.start,
                self.tls_handshake_end,
                self.server_connect,
            ),
            ttfb: phase(self.start, self.server_connect, self.ttfb),
            total: phase(self.start, self.request_sent, self.total_time),
        }
    }
}

fn phase(origin: Option<Instant>, from: Option<Instant>, to: Option<Instant>) -> PhaseDuration {
    PhaseDuration {
        duration: elapsed_between(from, to),
        total: elapsed_between(origin, to),
    }
}

fn elapsed_between(from: Option<Instant>, to: Option<Instant>) -> Duration {
    match (from, to) {
        (Some(start), Some(end)) => end.saturating_duration_since(start),
        _ => Duration::ZERO,
    }
}

/// Own duration of a phase and the cumulative time from connection acquisition to its end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseDuration {
    pub duration: Duration,
    pub total: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Durations {
    pub dns_lookup: PhaseDuration,
    pub tcp_connection: PhaseDuration,
    pub tls_handshake: PhaseDuration,
    pub connection_establishment: PhaseDuration,
    pub ttfb: PhaseDuration,
    pub total: PhaseDuration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsInfo {
    pub use_tls: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub server: Option<String>,
    pub powered_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestResult {
    pub resource: Arc<Resource>,
    /// Status line without the protocol, e.g. `200 OK`.
    pub status: String,
    pub status_code: u16,
    /// Advertised `Content-Length`, when present.
    pub content_length: Option<u64>,
    pub body_bytes: u64,
    pub timing: Timing,
    pub durations: Durations,
    pub tls: TlsInfo,
    pub headers: ResponseHeaders,
    pub error: Option<ConnectError>,
}

impl RequestResult {
    #[must_use]
    pub fn empty(resource: Arc<Resource>) -> Self {
        Self {
            resource,
            status: String::new(),
            status_code: 0,
            content_length: None,
            body_bytes: 0,
            timing: Timing::default(),
            durations: Durations::default(),
            tls: TlsInfo::default(),
            headers: ResponseHeaders::default(),
            error: None,
        }
    }
}

/// The unit collected by the scheduler: a request result plus the outer error, if any.
#[derive(Debug, Clone)]
pub struct MeasurementResult {
    pub request_result: RequestResult,
    pub error: Option<ResponseError>,
}

impl MeasurementResult {
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some() || self.request_result.error.is_some()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.request_result.resource.as_str()
    }
}
