use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run before any request is issued.
#[derive(Debug, Error)]
pub enum TesterError {
    #[error("Unsupported protocol '{scheme}'.")]
    UnsupportedScheme { scheme: String },
    #[error("URL list is empty. No resources to test.")]
    EmptyResourceSet,
    #[error("Failed to read client certificate file: {}. Error: {source}", path.display())]
    CertificateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to load client certificate and key pair, file: {}. Error: {reason}", path.display())]
    CertificateFileFormat { path: PathBuf, reason: String },
    #[error("Failed to read post data file '{}': {source}", path.display())]
    PostDataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to build TLS configuration: {source}")]
    TlsConfig {
        #[source]
        source: rustls::Error,
    },
    #[error("Invalid proxy URL '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },
    #[error("Unsupported proxy scheme '{scheme}'. Only http proxies are supported.")]
    UnsupportedProxyScheme { scheme: String },
    #[error("Worker task failed: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
}

/// A per-request transport failure. Recorded on the result, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    Request(String),
    #[error("lookup {host}: {reason}")]
    Dns { host: String, reason: String },
    #[error("no {family} address found for {host}")]
    NoAddress { host: String, family: &'static str },
    #[error("{0}")]
    Connect(ConnectError),
    #[error("proxy tunnel to {target} failed: {reason}")]
    ProxyTunnel { target: String, reason: String },
    #[error("TLS handshake with {host} failed: {reason}")]
    Tls { host: String, reason: String },
    #[error("HTTP handshake failed: {0}")]
    Handshake(String),
    #[error("{phase} timeout exceeded")]
    Timeout { phase: &'static str },
    #[error("{0}")]
    Http(String),
    #[error("reading body: {0}")]
    Body(String),
}

/// Connect-level failure captured by the TCP connect hook.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unable to connect to host {addr}: {reason}")]
pub struct ConnectError {
    pub addr: SocketAddr,
    pub reason: String,
}

/// The outer error attached to a measurement when the exchange did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}. Error: {source}")]
pub struct ResponseError {
    pub message: String,
    #[source]
    pub source: TransportError,
}

impl ResponseError {
    #[must_use]
    pub fn read_failed(source: TransportError) -> Self {
        Self {
            message: "Failed to read response".to_owned(),
            source,
        }
    }
}
