use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use rustls::ClientConfig;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use url::{Host, Url};

use super::tls::version_label;
use super::trace::NetworkEventListener;
use super::types::{AddressFamily, TlsInfo};
use crate::error::{ConnectError, TesterError, TransportError};

const MAX_TUNNEL_RESPONSE_BYTES: usize = 16_384;

pub(crate) trait IoStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> IoStream for T {}

pub(crate) type BoxedStream = Box<dyn IoStream>;

/// Host and port of a connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Endpoint {
    pub(crate) fn from_url(url: &Url) -> Result<Self, TransportError> {
        let host = host_name(url)
            .ok_or_else(|| TransportError::Request(format!("missing host in {}", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| TransportError::Request(format!("missing port in {}", url)))?;
        Ok(Self { host, port })
    }

    /// `host:port`, bracketing IPv6 literals.
    pub(crate) fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// An HTTP forward proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProxyTarget {
    pub(crate) endpoint: Endpoint,
}

impl ProxyTarget {
    /// Accepts a full `http://` URL or a bare `host[:port]`.
    pub(crate) fn parse(raw: &str) -> Result<Self, TesterError> {
        let raw = raw.trim();
        let candidate = if raw.contains("://") {
            raw.to_owned()
        } else {
            format!("http://{}", raw)
        };
        let url = Url::parse(&candidate).map_err(|err| TesterError::InvalidProxy {
            url: raw.to_owned(),
            reason: err.to_string(),
        })?;
        if url.scheme() != "http" {
            return Err(TesterError::UnsupportedProxyScheme {
                scheme: url.scheme().to_owned(),
            });
        }
        let endpoint = Endpoint::from_url(&url).map_err(|err| TesterError::InvalidProxy {
            url: raw.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Self { endpoint })
    }
}

pub(crate) struct Connection {
    pub(crate) stream: BoxedStream,
    pub(crate) tls: TlsInfo,
}

/// Opens one fresh connection per request, reporting every milestone.
pub(crate) struct Transport {
    pub(crate) connect_timeout: Duration,
    pub(crate) tls_handshake_timeout: Duration,
    pub(crate) family: AddressFamily,
    pub(crate) proxy: Option<ProxyTarget>,
    pub(crate) connector: TlsConnector,
}

impl Transport {
    pub(crate) fn new(
        connect_timeout: Duration,
        tls_handshake_timeout: Duration,
        family: AddressFamily,
        proxy: Option<ProxyTarget>,
        tls: Arc<ClientConfig>,
    ) -> Self {
        Self {
            connect_timeout,
            tls_handshake_timeout,
            family,
            proxy,
            connector: TlsConnector::from(tls),
        }
    }

    pub(crate) async fn connect(
        &self,
        url: &Url,
        listener: &dyn NetworkEventListener,
    ) -> Result<Connection, TransportError> {
        let target = Endpoint::from_url(url)?;
        let use_tls = url.scheme() == "https";
        let dial_target = self
            .proxy
            .as_ref()
            .map_or(&target, |proxy| &proxy.endpoint);

        listener.get_conn(&target.authority());
        let addrs = self.resolve(dial_target, listener).await?;
        let mut tcp = self.dial(&addrs, listener).await?;
        if let Err(err) = tcp.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", err);
        }

        if use_tls && self.proxy.is_some() {
            timeout(self.connect_timeout, open_tunnel(&mut tcp, &target))
                .await
                .map_err(|_err| TransportError::Timeout {
                    phase: "proxy tunnel",
                })??;
        }

        let (stream, tls) = if use_tls {
            self.handshake(tcp, &target, listener).await?
        } else {
            (Box::new(tcp) as BoxedStream, TlsInfo::default())
        };

        listener.got_conn();
        Ok(Connection { stream, tls })
    }

    async fn resolve(
        &self,
        endpoint: &Endpoint,
        listener: &dyn NetworkEventListener,
    ) -> Result<Vec<SocketAddr>, TransportError> {
        let resolved: Vec<SocketAddr> = if let Ok(ip) = endpoint.host.parse::<IpAddr>() {
            vec![SocketAddr::new(ip, endpoint.port)]
        } else {
            listener.dns_start(&endpoint.host);
            let lookup = timeout(
                self.connect_timeout,
                lookup_host((endpoint.host.as_str(), endpoint.port)),
            )
            .await;
            match lookup {
                Ok(Ok(addrs)) => {
                    let addrs: Vec<SocketAddr> = addrs.collect();
                    listener.dns_done(&addrs);
                    addrs
                }
                Ok(Err(err)) => {
                    listener.dns_done(&[]);
                    return Err(TransportError::Dns {
                        host: endpoint.host.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(_) => {
                    listener.dns_done(&[]);
                    return Err(TransportError::Timeout { phase: "DNS lookup" });
                }
            }
        };

        let addrs: Vec<SocketAddr> = resolved
            .into_iter()
            .filter(|addr| self.family.matches(addr))
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::NoAddress {
                host: endpoint.host.clone(),
                family: self.family.label(),
            });
        }
        Ok(addrs)
    }

    async fn dial(
        &self,
        addrs: &[SocketAddr],
        listener: &dyn NetworkEventListener,
    ) -> Result<TcpStream, TransportError> {
        let mut last_error = None;
        for &addr in addrs {
            listener.connect_start(addr);
            let attempt = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout")),
            };
            match attempt {
                Ok(stream) => {
                    listener.connect_done(addr, None);
                    return Ok(stream);
                }
                Err(err) => {
                    listener.connect_done(addr, Some(&err));
                    last_error = Some(ConnectError {
                        addr,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Err(last_error.map_or_else(
            || TransportError::Request("no address to dial".to_owned()),
            TransportError::Connect,
        ))
    }

    async fn handshake(
        &self,
        tcp: TcpStream,
        target: &Endpoint,
        listener: &dyn NetworkEventListener,
    ) -> Result<(BoxedStream, TlsInfo), TransportError> {
        let server_name =
            ServerName::try_from(target.host.clone()).map_err(|err| TransportError::Tls {
                host: target.host.clone(),
                reason: err.to_string(),
            })?;

        listener.tls_handshake_start();
        let handshake = timeout(
            self.tls_handshake_timeout,
            self.connector.connect(server_name, tcp),
        )
        .await;

        match handshake {
            Ok(Ok(stream)) => {
                let (_, session) = stream.get_ref();
                let info = TlsInfo {
                    use_tls: true,
                    version: Some(version_label(session.protocol_version()).to_owned()),
                };
                listener.tls_handshake_done(&info);
                let stream: BoxedStream = Box::new(stream);
                Ok((stream, info))
            }
            Ok(Err(err)) => {
                listener.tls_handshake_done(&TlsInfo {
                    use_tls: true,
                    version: None,
                });
                Err(TransportError::Tls {
                    host: target.host.clone(),
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                listener.tls_handshake_done(&TlsInfo {
                    use_tls: true,
                    version: None,
                });
                Err(TransportError::Timeout {
                    phase: "TLS handshake",
                })
            }
        }
    }
}

/// Asks the proxy to open a raw tunnel to `target` and waits for a 2xx reply.
pub(crate) async fn open_tunnel<S>(stream: &mut S, target: &Endpoint) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let authority = target.authority();
    let tunnel_error = |reason: String| TransportError::ProxyTunnel {
        target: authority.clone(),
        reason,
    };

    let request = format!(
        "CONNECT {0} HTTP/1.1\r\nHost: {0}\r\n\r\n",
        authority
    );
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|err| tunnel_error(err.to_string()))?;

    let mut response = Vec::with_capacity(512);
    let mut chunk = [0_u8; 512];
    loop {
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| tunnel_error(err.to_string()))?;
        if read == 0 {
            return Err(tunnel_error("proxy closed the connection".to_owned()));
        }
        response.extend_from_slice(chunk.get(..read).unwrap_or_default());
        if response.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
        if response.len() > MAX_TUNNEL_RESPONSE_BYTES {
            return Err(tunnel_error("proxy response headers too large".to_owned()));
        }
    }

    let status_line = response
        .split(|byte| *byte == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).trim().to_owned())
        .unwrap_or_default();
    let status = status_line.split_whitespace().nth(1).unwrap_or_default();
    if status.starts_with('2') {
        Ok(())
    } else {
        Err(tunnel_error(format!("unexpected proxy response '{}'", status_line)))
    }
}

/// Host without IPv6 brackets.
pub(crate) fn host_name(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) if !domain.is_empty() => Some(domain.to_owned()),
        Host::Domain(_) => None,
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
    }
}
