use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{
    CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST, HeaderName, HeaderValue, SERVER, USER_AGENT,
};
use http::{HeaderMap, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

use super::engine::{EngineFactory, TestEngine};
use super::tls::build_client_config;
use super::trace::{ObservedStream, TimingRecorder};
use super::transport::{ProxyTarget, Transport};
use super::types::{MeasurementResult, Parameters, RequestResult, Resource};
use crate::args::user_agent_for;
use crate::error::{ResponseError, TesterError, TransportError};

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const POWERED_BY: &str = "x-powered-by";

/// Where the request body comes from. The file wins over form data, form data over a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodySource<'a> {
    File(&'a Path),
    Form(&'a str),
    Literal(&'a str),
}

pub(crate) fn select_body_source(parameters: &Parameters) -> Option<BodySource<'_>> {
    if !parameters.method.accepts_body() {
        return None;
    }
    if let Some(path) = parameters.post_data_file.as_deref() {
        return Some(BodySource::File(path));
    }
    if let Some(form) = parameters.form_data.as_deref().filter(|form| !form.is_empty()) {
        return Some(BodySource::Form(form));
    }
    parameters
        .post_data
        .as_deref()
        .filter(|data| !data.is_empty())
        .map(BodySource::Literal)
}

/// Immutable per-run request settings, shared by every request.
#[derive(Debug)]
pub(crate) struct RequestTemplate {
    pub(crate) method: Method,
    pub(crate) body: Option<Bytes>,
    pub(crate) content_type: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) keep_alive: bool,
    pub(crate) custom_headers: Vec<(String, String)>,
    pub(crate) absolute_form: bool,
}

impl RequestTemplate {
    pub(crate) fn from_parameters(parameters: &Parameters) -> Result<Self, TesterError> {
        let (body, is_form) = match select_body_source(parameters) {
            Some(BodySource::File(path)) => {
                let data = std::fs::read(path).map_err(|source| TesterError::PostDataFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                (Some(Bytes::from(data)), false)
            }
            Some(BodySource::Form(form)) => (Some(Bytes::from(form.to_owned())), true),
            Some(BodySource::Literal(data)) => (Some(Bytes::from(data.to_owned())), false),
            None => (None, false),
        };

        let content_type = if is_form {
            Some(FORM_CONTENT_TYPE.to_owned())
        } else {
            Some(parameters.content_type.trim().to_owned()).filter(|value| !value.is_empty())
        };

        let user_agent = parameters
            .user_agent_template
            .as_deref()
            .and_then(user_agent_for)
            .map_or_else(|| parameters.user_agent.clone(), str::to_owned);

        Ok(Self {
            method: parameters.method.to_http(),
            body,
            content_type,
            user_agent,
            keep_alive: parameters.keep_alive,
            custom_headers: parameters.custom_headers.clone(),
            absolute_form: parameters.proxy.as_deref().is_some_and(|proxy| !proxy.is_empty()),
        })
    }

    /// Default headers first, then custom headers, which replace same-named ones.
    pub(crate) fn headers(&self, url: &Url) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, header_value(&host_header(url))?);
        headers.insert(USER_AGENT, header_value(&self.user_agent)?);
        if let Some(content_type) = &self.content_type {
            headers.insert(CONTENT_TYPE, header_value(content_type)?);
        }
        if !self.keep_alive {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
        }
        for (name, value) in &self.custom_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                TransportError::Request(format!("invalid header name '{}': {}", name, err))
            })?;
            headers.insert(name, header_value(value)?);
        }
        Ok(headers)
    }

    pub(crate) fn request_uri(&self, url: &Url) -> Result<Uri, TransportError> {
        let target = if self.absolute_form && url.scheme() == "http" {
            let mut absolute = url.clone();
            absolute.set_fragment(None);
            String::from(absolute)
        } else {
            origin_form(url)
        };
        target
            .parse::<Uri>()
            .map_err(|err| TransportError::Request(format!("invalid URI '{}': {}", target, err)))
    }

    pub(crate) fn build(&self, url: &Url) -> Result<Request<Full<Bytes>>, TransportError> {
        let mut request = Request::new(Full::new(self.body.clone().unwrap_or_default()));
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = self.request_uri(url)?;
        *request.headers_mut() = self.headers(url)?;
        Ok(request)
    }
}

/// `host[:port]`, with the port only when it is not the scheme default.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    url.port()
        .map_or_else(|| host.to_owned(), |port| format!("{}:{}", host, port))
}

/// Path and query of `url`; never empty.
fn origin_form(url: &Url) -> String {
    let mut target = String::from(url.path());
    if target.is_empty() {
        target.push('/');
    }
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value)
        .map_err(|err| TransportError::Request(format!("invalid header value '{}': {}", value, err)))
}

/// Status line without the protocol: `200 OK`, or just the code for unknown reasons.
pub(crate) fn status_text(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(
        || status.as_u16().to_string(),
        |reason| format!("{} {}", status.as_u16(), reason),
    )
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn drain_body(mut body: Incoming) -> Result<u64, TransportError> {
    let mut total: u64 = 0;
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|err| TransportError::Body(err.to_string()))?;
        if let Some(data) = frame.data_ref() {
            total = total.saturating_add(u64::try_from(data.len()).unwrap_or(u64::MAX));
        }
    }
    Ok(total)
}

/// HTTP/1.1 engine that opens a fresh instrumented connection for every request.
pub struct HttpEngine {
    template: RequestTemplate,
    transport: Transport,
    timeout: Duration,
}

impl HttpEngine {
    /// Loads certificates, post data and proxy settings once.
    ///
    /// # Errors
    ///
    /// Returns the setup failure; nothing has been sent at this point.
    pub fn new(parameters: &Parameters) -> Result<Self, TesterError> {
        let tls = build_client_config(
            parameters.allow_insecure_tls,
            parameters.client_certificate_file.as_deref(),
        )?;
        let proxy = parameters
            .proxy
            .as_deref()
            .filter(|proxy| !proxy.is_empty())
            .map(ProxyTarget::parse)
            .transpose()?;

        Ok(Self {
            template: RequestTemplate::from_parameters(parameters)?,
            transport: Transport::new(
                parameters.timeout,
                parameters.tls_handshake_timeout,
                parameters.address_family(),
                proxy,
                tls,
            ),
            timeout: parameters.timeout,
        })
    }

    #[must_use]
    pub fn factory() -> EngineFactory {
        Arc::new(|parameters: &Parameters| {
            let engine: Arc<dyn TestEngine> = Arc::new(HttpEngine::new(parameters)?);
            Ok(engine)
        })
    }

    /// Performs one request. Transport failures are recorded on the result, never returned.
    pub async fn execute(&self, resource: Arc<Resource>) -> MeasurementResult {
        let recorder = Arc::new(TimingRecorder::new());
        let mut request_result = RequestResult::empty(resource);

        let outcome = self.exchange(&recorder, &mut request_result).await;

        let (timing, connect_error) = recorder.finish(Instant::now());
        let timing = timing.normalized();
        request_result.durations = timing.durations();
        request_result.timing = timing;
        request_result.error = connect_error;

        let error = outcome.err().map(|err| {
            debug!("Request to {} failed: {}", request_result.resource.as_str(), err);
            ResponseError::read_failed(err)
        });

        MeasurementResult {
            request_result,
            error,
        }
    }

    async fn exchange(
        &self,
        recorder: &Arc<TimingRecorder>,
        result: &mut RequestResult,
    ) -> Result<(), TransportError> {
        let resource = Arc::clone(&result.resource);
        let request = self.template.build(&resource.url)?;

        let connection = self
            .transport
            .connect(&resource.url, recorder.as_ref())
            .await?;
        result.tls = connection.tls;

        let io = TokioIo::new(ObservedStream::new(connection.stream, recorder.clone()));
        let (mut sender, conn) = http1::handshake::<_, Full<Bytes>>(io)
            .await
            .map_err(|err| TransportError::Handshake(err.to_string()))?;
        let driver = tokio::spawn(async move {
            if let Err(err) = conn.await {
                debug!("Connection closed with error: {}", err);
            }
        });

        let outcome = self.read_response(&mut sender, request, result).await;
        driver.abort();
        outcome
    }

    async fn read_response(
        &self,
        sender: &mut http1::SendRequest<Full<Bytes>>,
        request: Request<Full<Bytes>>,
        result: &mut RequestResult,
    ) -> Result<(), TransportError> {
        let response = timeout(self.timeout, sender.send_request(request))
            .await
            .map_err(|_err| TransportError::Timeout {
                phase: "awaiting response headers",
            })?
            .map_err(|err| TransportError::Http(err.to_string()))?;

        let (parts, body) = response.into_parts();
        result.status_code = parts.status.as_u16();
        result.status = status_text(parts.status);
        result.content_length = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());
        result.headers.server = header_text(&parts.headers, SERVER.as_str());
        result.headers.powered_by = header_text(&parts.headers, POWERED_BY);

        result.body_bytes = timeout(self.timeout, drain_body(body))
            .await
            .map_err(|_err| TransportError::Timeout {
                phase: "reading response body",
            })??;
        Ok(())
    }
}

#[async_trait]
impl TestEngine for HttpEngine {
    async fn measure(&self, resource: Arc<Resource>) -> MeasurementResult {
        self.execute(resource).await
    }
}
