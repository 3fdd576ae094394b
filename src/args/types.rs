use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Delete,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method carry a body.
    #[must_use]
    pub const fn accepts_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    #[must_use]
    pub const fn to_http(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "DELETE" => Ok(HttpMethod::Delete),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(format!(
                "invalid method: {}. Allowed methods are: [GET HEAD DELETE POST PUT PATCH]",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Std,
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    /// Greeting and trailing blank lines are printed for human formats only.
    #[must_use]
    pub const fn is_human(self) -> bool {
        matches!(self, OutputFormat::Std | OutputFormat::Text)
    }

    #[must_use]
    pub const fn shows_progress(self) -> bool {
        matches!(self, OutputFormat::Std)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "std" => Ok(OutputFormat::Std),
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!(
                "invalid output format: {}. Allowed formats are: [std text json json-pretty]",
                s
            )),
        }
    }
}

/// An HTTP status code (or class of codes) that makes the run exit non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCodeTrigger {
    Exact(u16),
    /// `4xx` is stored as `Class(4)`.
    Class(u16),
}

impl StatusCodeTrigger {
    #[must_use]
    pub const fn matches(self, code: u16) -> bool {
        match self {
            StatusCodeTrigger::Exact(expected) => expected == code,
            StatusCodeTrigger::Class(class) => code / 100 == class,
        }
    }
}

impl std::str::FromStr for StatusCodeTrigger {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let invalid = || ValidationError::InvalidExitCodePattern {
            value: s.to_owned(),
        };
        if value.len() != 3 {
            return Err(invalid());
        }
        if let Some(class) = value.strip_suffix("xx") {
            let class: u16 = class.parse().map_err(|_err| invalid())?;
            if !(1..=5).contains(&class) {
                return Err(invalid());
            }
            return Ok(StatusCodeTrigger::Class(class));
        }
        let code: u16 = value.parse().map_err(|_err| invalid())?;
        if !(100..=599).contains(&code) {
            return Err(invalid());
        }
        Ok(StatusCodeTrigger::Exact(code))
    }
}
