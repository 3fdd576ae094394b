use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration;
use crate::error::ConfigError;

/// Every CLI option, optional. Keys are the long option names in snake case.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub urls: Option<Vec<String>>,
    pub requests: Option<u64>,
    pub concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub method: Option<String>,
    pub user_agent: Option<String>,
    pub user_agent_template: Option<String>,
    pub keep_alive: Option<bool>,
    pub max_idle_connections: Option<usize>,
    pub idle_conn_timeout: Option<DurationValue>,
    pub proxy: Option<String>,
    pub tls_handshake_timeout: Option<DurationValue>,
    pub ipv4: Option<bool>,
    pub ipv6: Option<bool>,
    pub insecure: Option<bool>,
    pub client_certificate: Option<String>,
    pub post_data_file: Option<String>,
    pub post_data: Option<String>,
    pub form_data: Option<String>,
    pub content_type: Option<String>,
    pub output_format: Option<String>,
    pub headers: Option<Vec<String>>,
    pub time_limit: Option<DurationValue>,
    pub url_list_file: Option<String>,
    pub exit_on_codes: Option<Vec<String>>,
}

/// A duration given as text (`"800ms"`, `"30s"`) or as integer milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Millis(millis) => Ok(Duration::from_millis(*millis)),
            DurationValue::Text(text) => {
                parse_duration(text).map_err(|source| ConfigError::InvalidDuration { field, source })
            }
        }
    }
}
