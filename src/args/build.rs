use std::path::{Path, PathBuf};

use tracing::warn;

use super::cli::TesterArgs;
use super::defaults::user_agent_for;
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{Parameters, Resource};

/// Turns validated arguments into run parameters.
///
/// URLs come from the list file when one is given, otherwise from the
/// positional arguments. Unparseable URLs are skipped with a warning. The
/// per-URL request count is multiplied by the number of usable resources.
///
/// # Errors
///
/// Returns an error when the list file cannot be read or no usable URL remains.
pub fn build_parameters(args: &TesterArgs) -> AppResult<Parameters> {
    let links = match args.url_list_file.as_deref().filter(|path| !path.is_empty()) {
        Some(path) => read_url_list(Path::new(path))?,
        None => args.urls.clone(),
    };

    let resources: Vec<Resource> = links
        .iter()
        .filter_map(|link| match Resource::parse(link) {
            Ok(resource) => Some(resource),
            Err(err) => {
                warn!("Skipping invalid url: {} ({})", link, err);
                None
            }
        })
        .collect();

    if resources.is_empty() {
        return Err(AppError::validation(ValidationError::MissingUrl));
    }

    let resource_count = u64::try_from(resources.len()).unwrap_or(u64::MAX);
    let mut parameters = Parameters::new(resources);
    parameters.requests = args.requests.saturating_mul(resource_count);
    parameters.concurrency = args.concurrency;
    parameters.timeout = args.timeout;
    parameters.method = args.method;
    parameters.user_agent = args.user_agent.clone();
    parameters.user_agent_template = args
        .user_agent_template
        .clone()
        .filter(|template| user_agent_for(template).is_some());
    parameters.keep_alive = args.keep_alive;
    parameters.proxy = non_empty(args.proxy.as_deref());
    parameters.max_idle_connections = args.max_idle_connections;
    parameters.idle_conn_timeout = args.idle_conn_timeout;
    parameters.tls_handshake_timeout = args.tls_handshake_timeout;
    parameters.ipv4_only = args.ipv4_only;
    parameters.ipv6_only = args.ipv6_only;
    parameters.allow_insecure_tls = args.insecure;
    parameters.client_certificate_file = non_empty(args.client_certificate.as_deref()).map(PathBuf::from);
    parameters.post_data_file = non_empty(args.post_data_file.as_deref()).map(PathBuf::from);
    parameters.post_data = non_empty(args.post_data.as_deref());
    parameters.form_data = non_empty(args.form_data.as_deref());
    parameters.content_type = args.content_type.clone();
    parameters.custom_headers = args.headers.clone();
    parameters.time_limit = args.time_limit;
    parameters.output_format = args.output_format;
    parameters.exit_on_codes = args.exit_on_codes.clone();

    Ok(parameters)
}

/// Reads one URL per line, skipping blank lines.
///
/// # Errors
///
/// Returns [`ValidationError::ReadUrlList`] when the file cannot be read.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, ValidationError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| ValidationError::ReadUrlList {
            path: path.display().to_string(),
            source,
        })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|text| !text.is_empty()).map(str::to_owned)
}
