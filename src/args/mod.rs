//! CLI argument types, validation and parameter building.
mod build;
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;
mod validate;


pub use build::{build_parameters, read_url_list};
pub use cli::TesterArgs;
pub use defaults::{DEFAULT_USER_AGENT, USER_AGENT_TEMPLATES, user_agent_for};
pub use types::{HttpMethod, OutputFormat, StatusCodeTrigger};
pub use validate::validate;

pub(crate) use defaults::{
    DEFAULT_CONTENT_TYPE, DEFAULT_IDLE_CONN_TIMEOUT, DEFAULT_MAX_IDLE_CONNECTIONS,
    DEFAULT_TIMEOUT, DEFAULT_TLS_HANDSHAKE_TIMEOUT,
};
pub(crate) use parsers::{parse_duration, parse_header};
