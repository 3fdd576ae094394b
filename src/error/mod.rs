mod app;
mod config;
mod http;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::{ConnectError, ResponseError, TesterError, TransportError};
pub use validation::ValidationError;
