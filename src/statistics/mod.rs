//! Per-URL aggregation of measurement results.
mod aggregate;
mod math;
mod types;

#[cfg(test)]
mod tests;

pub use aggregate::{get_statistics, single_url_statistics};
pub use math::{average, median, split_into_segments};
pub use types::{ErrorResult, PhaseStatistics, QuantileResult, SingleUrlStatistics, Statistics};

/// Number of latency segments reported per URL.
pub const DECILE_SEGMENTS: usize = 10;
