use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Statistics keyed by URL, in URL order.
pub type Statistics = BTreeMap<String, SingleUrlStatistics>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStatistics {
    #[serde(serialize_with = "as_nanos")]
    pub avg: Duration,
    #[serde(serialize_with = "as_nanos")]
    pub median: Duration,
    #[serde(serialize_with = "as_nanos")]
    pub min: Duration,
    #[serde(serialize_with = "as_nanos")]
    pub max: Duration,
}

/// One latency segment. `segment` is 1-based; a lone segment covering a small pool is numbered 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantileResult {
    pub segment: usize,
    #[serde(serialize_with = "as_nanos")]
    pub min: Duration,
    #[serde(serialize_with = "as_nanos")]
    pub max: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SingleUrlStatistics {
    pub server: Option<String>,
    pub powered_by: Option<String>,

    /// Wall-clock duration of the whole run.
    #[serde(serialize_with = "as_nanos")]
    pub total_time: Duration,

    pub request_time: PhaseStatistics,
    pub dns_lookup: PhaseStatistics,
    pub tcp_connection: PhaseStatistics,
    pub tls_handshake: PhaseStatistics,
    pub connection_established: PhaseStatistics,
    pub ttfb: PhaseStatistics,
    pub total_time_percentage: Vec<QuantileResult>,

    pub error_requests: u64,
    pub success_requests: u64,
    pub total_requests: u64,
    pub code_2xx: u64,
    pub code_3xx: u64,
    pub code_4xx: u64,
    pub code_5xx: u64,
    pub other_codes: u64,
    /// Exact status code counts of successful requests.
    pub status_codes: BTreeMap<u16, u64>,

    pub errors: Vec<ErrorResult>,
}

impl SingleUrlStatistics {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Requests per second over the whole run, scaled by 100 and rounded;
    /// zero for an instantaneous run.
    #[must_use]
    pub fn requests_per_second_x100(&self) -> u64 {
        u128::from(self.total_requests)
            .saturating_mul(RATE_X1000_NANOS)
            .checked_div(self.total_time.as_nanos())
            .map_or(0, |rate_x1000| {
                u64::try_from(rate_x1000.saturating_add(5) / 10).unwrap_or(u64::MAX)
            })
    }
}

/// One second in nanoseconds, times 1000 for the extra rounding digit.
const RATE_X1000_NANOS: u128 = 1_000_000_000_000;

fn as_nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}
