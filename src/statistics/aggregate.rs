use std::collections::BTreeMap;
use std::time::Duration;

use super::DECILE_SEGMENTS;
use super::math::{average, median, split_into_segments};
use super::types::{ErrorResult, PhaseStatistics, SingleUrlStatistics, Statistics};
use crate::http::MeasurementResult;

#[derive(Debug, Default)]
struct PhaseAccumulator {
    sum: Duration,
    min: Option<Duration>,
    max: Duration,
    pool: Vec<Duration>,
}

impl PhaseAccumulator {
    fn add(&mut self, value: Duration) {
        self.sum = self.sum.saturating_add(value);
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = self.max.max(value);
        self.pool.push(value);
    }

    /// `count` is the group size, failures included.
    fn finish(mut self, count: usize) -> PhaseStatistics {
        PhaseStatistics {
            avg: average(self.sum, count),
            median: median(&mut self.pool),
            min: self.min.unwrap_or_default(),
            max: self.max,
        }
    }
}

#[derive(Debug, Default)]
struct Phases {
    request_time: PhaseAccumulator,
    dns_lookup: PhaseAccumulator,
    tcp_connection: PhaseAccumulator,
    tls_handshake: PhaseAccumulator,
    connection_established: PhaseAccumulator,
    ttfb: PhaseAccumulator,
}

/// Groups results by URL and aggregates each group.
#[must_use]
pub fn get_statistics(results: &[MeasurementResult], test_duration: Duration) -> Statistics {
    let mut groups: BTreeMap<&str, Vec<&MeasurementResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.url()).or_default().push(result);
    }

    groups
        .into_iter()
        .map(|(url, group)| (url.to_owned(), single_url_statistics(&group, test_duration)))
        .collect()
}

/// Aggregates the results of one URL.
///
/// Averages divide by the number of results in the group, so failed requests
/// pull them down. Server headers come from the first result.
#[must_use]
pub fn single_url_statistics(
    results: &[&MeasurementResult],
    test_duration: Duration,
) -> SingleUrlStatistics {
    let mut stats = SingleUrlStatistics {
        total_time: test_duration,
        ..SingleUrlStatistics::default()
    };
    let mut phases = Phases::default();
    let mut errors: BTreeMap<String, u64> = BTreeMap::new();

    for result in results {
        let request = &result.request_result;
        if result.has_error() {
            increment(&mut stats.error_requests);
        } else {
            let durations = &request.durations;
            phases.request_time.add(durations.total.total);
            phases.dns_lookup.add(durations.dns_lookup.duration);
            phases.tcp_connection.add(durations.tcp_connection.duration);
            phases.tls_handshake.add(durations.tls_handshake.duration);
            phases
                .connection_established
                .add(durations.connection_establishment.duration);
            phases.ttfb.add(durations.ttfb.duration);

            increment(&mut stats.success_requests);
            increment(stats.status_codes.entry(request.status_code).or_default());
            let bucket = match request.status_code {
                200..=299 => &mut stats.code_2xx,
                300..=399 => &mut stats.code_3xx,
                400..=499 => &mut stats.code_4xx,
                500..=599 => &mut stats.code_5xx,
                _ => &mut stats.other_codes,
            };
            increment(bucket);
        }

        if let Some(error) = &result.error {
            increment(errors.entry(error.to_string()).or_default());
        }
        if let Some(error) = &request.error {
            increment(errors.entry(error.to_string()).or_default());
        }
        increment(&mut stats.total_requests);
    }

    if let Some(first) = results.first() {
        let headers = &first.request_result.headers;
        stats.server = headers.server.clone().filter(|server| !server.is_empty());
        stats.powered_by = headers.powered_by.clone().filter(|value| !value.is_empty());
    }

    let count = results.len();
    stats.total_time_percentage =
        split_into_segments(&mut phases.request_time.pool, DECILE_SEGMENTS);
    stats.request_time = phases.request_time.finish(count);
    stats.dns_lookup = phases.dns_lookup.finish(count);
    stats.tcp_connection = phases.tcp_connection.finish(count);
    stats.tls_handshake = phases.tls_handshake.finish(count);
    stats.connection_established = phases.connection_established.finish(count);
    stats.ttfb = phases.ttfb.finish(count);

    stats.errors = errors
        .into_iter()
        .map(|(message, occurrences)| ErrorResult {
            message,
            count: occurrences,
        })
        .collect();
    stats
}

const fn increment(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}
