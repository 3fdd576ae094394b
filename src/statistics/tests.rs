use super::*;
use crate::error::{ConnectError, ResponseError, TransportError};
use crate::http::{MeasurementResult, PhaseDuration, RequestResult, Resource};
use std::sync::Arc;
use std::time::Duration;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

struct Sample {
    url: &'static str,
    status_code: u16,
    total: u64,
    ttfb: u64,
    error: Option<&'static str>,
    server: Option<&'static str>,
}

impl Sample {
    fn ok(url: &'static str, status_code: u16, total: u64) -> Self {
        Self {
            url,
            status_code,
            total,
            ttfb: total / 2,
            error: None,
            server: None,
        }
    }
}

fn measurement(sample: &Sample) -> Result<MeasurementResult, String> {
    let resource = Resource::parse(sample.url).map_err(|err| err.to_string())?;
    let mut request_result = RequestResult::empty(Arc::new(resource));
    request_result.status_code = sample.status_code;
    request_result.durations.total = PhaseDuration {
        duration: ms(sample.total),
        total: ms(sample.total),
    };
    request_result.durations.ttfb = PhaseDuration {
        duration: ms(sample.ttfb),
        total: ms(sample.ttfb),
    };
    request_result.headers.server = sample.server.map(str::to_owned);
    Ok(MeasurementResult {
        request_result,
        error: sample
            .error
            .map(|message| ResponseError::read_failed(TransportError::Http(message.to_owned()))),
    })
}

fn measurements(samples: &[Sample]) -> Result<Vec<MeasurementResult>, String> {
    samples.iter().map(measurement).collect()
}

#[test]
fn median_of_odd_and_even_pools() -> Result<(), String> {
    let odd = median(&mut [ms(30), ms(10), ms(20)]);
    let even = median(&mut [ms(40), ms(10), ms(30), ms(20)]);
    let empty = median(&mut []);
    if odd != ms(20) || even != ms(25) || empty != Duration::ZERO {
        return Err(format!("Unexpected medians: {:?} {:?} {:?}", odd, even, empty));
    }
    Ok(())
}

#[test]
fn deciles_of_ten_values_are_singletons() -> Result<(), String> {
    let mut values: Vec<Duration> = (1..=10).rev().map(ms).collect();
    let segments = split_into_segments(&mut values, DECILE_SEGMENTS);
    if segments.len() != 10 {
        return Err(format!("Expected 10 segments, got {}", segments.len()));
    }
    for (index, segment) in segments.iter().enumerate() {
        let ordinal = index.saturating_add(1);
        let expected = ms(u64::try_from(ordinal).map_err(|err| err.to_string())?);
        if segment.segment != ordinal || segment.min != expected || segment.max != expected {
            return Err(format!("Unexpected segment {:?}", segment));
        }
    }
    Ok(())
}

#[test]
fn deciles_of_small_pool_yield_one_segment() -> Result<(), String> {
    let segments = split_into_segments(&mut [ms(15), ms(5), ms(10)], DECILE_SEGMENTS);
    let expected = vec![QuantileResult {
        segment: 10,
        min: ms(5),
        max: ms(15),
    }];
    if segments != expected {
        return Err(format!("Unexpected segments: {:?}", segments));
    }
    if !split_into_segments(&mut [], DECILE_SEGMENTS).is_empty() {
        return Err("Empty pool must yield no segments".to_owned());
    }
    Ok(())
}

#[test]
fn deciles_drop_remainder() -> Result<(), String> {
    let mut values: Vec<Duration> = (1..=25).map(ms).collect();
    let segments = split_into_segments(&mut values, DECILE_SEGMENTS);
    let last = segments.last().ok_or("Expected segments")?;
    if segments.len() != 10 || last.min != ms(19) || last.max != ms(20) {
        return Err(format!("Unexpected last segment: {:?}", last));
    }
    let first = segments.first().ok_or("Expected segments")?;
    if first.min != ms(1) || first.max != ms(2) {
        return Err(format!("Unexpected first segment: {:?}", first));
    }
    Ok(())
}

#[test]
fn average_handles_zero_count() -> Result<(), String> {
    if average(ms(30), 3) != ms(10) || average(ms(30), 0) != Duration::ZERO {
        return Err("Unexpected average".to_owned());
    }
    Ok(())
}

#[test]
fn aggregation_counts_and_buckets() -> Result<(), String> {
    let results = measurements(&[
        Sample::ok("http://a.test/", 200, 10),
        Sample::ok("http://a.test/", 204, 30),
        Sample::ok("http://a.test/", 301, 20),
        Sample::ok("http://a.test/", 404, 40),
        Sample::ok("http://a.test/", 503, 50),
        Sample::ok("http://a.test/", 600, 60),
    ])?;
    let stats = get_statistics(&results, Duration::from_secs(2));
    let single = stats.get("http://a.test/").ok_or("Missing URL")?;

    let counts = (
        single.total_requests,
        single.success_requests,
        single.error_requests,
        single.code_2xx,
        single.code_3xx,
        single.code_4xx,
        single.code_5xx,
        single.other_codes,
    );
    if counts != (6, 6, 0, 2, 1, 1, 1, 1) {
        return Err(format!("Unexpected counts: {:?}", counts));
    }
    if single.status_codes.get(&204) != Some(&1) || single.status_codes.len() != 6 {
        return Err(format!("Unexpected status codes: {:?}", single.status_codes));
    }
    let request_time = single.request_time;
    if request_time.avg != ms(35)
        || request_time.median != ms(35)
        || request_time.min != ms(10)
        || request_time.max != ms(60)
    {
        return Err(format!("Unexpected request time: {:?}", request_time));
    }
    if single.total_time != Duration::from_secs(2) || single.requests_per_second_x100() != 300 {
        return Err("Unexpected run totals".to_owned());
    }
    if single.total_time_percentage.len() != 1 {
        return Err("Six values yield a single segment".to_owned());
    }
    Ok(())
}

#[test]
fn average_divides_by_all_results_including_failures() -> Result<(), String> {
    let mut failed = Sample::ok("http://a.test/", 0, 0);
    failed.error = Some("boom");
    let results = measurements(&[
        Sample::ok("http://a.test/", 200, 10),
        Sample::ok("http://a.test/", 200, 20),
        failed,
    ])?;
    let stats = get_statistics(&results, Duration::from_secs(1));
    let single = stats.get("http://a.test/").ok_or("Missing URL")?;

    if single.request_time.avg != ms(10) {
        return Err(format!(
            "Expected (10 + 20) / 3 = 10ms, got {:?}",
            single.request_time.avg
        ));
    }
    if single.request_time.median != ms(15) || single.request_time.min != ms(10) {
        return Err("Failed requests must not enter the pools".to_owned());
    }
    if single.error_requests != 1 || single.success_requests != 2 {
        return Err("Unexpected success/error split".to_owned());
    }
    Ok(())
}

#[test]
fn zero_length_phase_is_a_valid_minimum() -> Result<(), String> {
    let results = measurements(&[
        Sample::ok("http://a.test/", 200, 0),
        Sample::ok("http://a.test/", 200, 8),
    ])?;
    let stats = get_statistics(&results, Duration::from_secs(1));
    let single = stats.get("http://a.test/").ok_or("Missing URL")?;
    if single.request_time.min != Duration::ZERO || single.request_time.max != ms(8) {
        return Err(format!("Unexpected min/max: {:?}", single.request_time));
    }
    Ok(())
}

#[test]
fn errors_are_tallied_and_sorted() -> Result<(), String> {
    let mut b = Sample::ok("http://a.test/", 0, 0);
    b.error = Some("b failure");
    let mut a = Sample::ok("http://a.test/", 0, 0);
    a.error = Some("a failure");
    let mut b_again = Sample::ok("http://a.test/", 0, 0);
    b_again.error = Some("b failure");
    let mut results = measurements(&[b, a, b_again])?;

    let addr: std::net::SocketAddr = "127.0.0.1:1".parse().map_err(|err| format!("{}", err))?;
    if let Some(first) = results.first_mut() {
        first.request_result.error = Some(ConnectError {
            addr,
            reason: "connection refused".to_owned(),
        });
    }

    let stats = get_statistics(&results, Duration::from_secs(1));
    let single = stats.get("http://a.test/").ok_or("Missing URL")?;
    let tallies: Vec<(String, u64)> = single
        .errors
        .iter()
        .map(|error| (error.message.clone(), error.count))
        .collect();
    let expected = vec![
        ("Failed to read response. Error: a failure".to_owned(), 1),
        ("Failed to read response. Error: b failure".to_owned(), 2),
        (
            "Unable to connect to host 127.0.0.1:1: connection refused".to_owned(),
            1,
        ),
    ];
    if tallies != expected {
        return Err(format!("Unexpected errors: {:?}", tallies));
    }
    if !single.has_errors() || single.error_requests != 3 {
        return Err("Expected three failed requests".to_owned());
    }
    Ok(())
}

#[test]
fn results_are_grouped_per_url() -> Result<(), String> {
    let mut first_b = Sample::ok("http://b.test/", 200, 5);
    first_b.server = Some("nginx");
    let mut second_b = Sample::ok("http://b.test/", 200, 7);
    second_b.server = Some("apache");
    let results = measurements(&[
        Sample::ok("http://a.test/", 200, 1),
        first_b,
        second_b,
    ])?;
    let stats = get_statistics(&results, Duration::from_secs(1));

    let urls: Vec<&str> = stats.keys().map(String::as_str).collect();
    if urls != ["http://a.test/", "http://b.test/"] {
        return Err(format!("Unexpected URLs: {:?}", urls));
    }
    let b = stats.get("http://b.test/").ok_or("Missing b")?;
    if b.total_requests != 2 || b.server.as_deref() != Some("nginx") {
        return Err(format!("Unexpected b statistics: {:?}", b));
    }
    if b.ttfb.max != ms(3) {
        return Err(format!("Unexpected ttfb: {:?}", b.ttfb));
    }
    Ok(())
}

#[test]
fn statistics_serialize_durations_as_nanoseconds() -> Result<(), String> {
    let results = measurements(&[Sample::ok("http://a.test/", 200, 2)])?;
    let stats = get_statistics(&results, Duration::from_secs(1));
    let value = serde_json::to_value(&stats).map_err(|err| err.to_string())?;
    let single = value.get("http://a.test/").ok_or("Missing URL")?;

    let total = single.get("total_time").and_then(serde_json::Value::as_u64);
    let avg = single
        .get("request_time")
        .and_then(|phase| phase.get("avg"))
        .and_then(serde_json::Value::as_u64);
    if total != Some(1_000_000_000) || avg != Some(2_000_000) {
        return Err(format!("Unexpected JSON durations: {:?} {:?}", total, avg));
    }
    Ok(())
}
