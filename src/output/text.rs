use std::fmt::{self, Write as _};
use std::time::Duration;

use crate::statistics::{PhaseStatistics, SingleUrlStatistics, Statistics};

const LABEL_WIDTH: usize = 30;
const CONNECTION_HEADER_WIDTH: usize = 33;
const AVG_HEADER_WIDTH: usize = 13;
const MEDIAN_HEADER_WIDTH: usize = 17;
const VALUE_WIDTH: usize = 15;
const SEGMENT_WIDTH: usize = 7;
const SEPARATOR_WIDTH: usize = 85;
const SEGMENT_PERCENT: usize = 10;

/// Renders the human-readable report, one block per URL.
///
/// # Errors
///
/// Returns an error when writing into the report buffer fails.
pub fn render_text(stats: &Statistics) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let last = stats.len().saturating_sub(1);

    for (index, (url, stat)) in stats.iter().enumerate() {
        writeln!(out, "{}:", url)?;
        write_single_url(&mut out, stat)?;

        if index < last {
            out.push_str(&"─".repeat(SEPARATOR_WIDTH));
            out.push_str("\n\n");
        }
    }

    Ok(out)
}

fn write_single_url(out: &mut String, stat: &SingleUrlStatistics) -> fmt::Result {
    if let Some(server) = stat.server.as_deref() {
        line(out, "Server:", server)?;
    }
    if let Some(powered_by) = stat.powered_by.as_deref() {
        line(out, "Powered By:", powered_by)?;
    }

    line(out, "Complete requests:", stat.total_requests)?;
    line(out, "Successful requests:", stat.success_requests)?;
    line(out, "Failed requests:", stat.error_requests)?;

    out.push_str("\nPerformance Metrics:\n");
    line(out, "Total time taken for tests:", millis(stat.total_time))?;
    line(out, "Time per request (avg):", millis(stat.request_time.avg))?;
    line(out, "Time per request (median):", millis(stat.request_time.median))?;
    line(out, "Time per request (min):", millis(stat.request_time.min))?;
    line(out, "Time per request (max):", millis(stat.request_time.max))?;
    line(
        out,
        "Requests per second:",
        format_x100(stat.requests_per_second_x100()),
    )?;

    for (label, count) in [
        ("2xx responses:", stat.code_2xx),
        ("3xx responses:", stat.code_3xx),
        ("4xx responses:", stat.code_4xx),
        ("5xx responses:", stat.code_5xx),
        ("Other responses:", stat.other_codes),
    ] {
        if count > 0 {
            line(out, label, count)?;
        }
    }

    writeln!(
        out,
        "{}{}{}{}{}",
        pad_right("\nConnection Metrics:", CONNECTION_HEADER_WIDTH),
        pad_right("(avg)", AVG_HEADER_WIDTH),
        pad_right("(median)", MEDIAN_HEADER_WIDTH),
        pad_right("(min)", VALUE_WIDTH),
        pad_right("(max)", VALUE_WIDTH),
    )?;
    phase_row(out, "DNS lookup:", &stat.dns_lookup)?;
    phase_row(out, "TCP connection:", &stat.tcp_connection)?;
    phase_row(out, "TLS handshake:", &stat.tls_handshake)?;
    phase_row(out, "Connection established:", &stat.connection_established)?;
    phase_row(out, "TTFB:", &stat.ttfb)?;

    if !stat.total_time_percentage.is_empty() {
        out.push_str("\nPercentage of the requests served within a certain time (ms):\n");
        for result in &stat.total_time_percentage {
            let midpoint = result
                .min
                .saturating_add(result.max)
                .checked_div(2)
                .unwrap_or_default();
            let percent = result.segment.saturating_mul(SEGMENT_PERCENT);
            writeln!(
                out,
                "{}{}({} - {} ms)",
                pad_right(&format!("{}%", percent), SEGMENT_WIDTH),
                pad_right(&millis(midpoint), VALUE_WIDTH),
                millis_value(result.min),
                millis_value(result.max),
            )?;
        }
    }

    if !stat.errors.is_empty() {
        out.push_str("\nErrors:\n");
        for error in &stat.errors {
            writeln!(out, "{} ({} times)", error.message, error.count)?;
        }
    }
    Ok(())
}

fn line(out: &mut String, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(out, "{}{}", pad_right(label, LABEL_WIDTH), value)
}

fn phase_row(out: &mut String, label: &str, phase: &PhaseStatistics) -> fmt::Result {
    writeln!(
        out,
        "{}{}{}{}{}",
        pad_right(label, LABEL_WIDTH),
        pad_right(&millis(phase.avg), VALUE_WIDTH),
        pad_right(&millis(phase.median), VALUE_WIDTH),
        pad_right(&millis(phase.min), VALUE_WIDTH),
        pad_right(&millis(phase.max), VALUE_WIDTH),
    )
}

/// Pads `text` to `width` characters, always leaving at least one space.
fn pad_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count()).max(1);
    format!("{}{}", text, " ".repeat(padding))
}

fn millis(duration: Duration) -> String {
    format!("{} ms", millis_value(duration))
}

/// Milliseconds with three decimals, rounded to the nearest microsecond.
fn millis_value(duration: Duration) -> String {
    let micros = duration.as_nanos().saturating_add(500) / 1_000;
    format!("{}.{:03}", micros / 1_000, micros % 1_000)
}

fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}
