use std::time::Duration;

use super::types::QuantileResult;

/// `sum / count`, zero when `count` is zero.
#[must_use]
pub fn average(sum: Duration, count: usize) -> Duration {
    let Ok(count) = u128::try_from(count) else {
        return Duration::ZERO;
    };
    sum.as_nanos()
        .checked_div(count)
        .map_or(Duration::ZERO, |nanos| {
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        })
}

/// Sorts `values` in place and returns the median; the mean of the two
/// middle values for an even count, zero when empty.
#[must_use]
pub fn median(values: &mut [Duration]) -> Duration {
    values.sort_unstable();
    let len = values.len();
    if len == 0 {
        return Duration::ZERO;
    }
    let middle = len / 2;
    let upper = values.get(middle).copied().unwrap_or_default();
    if len % 2 == 1 {
        return upper;
    }
    let lower = middle
        .checked_sub(1)
        .and_then(|index| values.get(index))
        .copied()
        .unwrap_or_default();
    lower.saturating_add(upper).checked_div(2).unwrap_or_default()
}

/// Sorts `values` and splits them into `segments` equal chunks.
///
/// Fewer values than segments yield one segment spanning the whole pool,
/// numbered `segments`. Values left over by the integer division are dropped.
#[must_use]
pub fn split_into_segments(values: &mut [Duration], segments: usize) -> Vec<QuantileResult> {
    let len = values.len();
    if len == 0 || segments == 0 {
        return Vec::new();
    }
    values.sort_unstable();

    let first = values.first().copied().unwrap_or_default();
    let last = values.last().copied().unwrap_or_default();
    if len < segments {
        return vec![QuantileResult {
            segment: segments,
            min: first,
            max: last,
        }];
    }

    let Some(size) = len.checked_div(segments) else {
        return Vec::new();
    };
    values
        .chunks_exact(size)
        .take(segments)
        .enumerate()
        .map(|(index, chunk)| QuantileResult {
            segment: index.saturating_add(1),
            min: chunk.first().copied().unwrap_or_default(),
            max: chunk.last().copied().unwrap_or_default(),
        })
        .collect()
}
