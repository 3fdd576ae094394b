use crate::statistics::Statistics;

/// Serialises the statistics map; durations are integer nanoseconds.
///
/// # Errors
///
/// Returns an error when serialisation fails.
pub fn render_json(stats: &Statistics, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(stats)
    } else {
        serde_json::to_string(stats)
    }
}
