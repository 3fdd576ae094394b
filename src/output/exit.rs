use crate::args::StatusCodeTrigger;
use crate::statistics::Statistics;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

/// Process exit code for a finished run.
///
/// Non-zero when any URL recorded an error or returned a status code that
/// matches one of `triggers`.
#[must_use]
pub fn exit_code(stats: &Statistics, triggers: &[StatusCodeTrigger]) -> i32 {
    let failed = stats.values().any(|stat| {
        stat.has_errors()
            || stat
                .status_codes
                .keys()
                .any(|code| triggers.iter().any(|trigger| trigger.matches(*code)))
    });
    if failed { EXIT_FAILURE } else { EXIT_SUCCESS }
}
