use super::cli::TesterArgs;
use super::defaults::{USER_AGENT_LIST_KEYWORD, user_agent_for, user_agent_table};
use crate::error::ValidationError;

/// Checks option combinations that clap cannot express.
///
/// # Errors
///
/// Returns the first violated rule. Asking for the `list` template is reported
/// as [`ValidationError::UserAgentTemplateList`] so the caller can print the table.
pub fn validate(args: &TesterArgs) -> Result<(), ValidationError> {
    if post_data_sources(args) > 1 {
        return Err(ValidationError::MultiplePostDataSources);
    }

    if args.concurrency == 0 {
        return Err(ValidationError::ConcurrencyZero);
    }

    let concurrency = u64::try_from(args.concurrency).unwrap_or(u64::MAX);
    if args.time_limit().is_none() && args.requests < concurrency {
        return Err(ValidationError::ConcurrencyExceedsRequests);
    }

    if is_set(args.form_data.as_deref()) {
        if args.content_type.trim().is_empty() {
            return Err(ValidationError::FormDataRequiresContentType);
        }
        if !args.method.accepts_body() {
            return Err(ValidationError::FormDataRequiresBodyMethod {
                method: args.method.as_str().to_owned(),
            });
        }
    }

    if let Some(template) = args.user_agent_template.as_deref().filter(|t| !t.is_empty()) {
        if template == USER_AGENT_LIST_KEYWORD {
            return Err(ValidationError::UserAgentTemplateList {
                table: user_agent_table(),
            });
        }
        if user_agent_for(template).is_none() {
            return Err(ValidationError::InvalidUserAgentTemplate {
                name: template.to_owned(),
            });
        }
    }

    Ok(())
}

fn post_data_sources(args: &TesterArgs) -> usize {
    [
        args.form_data.as_deref(),
        args.post_data.as_deref(),
        args.post_data_file.as_deref(),
    ]
    .into_iter()
    .filter(|source| is_set(*source))
    .count()
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.is_empty())
}
