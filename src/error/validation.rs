use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Name: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Post data can only be specified once.")]
    MultiplePostDataSources,
    #[error("Cannot use concurrency level greater than total number of requests.")]
    ConcurrencyExceedsRequests,
    #[error("Concurrency must be >= 1.")]
    ConcurrencyZero,
    #[error("Content type is required for form data. Use -T.")]
    FormDataRequiresContentType,
    #[error(
        "Method must be either POST, PUT or PATCH for form data. Current method: {method}. Specify HTTP method using -m METHOD"
    )]
    FormDataRequiresBodyMethod { method: String },
    #[error("Allowed templates are: \n{table}")]
    UserAgentTemplateList { table: String },
    #[error("Invalid user agent template: {name}.")]
    InvalidUserAgentTemplate { name: String },
    #[error("Invalid exit code pattern '{value}'. Use a code (403) or a class (4xx).")]
    InvalidExitCodePattern { value: String },
    #[error("Missing URL (pass URLs as arguments, use -l, or provide in config).")]
    MissingUrl,
    #[error("Failed to read URL list file '{path}': {source}")]
    ReadUrlList {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
