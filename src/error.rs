// Error types for precondition violations raised by the aggregation core
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalyzerError {
    #[error("cannot combine an empty list of series")]
    NoSources,

    #[error("series step mismatch: expected {expected}s, found {found}s")]
    StepMismatch { expected: u32, found: u32 },

    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed chat log line at byte {offset}: {reason}")]
    MalformedChatLog { offset: usize, reason: String },
}
