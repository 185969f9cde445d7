use thiserror::Error;

/// Reasons a raw policy document is rejected by [`crate::normalize`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("policy is not valid JSON: {reason}")]
    InvalidJson { reason: String },
    #[error("policy document must be a JSON object")]
    NotAnObject,
    #[error("policy document has no Statement element")]
    MissingStatement,
    #[error("policy element {field} is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },
    #[error("statement {index} is malformed: {reason}")]
    MalformedStatement { index: usize, reason: String },
}

impl NormalizeError {
    pub(crate) fn statement(index: usize, reason: impl Into<String>) -> Self {
        NormalizeError::MalformedStatement { index, reason: reason.into() }
    }
}
