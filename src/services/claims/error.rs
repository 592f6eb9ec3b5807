use thiserror::Error;

/// Errors produced while reading claims from a request or matching them
/// against the request path.
///
/// Every variant is local to the request being processed. Consumers decide
/// what to do with it (propagate, fail closed, or record for a later report).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("not a bearer token in Authorization header")]
    MalformedHeader,

    #[error("failed to decode bearer token: {reason}")]
    MalformedToken { reason: String },

    #[error("missing resource value for {resource}")]
    MissingExpectedValue { resource: String },

    #[error("resource({resource}) id mismatch, uri: {observed}, jwt claim: {expected}")]
    ResourceMismatch {
        resource: String,
        observed: String,
        expected: String,
    },

    #[error("claim value cannot be written to header {header}")]
    InvalidHeaderValue { header: String },
}

impl ClaimError {
    pub(crate) fn malformed_token(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }
}
