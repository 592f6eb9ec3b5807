//! `jwt.Verifier`: record claim/path mismatches across many requests and
//! report them at once.
//!
//! The verifier never rejects or alters a request. It is meant for sampled
//! traffic runs: let requests through, then call `verify_requests` for the
//! consolidated result and `reset_request_verifications` before the next run.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::http::request::Parts;
use serde::Serialize;

use super::{RequestModifier, RequestVerifier};
use crate::services::claims::{
    ClaimError, ResourceMatcher, claims_from_headers, request_target,
};

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationFailure {
    /// A path segment differs from the claim.
    Mismatch {
        resource: String,
        expected: String,
        observed: String,
        uri: String,
    },
    /// Authorization header or token could not be decoded.
    UnreadableToken { reason: String, uri: String },
    /// The claim is absent or empty, so there is nothing to compare against.
    MissingClaim {
        claim: String,
        resource: String,
        uri: String,
    },
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch {
                resource,
                expected,
                observed,
                uri,
            } => write!(
                f,
                "jwt claim({expected}) uri verification failed: got {resource}/{observed} in {uri}"
            ),
            Self::UnreadableToken { reason, uri } => {
                write!(f, "unreadable bearer token for {uri}: {reason}")
            }
            Self::MissingClaim {
                claim,
                resource,
                uri,
            } => write!(
                f,
                "missing jwt claim({claim}) for resource {resource} in {uri}"
            ),
        }
    }
}

/// Aggregate returned by [`RequestVerifier::verify_requests`]. Records keep
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationError {
    pub failures: Vec<VerificationFailure>,
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} request verification failure(s)", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationError {}

#[derive(Debug)]
pub struct ClaimVerifier {
    claim: String,
    matcher: ResourceMatcher,
    failures: Mutex<Vec<VerificationFailure>>,
}

impl ClaimVerifier {
    pub fn new(claim: impl Into<String>, matcher: ResourceMatcher) -> Self {
        Self {
            claim: claim.into(),
            matcher,
            failures: Mutex::new(Vec::new()),
        }
    }

    /// `claim->resource`, used to label reports.
    pub fn name(&self) -> String {
        format!("{}->{}", self.claim, self.matcher.resource())
    }

    /// Snapshot of the records collected so far.
    pub fn failures(&self) -> Vec<VerificationFailure> {
        self.lock().clone()
    }

    // Records are append-only, so a panic while holding the lock cannot
    // leave them half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<VerificationFailure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, req: &Parts) -> Option<VerificationFailure> {
        let uri = req.uri.to_string();

        let claims = match claims_from_headers(&req.headers) {
            Ok(claims) => claims,
            Err(err) => {
                return Some(VerificationFailure::UnreadableToken {
                    reason: err.to_string(),
                    uri,
                });
            }
        };

        let expected = claims.claim_string(&self.claim);
        match self.matcher.matches(&expected, request_target(&req.uri)) {
            Ok(()) => None,
            Err(ClaimError::ResourceMismatch {
                resource,
                observed,
                expected,
            }) => Some(VerificationFailure::Mismatch {
                resource,
                expected,
                observed,
                uri,
            }),
            Err(ClaimError::MissingExpectedValue { resource }) => {
                Some(VerificationFailure::MissingClaim {
                    claim: self.claim.clone(),
                    resource,
                    uri,
                })
            }
            Err(other) => Some(VerificationFailure::UnreadableToken {
                reason: other.to_string(),
                uri,
            }),
        }
    }
}

impl RequestModifier for ClaimVerifier {
    /// Records a failure when the request does not verify. Always `Ok`.
    fn modify_request(&self, req: &mut Parts) -> Result<(), ClaimError> {
        if let Some(failure) = self.check(req) {
            tracing::debug!(verifier = %self.name(), %failure, "jwt claim verification failed");
            self.lock().push(failure);
        }
        Ok(())
    }
}

impl RequestVerifier for ClaimVerifier {
    fn verify_requests(&self) -> Result<(), VerificationError> {
        let failures = self.lock();
        if failures.is_empty() {
            return Ok(());
        }

        Err(VerificationError {
            failures: failures.clone(),
        })
    }

    fn reset_request_verifications(&self) {
        self.lock().clear();
    }
}
