/*
 * Responsibility
 * - Request-side processing primitives built on the claim services
 *   (modifier / condition / verifier seams)
 * - `Pipeline`: the ordered chain assembled by `factory::build`
 */
pub mod condition;
pub mod factory;
pub mod filter;
pub mod propagator;
pub mod static_header;
pub mod verifier;

use std::sync::Arc;

use axum::http::{request, response};
use serde::Serialize;

use crate::services::claims::ClaimError;

pub use condition::ClaimCondition;
pub use filter::ClaimFilter;
pub use propagator::HeaderPropagator;
pub use static_header::StaticHeader;
pub use verifier::{ClaimVerifier, VerificationError, VerificationFailure};

/// Mutates an outgoing request. Called once per request, synchronously.
pub trait RequestModifier: Send + Sync {
    fn modify_request(&self, req: &mut request::Parts) -> Result<(), ClaimError>;
}

/// Boolean condition for branching modifiers.
pub trait RequestCondition: Send + Sync {
    fn match_request(&self, req: &request::Parts) -> bool;
    fn match_response(&self, res: &response::Parts) -> bool;
}

/// Collects failures across requests, queried outside the request path.
pub trait RequestVerifier: Send + Sync {
    fn verify_requests(&self) -> Result<(), VerificationError>;
    fn reset_request_verifications(&self);
}

pub struct Pipeline {
    modifiers: Vec<Arc<dyn RequestModifier>>,
    verifiers: Vec<Arc<ClaimVerifier>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("modifiers", &self.modifiers.len())
            .field("verifiers", &self.verifiers)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub ok: bool,
    pub verifiers: Vec<VerifierReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifierReport {
    pub name: String,
    pub failures: Vec<VerificationFailure>,
}

impl Pipeline {
    pub fn new(
        modifiers: Vec<Arc<dyn RequestModifier>>,
        verifiers: Vec<Arc<ClaimVerifier>>,
    ) -> Self {
        Self {
            modifiers,
            verifiers,
        }
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Run every top-level component in order, stopping at the first error.
    pub fn modify_request(&self, req: &mut request::Parts) -> Result<(), ClaimError> {
        for modifier in &self.modifiers {
            modifier.modify_request(req)?;
        }
        Ok(())
    }

    /// Records of every verifier, including those nested in filter branches.
    pub fn verification_report(&self) -> VerificationReport {
        let verifiers: Vec<VerifierReport> = self
            .verifiers
            .iter()
            .map(|v| VerifierReport {
                name: v.name(),
                failures: v
                    .verify_requests()
                    .err()
                    .map(|e| e.failures)
                    .unwrap_or_default(),
            })
            .collect();

        VerificationReport {
            ok: verifiers.iter().all(|v| v.failures.is_empty()),
            verifiers,
        }
    }

    pub fn reset_verifications(&self) {
        for verifier in &self.verifiers {
            verifier.reset_request_verifications();
        }
    }
}
