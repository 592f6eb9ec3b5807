//! `jwt.Modifier`: copy one claim into a request header.
//!
//! This is not an authentication step. The token is decoded without any
//! signature check and the claim is propagated as context for downstream
//! services.

use axum::http::{HeaderName, HeaderValue, request::Parts};

use super::RequestModifier;
use crate::services::claims::{ClaimError, claims_from_headers};

#[derive(Debug, Clone)]
pub struct HeaderPropagator {
    claim: String,
    header: HeaderName,
}

impl HeaderPropagator {
    pub fn new(claim: impl Into<String>, header: HeaderName) -> Self {
        Self {
            claim: claim.into(),
            header,
        }
    }
}

impl RequestModifier for HeaderPropagator {
    /// Extraction failures are returned to the caller; the header is left
    /// untouched in that case.
    fn modify_request(&self, req: &mut Parts) -> Result<(), ClaimError> {
        tracing::debug!(
            uri = %req.uri,
            claim = %self.claim,
            header = %self.header,
            "propagating jwt claim"
        );

        let claims = claims_from_headers(&req.headers)?;
        let value = HeaderValue::from_str(&claims.claim_string(&self.claim)).map_err(|_| {
            ClaimError::InvalidHeaderValue {
                header: self.header.to_string(),
            }
        })?;

        req.headers.insert(self.header.clone(), value);
        Ok(())
    }
}
