//! Claim vs. path condition used by `jwt.Filter`.

use axum::http::{request, response};

use super::RequestCondition;
use crate::services::claims::{
    ClaimError, ResourceMatcher, claims_from_headers, request_target,
};

/// True when every `<resource>/<id>` in the request target equals the
/// configured claim.
#[derive(Debug, Clone)]
pub struct ClaimCondition {
    claim: String,
    matcher: ResourceMatcher,
}

impl ClaimCondition {
    pub fn new(claim: impl Into<String>, matcher: ResourceMatcher) -> Self {
        Self {
            claim: claim.into(),
            matcher,
        }
    }

    fn evaluate(&self, req: &request::Parts) -> Result<(), ClaimError> {
        let claims = claims_from_headers(&req.headers)?;
        self.matcher
            .matches(&claims.claim_string(&self.claim), request_target(&req.uri))
    }
}

impl RequestCondition for ClaimCondition {
    /// Fails closed: any extraction or matching error is `false`.
    fn match_request(&self, req: &request::Parts) -> bool {
        match self.evaluate(req) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(
                    uri = %req.uri,
                    claim = %self.claim,
                    resource = %self.matcher.resource(),
                    error = %err,
                    "jwt claim condition not met"
                );
                false
            }
        }
    }

    /// Claims only travel on requests, so a response never matches.
    fn match_response(&self, _res: &response::Parts) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{TOKEN, bearer, request};
    use axum::http::Response;

    fn condition() -> ClaimCondition {
        ClaimCondition::new("user_id", ResourceMatcher::new("accounts").unwrap())
    }

    #[test]
    fn matching_request_is_true() {
        let req = request(
            "https://api.example.com/accounts/v1/accounts/24139670",
            Some(&bearer(TOKEN)),
        );
        assert!(condition().match_request(&req));
    }

    #[test]
    fn path_without_resource_is_true() {
        let req = request("/v1/customers/1", Some(&bearer(TOKEN)));
        assert!(condition().match_request(&req));
    }

    #[test]
    fn mismatch_is_false() {
        let req = request("/accounts/v1/accounts/10", Some(&bearer(TOKEN)));
        assert!(!condition().match_request(&req));
    }

    #[test]
    fn unreadable_token_is_false() {
        let req = request("/accounts/v1/accounts/24139670", Some("Basic abc123"));
        assert!(!condition().match_request(&req));

        let req = request("/accounts/v1/accounts/24139670", None);
        assert!(!condition().match_request(&req));
    }

    #[test]
    fn missing_claim_is_false() {
        let c = ClaimCondition::new("tenant", ResourceMatcher::new("accounts").unwrap());
        let req = request("/v1/customers/1", Some(&bearer(TOKEN)));
        assert!(!c.match_request(&req));
    }

    #[test]
    fn responses_never_match() {
        let (res, _) = Response::builder().body(()).unwrap().into_parts();
        assert!(!condition().match_response(&res));
    }
}
