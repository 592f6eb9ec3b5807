//! `jwt.Filter`: run one of two modifier chains depending on a condition.

use std::sync::Arc;

use axum::http::request::Parts;

use super::{RequestCondition, RequestModifier};
use crate::services::claims::ClaimError;

pub struct ClaimFilter {
    condition: Arc<dyn RequestCondition>,
    when_true: Vec<Arc<dyn RequestModifier>>,
    when_false: Vec<Arc<dyn RequestModifier>>,
}

impl std::fmt::Debug for ClaimFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimFilter")
            .field("when_true", &self.when_true.len())
            .field("when_false", &self.when_false.len())
            .finish()
    }
}

impl ClaimFilter {
    pub fn new(condition: Arc<dyn RequestCondition>) -> Self {
        Self {
            condition,
            when_true: Vec::new(),
            when_false: Vec::new(),
        }
    }

    pub fn request_when_true(mut self, modifier: Arc<dyn RequestModifier>) -> Self {
        self.when_true.push(modifier);
        self
    }

    pub fn request_when_false(mut self, modifier: Arc<dyn RequestModifier>) -> Self {
        self.when_false.push(modifier);
        self
    }
}

impl RequestModifier for ClaimFilter {
    fn modify_request(&self, req: &mut Parts) -> Result<(), ClaimError> {
        let chain = if self.condition.match_request(req) {
            &self.when_true
        } else {
            &self.when_false
        };

        for modifier in chain {
            modifier.modify_request(req)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::condition::ClaimCondition;
    use crate::pipeline::propagator::HeaderPropagator;
    use crate::pipeline::static_header::StaticHeader;
    use crate::pipeline::test_support::{TOKEN, bearer, request};
    use crate::services::claims::ResourceMatcher;
    use axum::http::{HeaderName, HeaderValue};

    fn owner(value: &'static str) -> Arc<dyn RequestModifier> {
        Arc::new(StaticHeader::new(
            HeaderName::from_static("x-owner"),
            HeaderValue::from_static(value),
        ))
    }

    fn filter() -> ClaimFilter {
        let condition = ClaimCondition::new("user_id", ResourceMatcher::new("accounts").unwrap());
        ClaimFilter::new(Arc::new(condition))
            .request_when_true(owner("true"))
            .request_when_false(owner("false"))
    }

    #[test]
    fn runs_true_branch_on_match() {
        let mut req = request("/accounts/v1/accounts/24139670", Some(&bearer(TOKEN)));
        filter().modify_request(&mut req).unwrap();
        assert_eq!(req.headers["x-owner"], "true");
    }

    #[test]
    fn runs_else_branch_on_mismatch_or_bad_token() {
        let mut req = request("/accounts/v1/accounts/10", Some(&bearer(TOKEN)));
        filter().modify_request(&mut req).unwrap();
        assert_eq!(req.headers["x-owner"], "false");

        let mut req = request("/accounts/v1/accounts/10", Some("Basic abc123"));
        filter().modify_request(&mut req).unwrap();
        assert_eq!(req.headers["x-owner"], "false");
    }

    #[test]
    fn empty_branch_leaves_request_untouched() {
        let condition = ClaimCondition::new("user_id", ResourceMatcher::new("accounts").unwrap());
        let filter = ClaimFilter::new(Arc::new(condition)).request_when_true(owner("true"));

        let mut req = request("/v1/accounts/10", Some(&bearer(TOKEN)));
        filter.modify_request(&mut req).unwrap();
        assert!(req.headers.get("x-owner").is_none());
    }

    #[test]
    fn branch_errors_propagate() {
        let condition = ClaimCondition::new("user_id", ResourceMatcher::new("accounts").unwrap());
        let propagate = HeaderPropagator::new("user_id", HeaderName::from_static("x-user"));
        let filter = ClaimFilter::new(Arc::new(condition)).request_when_false(Arc::new(propagate));

        let mut req = request("/v1/accounts/10", Some("Basic abc123"));
        assert_eq!(
            filter.modify_request(&mut req),
            Err(ClaimError::MalformedHeader)
        );
    }
}
