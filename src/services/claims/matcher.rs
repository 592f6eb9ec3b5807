//! Resource segment matching.
//!
//! A resource such as `accounts` identifies every `accounts/<id>` occurrence in
//! a request target. Each `<id>` must equal the expected (claim-derived) value.

use axum::http::Uri;
use regex::Regex;
use thiserror::Error;

use super::error::ClaimError;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("resource name must not be empty")]
    EmptyResource,
    #[error("invalid resource pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Matcher for one resource name. Cheap to share; holds no per-request state.
#[derive(Debug, Clone)]
pub struct ResourceMatcher {
    resource: String,
    // `<resource>/<segment>`, segment excludes `/`, `\r` and `\n`
    pattern: Regex,
    // `/<resource>/v`, an API-version prefix such as `/accounts/v1/...`
    version_prefix: String,
}

impl ResourceMatcher {
    pub fn new(resource: impl Into<String>) -> Result<Self, PatternError> {
        let resource = resource.into();
        if resource.is_empty() {
            return Err(PatternError::EmptyResource);
        }

        let pattern = Regex::new(&format!(r"{}/([^/\r\n]+)", regex::escape(&resource)))?;
        let version_prefix = format!("/{resource}/v");

        Ok(Self {
            resource,
            pattern,
            version_prefix,
        })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Check every `<resource>/<segment>` occurrence in `uri_path` against
    /// `expected`.
    ///
    /// Returns the first mismatch in left-to-right order. A path without any
    /// occurrence matches. An empty `expected` never matches.
    pub fn matches(&self, expected: &str, uri_path: &str) -> Result<(), ClaimError> {
        if expected.is_empty() {
            return Err(ClaimError::MissingExpectedValue {
                resource: self.resource.clone(),
            });
        }

        for caps in self.pattern.captures_iter(self.scan_region(uri_path)) {
            let observed = &caps[1];
            if observed != expected {
                return Err(ClaimError::ResourceMismatch {
                    resource: self.resource.clone(),
                    observed: observed.to_string(),
                    expected: expected.to_string(),
                });
            }
        }

        Ok(())
    }

    // `/accounts/v1/accounts/10` is scanned as `/v1/accounts/10`: the leading
    // resource names the service, not an account.
    fn scan_region<'a>(&self, uri_path: &'a str) -> &'a str {
        if uri_path.starts_with(&self.version_prefix) {
            &uri_path[self.resource.len() + 1..]
        } else {
            uri_path
        }
    }
}

/// Path and query of a request target, as received.
pub fn request_target(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> ResourceMatcher {
        ResourceMatcher::new("accounts").unwrap()
    }

    #[test]
    fn version_prefixed_path_matches_claim() {
        assert_eq!(
            accounts().matches("24139670", "/accounts/v1/accounts/24139670"),
            Ok(())
        );
    }

    #[test]
    fn version_prefixed_path_reports_observed_value() {
        assert_eq!(
            accounts().matches("24139670", "/accounts/v1/accounts/10"),
            Err(ClaimError::ResourceMismatch {
                resource: "accounts".into(),
                observed: "10".into(),
                expected: "24139670".into(),
            })
        );
    }

    #[test]
    fn nested_resource_is_found_anywhere_in_path() {
        let err = accounts()
            .matches("24139670", "/crm/v1/customers/10/accounts/50")
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimError::ResourceMismatch { ref observed, .. } if observed == "50"
        ));
    }

    #[test]
    fn every_occurrence_must_match() {
        let m = accounts();
        assert_eq!(m.matches("7", "/v1/accounts/7/sub/accounts/7"), Ok(()));

        let err = m.matches("7", "/v1/accounts/7/sub/accounts/8").unwrap_err();
        assert!(matches!(
            err,
            ClaimError::ResourceMismatch { ref observed, .. } if observed == "8"
        ));
    }

    #[test]
    fn first_mismatch_wins() {
        let err = accounts()
            .matches("7", "/v1/accounts/1/x/accounts/2")
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimError::ResourceMismatch { ref observed, .. } if observed == "1"
        ));
    }

    #[test]
    fn no_occurrence_is_a_vacuous_match() {
        let m = accounts();
        assert_eq!(m.matches("7", "/v1/customers/10"), Ok(()));
        assert_eq!(m.matches("7", "/"), Ok(()));
        assert_eq!(m.matches("7", "/accounts"), Ok(()));
        assert_eq!(m.matches("7", "/accounts/"), Ok(()));
    }

    #[test]
    fn empty_expected_value_always_fails() {
        let m = accounts();
        for path in ["/v1/accounts/7", "/", "", "/accounts/v1/accounts/"] {
            assert_eq!(
                m.matches("", path),
                Err(ClaimError::MissingExpectedValue {
                    resource: "accounts".into()
                })
            );
        }
    }

    #[test]
    fn query_string_is_part_of_the_scan() {
        let m = accounts();
        assert_eq!(m.matches("7", "/v1/items?owner=accounts/7"), Ok(()));

        let err = m.matches("7", "/v1/accounts/7?x=1").unwrap_err();
        assert!(matches!(
            err,
            ClaimError::ResourceMismatch { ref observed, .. } if observed == "7?x=1"
        ));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let m = ResourceMatcher::new("users").unwrap();
        assert!(m.matches("abc", "/v1/users/ABC").is_err());
        assert!(m.matches("abc", "/v1/Users/ABC").is_ok());
    }

    #[test]
    fn single_character_resource_strips_whole_prefix() {
        let m = ResourceMatcher::new("a").unwrap();
        assert_eq!(m.matches("5", "/a/v1/a/5"), Ok(()));
    }

    #[test]
    fn resource_name_is_taken_literally() {
        let m = ResourceMatcher::new("a.b").unwrap();
        assert_eq!(m.matches("1", "/v1/axb/2"), Ok(()));
        assert!(m.matches("1", "/v1/a.b/2").is_err());
    }

    #[test]
    fn empty_resource_is_rejected() {
        assert!(matches!(
            ResourceMatcher::new(""),
            Err(PatternError::EmptyResource)
        ));
    }

    #[test]
    fn request_target_keeps_path_and_query() {
        let uri: Uri = "https://api.example.com/accounts/v1/accounts/10?x=1"
            .parse()
            .unwrap();
        assert_eq!(request_target(&uri), "/accounts/v1/accounts/10?x=1");

        let uri: Uri = "/v1/accounts/10".parse().unwrap();
        assert_eq!(request_target(&uri), "/v1/accounts/10");
    }
}
