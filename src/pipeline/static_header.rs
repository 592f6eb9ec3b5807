//! `header.Modifier`: set a fixed header value. Mostly useful as a
//! `jwt.Filter` branch.

use axum::http::{HeaderName, HeaderValue, request::Parts};

use super::RequestModifier;
use crate::services::claims::ClaimError;

#[derive(Debug, Clone)]
pub struct StaticHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl StaticHeader {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl RequestModifier for StaticHeader {
    fn modify_request(&self, req: &mut Parts) -> Result<(), ClaimError> {
        req.headers.insert(self.name.clone(), self.value.clone());
        Ok(())
    }
}
