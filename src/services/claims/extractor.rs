//! Unverified claim extraction from `Authorization: Bearer <jwt>`.
//!
//! Nothing in this module checks a signature, an expiry or an audience.
//! Tokens reaching this code are expected to have been verified by an earlier
//! stage of the pipeline; here we only read what they carry so the claims can
//! be propagated or compared. Do not use these claims to authenticate anyone.

use axum::http::{HeaderMap, header};
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};

use super::error::ClaimError;

// Literal delimiter. Matched anywhere in the header value, not only as a prefix.
const BEARER: &str = "Bearer";

// base64url; trailing `=` padding is tolerated but not required.
const SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded payload of a bearer token, keyed by claim name.
///
/// Built fresh for every request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Render a claim as a string.
    ///
    /// - strings are returned as-is
    /// - numbers use their JSON text (integers never switch to exponent form)
    /// - booleans become `true` / `false`
    /// - a missing claim or `null` becomes the empty string
    /// - arrays and objects become compact JSON
    pub fn claim_string(&self, name: &str) -> String {
        match self.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self { claims }
    }
}

/// Extract the claim set from an `Authorization` header value.
///
/// The value must contain exactly one occurrence of `Bearer`; whatever follows
/// it (leading whitespace included) is the token. The token signature is never
/// read.
pub fn extract_claims(authorization: &str) -> Result<ClaimSet, ClaimError> {
    let parts: Vec<&str> = authorization.split(BEARER).collect();
    if parts.len() != 2 {
        return Err(ClaimError::MalformedHeader);
    }

    decode_unverified(parts[1])
}

/// Same as [`extract_claims`], reading the first `Authorization` header.
pub fn claims_from_headers(headers: &HeaderMap) -> Result<ClaimSet, ClaimError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ClaimError::MalformedHeader)?;

    extract_claims(authorization)
}

fn decode_unverified(token: &str) -> Result<ClaimSet, ClaimError> {
    let token = token.trim();

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ClaimError::malformed_token(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }

    // The header only has to be a JSON object. `alg` is not interpreted: the
    // signature it describes is never checked here.
    decode_segment(segments[0])
        .map_err(|e| ClaimError::malformed_token(format!("invalid header {e}")))?;

    let claims = decode_segment(segments[1])
        .map_err(|e| ClaimError::malformed_token(format!("invalid payload {e}")))?;

    Ok(ClaimSet::from(claims))
}

fn decode_segment(segment: &str) -> Result<Map<String, Value>, String> {
    let bytes = SEGMENT.decode(segment).map_err(|e| format!("encoding: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("json: {e}"))
}
