//! Claim extraction and resource matching shared by every pipeline component.

mod error;
pub mod extractor;
pub mod matcher;

pub use error::ClaimError;
pub use extractor::{ClaimSet, claims_from_headers, extract_claims};
pub use matcher::{PatternError, ResourceMatcher, request_target};
