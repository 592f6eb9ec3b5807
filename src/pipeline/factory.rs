//! Explicit composition root: turn a JSON pipeline definition into a
//! [`Pipeline`].
//!
//! Component keys follow the proxy configuration they come from:
//!
//! ```json
//! {
//!   "pipeline": [
//!     { "jwt.Modifier": { "scope": ["request"], "claim": "account_id", "header": "x-account-id" } },
//!     { "jwt.Filter": {
//!         "claim": "user_id", "resource": "accounts",
//!         "modifier": { "header.Modifier": { "name": "x-owner", "value": "true" } },
//!         "else": [{ "header.Modifier": { "name": "x-owner", "value": "false" } }]
//!     } },
//!     { "jwt.Verifier": { "scope": ["request"], "claim": "user_id", "resource": "accounts" } }
//!   ]
//! }
//! ```

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use serde::Deserialize;
use thiserror::Error;

use super::{
    ClaimCondition, ClaimFilter, ClaimVerifier, HeaderPropagator, Pipeline, RequestModifier,
    StaticHeader,
};
use crate::services::claims::{PatternError, ResourceMatcher};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("claim name must not be empty")]
    EmptyClaim,
    #[error("invalid header name: {name:?}")]
    InvalidHeaderName { name: String },
    #[error("invalid value for header {name}")]
    InvalidHeaderValue { name: String },
    #[error("invalid resource {resource:?}: {source}")]
    Resource {
        resource: String,
        #[source]
        source: PatternError,
    },
}

/// Where the host applies a component. Every component here reads request
/// claims, so only `request` has an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Request,
    Response,
}

fn default_scope() -> Vec<Scope> {
    vec![Scope::Request]
}

#[derive(Debug, Deserialize)]
pub struct PipelineSpec {
    pub pipeline: Vec<ComponentSpec>,
}

impl PipelineSpec {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Deserialize)]
pub enum ComponentSpec {
    #[serde(rename = "jwt.Modifier")]
    ClaimHeader(ClaimHeaderSpec),
    #[serde(rename = "jwt.Filter")]
    Filter(FilterSpec),
    #[serde(rename = "jwt.Verifier")]
    Verifier(ClaimResourceSpec),
    #[serde(rename = "header.Modifier")]
    StaticHeader(StaticHeaderSpec),
}

impl ComponentSpec {
    fn kind(&self) -> &'static str {
        match self {
            Self::ClaimHeader(_) => "jwt.Modifier",
            Self::Filter(_) => "jwt.Filter",
            Self::Verifier(_) => "jwt.Verifier",
            Self::StaticHeader(_) => "header.Modifier",
        }
    }

    fn scope(&self) -> &[Scope] {
        match self {
            Self::ClaimHeader(s) => &s.scope,
            Self::Filter(s) => &s.scope,
            Self::Verifier(s) => &s.scope,
            Self::StaticHeader(s) => &s.scope,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClaimHeaderSpec {
    pub claim: String,
    pub header: String,
    #[serde(default = "default_scope")]
    pub scope: Vec<Scope>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimResourceSpec {
    pub claim: String,
    pub resource: String,
    #[serde(default = "default_scope")]
    pub scope: Vec<Scope>,
}

#[derive(Debug, Deserialize)]
pub struct FilterSpec {
    pub claim: String,
    pub resource: String,
    #[serde(default)]
    pub modifier: Chain,
    #[serde(default, rename = "else")]
    pub else_modifier: Chain,
    #[serde(default = "default_scope")]
    pub scope: Vec<Scope>,
}

#[derive(Debug, Deserialize)]
pub struct StaticHeaderSpec {
    pub name: String,
    pub value: String,
    #[serde(default = "default_scope")]
    pub scope: Vec<Scope>,
}

/// A filter branch: one component or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Chain {
    One(Box<ComponentSpec>),
    Many(Vec<ComponentSpec>),
}

impl Default for Chain {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Chain {
    fn as_slice(&self) -> &[ComponentSpec] {
        match self {
            Self::One(one) => std::slice::from_ref(one.as_ref()),
            Self::Many(many) => many,
        }
    }
}

/// Build the pipeline described by `spec`.
pub fn build(spec: &PipelineSpec) -> Result<Pipeline, BuildError> {
    let mut builder = Builder::default();
    let modifiers = builder.chain(&spec.pipeline)?;
    Ok(Pipeline::new(modifiers, builder.verifiers))
}

pub fn header_propagator(spec: &ClaimHeaderSpec) -> Result<HeaderPropagator, BuildError> {
    let claim = non_empty_claim(&spec.claim)?;
    let header = header_name(&spec.header)?;
    Ok(HeaderPropagator::new(claim, header))
}

pub fn claim_condition(spec: &FilterSpec) -> Result<ClaimCondition, BuildError> {
    let claim = non_empty_claim(&spec.claim)?;
    Ok(ClaimCondition::new(claim, resource_matcher(&spec.resource)?))
}

pub fn claim_verifier(spec: &ClaimResourceSpec) -> Result<ClaimVerifier, BuildError> {
    let claim = non_empty_claim(&spec.claim)?;
    Ok(ClaimVerifier::new(claim, resource_matcher(&spec.resource)?))
}

pub fn static_header(spec: &StaticHeaderSpec) -> Result<StaticHeader, BuildError> {
    let name = header_name(&spec.name)?;
    let value = HeaderValue::from_str(&spec.value).map_err(|_| BuildError::InvalidHeaderValue {
        name: spec.name.clone(),
    })?;
    Ok(StaticHeader::new(name, value))
}

fn non_empty_claim(claim: &str) -> Result<&str, BuildError> {
    if claim.is_empty() {
        return Err(BuildError::EmptyClaim);
    }
    Ok(claim)
}

fn header_name(name: &str) -> Result<HeaderName, BuildError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| BuildError::InvalidHeaderName {
        name: name.to_string(),
    })
}

fn resource_matcher(resource: &str) -> Result<ResourceMatcher, BuildError> {
    ResourceMatcher::new(resource).map_err(|source| BuildError::Resource {
        resource: resource.to_string(),
        source,
    })
}

// Collects verifiers wherever they sit in the tree so they can be reported.
#[derive(Default)]
struct Builder {
    verifiers: Vec<Arc<ClaimVerifier>>,
}

impl Builder {
    fn chain(
        &mut self,
        specs: &[ComponentSpec],
    ) -> Result<Vec<Arc<dyn RequestModifier>>, BuildError> {
        let mut modifiers = Vec::with_capacity(specs.len());
        for spec in specs {
            if let Some(modifier) = self.component(spec)? {
                modifiers.push(modifier);
            }
        }
        Ok(modifiers)
    }

    fn component(
        &mut self,
        spec: &ComponentSpec,
    ) -> Result<Option<Arc<dyn RequestModifier>>, BuildError> {
        if !spec.scope().contains(&Scope::Request) {
            tracing::warn!(
                component = spec.kind(),
                "component is not scoped to requests; claims are only read from requests, skipping"
            );
            return Ok(None);
        }

        let modifier: Arc<dyn RequestModifier> = match spec {
            ComponentSpec::ClaimHeader(s) => Arc::new(header_propagator(s)?),
            ComponentSpec::StaticHeader(s) => Arc::new(static_header(s)?),
            ComponentSpec::Verifier(s) => {
                let verifier = Arc::new(claim_verifier(s)?);
                self.verifiers.push(Arc::clone(&verifier));
                verifier
            }
            ComponentSpec::Filter(s) => {
                let mut filter = ClaimFilter::new(Arc::new(claim_condition(s)?));
                for m in self.chain(s.modifier.as_slice())? {
                    filter = filter.request_when_true(m);
                }
                for m in self.chain(s.else_modifier.as_slice())? {
                    filter = filter.request_when_false(m);
                }
                Arc::new(filter)
            }
        };

        Ok(Some(modifier))
    }
}
