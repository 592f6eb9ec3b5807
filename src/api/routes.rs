/*
 * Responsibility
 * - URL structure of the gateway
 * - Admin endpoints (/health, /_claimgate/...) bypass the claim pipeline
 * - Everything else passes through the pipeline, then reaches `inspect`
 */
use axum::{
    Router,
    routing::{any, get},
};

use crate::api::handlers::{
    health::health,
    inspect::inspect,
    verifications::{reset_verifications, verification_report},
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let upstream = Router::new()
        .route("/", any(inspect))
        .route("/{*path}", any(inspect));
    let upstream = middleware::claims::apply(upstream, state);

    Router::new()
        .route("/health", get(health))
        .route(
            "/_claimgate/verifications",
            get(verification_report).delete(reset_verifications),
        )
        .merge(upstream)
}
