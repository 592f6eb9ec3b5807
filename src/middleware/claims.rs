//! Run the configured claim pipeline on every request before it reaches the
//! upstream handler.
//!
//! Tokens are decoded, never verified: put this behind whatever checks the
//! signatures.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Apply the claim pipeline to every route of `router`.
///
/// ```ignore
/// let upstream = Router::new().fallback(inspect);
/// let upstream = middleware::claims::apply(upstream, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, claims_middleware))
}

async fn claims_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    if let Err(err) = state.pipeline.modify_request(&mut parts) {
        tracing::warn!(
            error = %err,
            method = %parts.method,
            uri = %parts.uri,
            "claim pipeline rejected request"
        );
        return Err(err.into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
