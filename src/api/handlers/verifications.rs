/*
 * Responsibility
 * - GET    /_claimgate/verifications : consolidated verifier report
 * - DELETE /_claimgate/verifications : reset every verifier for the next run
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::pipeline::VerificationReport;
use crate::state::AppState;

pub async fn verification_report(State(state): State<AppState>) -> Json<VerificationReport> {
    let report = state.pipeline.verification_report();
    if !report.ok {
        let failures: usize = report.verifiers.iter().map(|v| v.failures.len()).sum();
        tracing::info!(failures, "jwt claim verification report has failures");
    }
    Json(report)
}

pub async fn reset_verifications(State(state): State<AppState>) -> StatusCode {
    state.pipeline.reset_verifications();
    tracing::info!("jwt claim verifications reset");
    StatusCode::NO_CONTENT
}
