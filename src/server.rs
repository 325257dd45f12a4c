//! HTTP API surface.
//!
//! One endpoint contract: `GET /api/verify?hash=...` and
//! `POST /api/verify` with body `{"hash": "..."}` run the identical
//! verification handler and return the identical response shape, so every
//! caller sees the same field contract.

use crate::error::Result;
use crate::ledger::Ledger;
use crate::verification::{VerificationOutcome, VerificationWorkflow};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared server state: the injected ledger client and the gateway base
/// used to derive IPFS links. Immutable after startup.
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub gateway_base: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/verify", get(verify_get).post(verify_post))
        .with_state(state)
}

/// Bind and serve the API until shutdown.
pub async fn serve(state: Arc<AppState>, bind_addr: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("API server listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Deserialize)]
struct VerifyParams {
    hash: String,
}

async fn verify_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> (StatusCode, Json<Value>) {
    run_verify(&state, &params.hash).await
}

async fn verify_post(
    State(state): State<Arc<AppState>>,
    Json(params): Json<VerifyParams>,
) -> (StatusCode, Json<Value>) {
    run_verify(&state, &params.hash).await
}

async fn run_verify(state: &AppState, hash: &str) -> (StatusCode, Json<Value>) {
    let workflow = VerificationWorkflow::new(state.ledger.as_ref(), &state.gateway_base);

    match workflow.verify(hash).await {
        Ok(outcome) => verify_response(outcome),
        Err(err) => {
            tracing::error!(hash, error = %err, "Verification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

/// Map a verification outcome to the route-level response contract.
pub fn verify_response(outcome: VerificationOutcome) -> (StatusCode, Json<Value>) {
    match outcome {
        VerificationOutcome::Valid(cert) => (
            StatusCode::OK,
            Json(json!({
                "isValid": true,
                "studentName": cert.student_name,
                "ipfsLink": cert.ipfs_link,
                "uploadDate": cert.upload_date,
                "expiryDate": cert.expiry_date,
                "issuerAddress": cert.issuer_address,
                "issuerReputation": cert.issuer_reputation,
                "isForged": cert.is_forged,
            })),
        ),
        VerificationOutcome::NotFound { reason } => (
            StatusCode::NOT_FOUND,
            Json(json!({ "isValid": false, "reason": reason })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::{NOT_FOUND_REASON, ValidCertificate};

    fn valid_cert() -> ValidCertificate {
        ValidCertificate {
            student_name: "Alice".to_owned(),
            ipfs_link: "https://gateway.pinata.cloud/ipfs/QmTestCid".to_owned(),
            upload_date: "2026-08-30".to_owned(),
            expiry_date: "2030-01-01".to_owned(),
            issuer_address: "0x0000000000000000000000000000000000000001".to_owned(),
            issuer_reputation: 88,
            is_forged: false,
        }
    }

    #[test]
    fn test_valid_outcome_maps_to_200() {
        let (status, Json(body)) = verify_response(VerificationOutcome::Valid(valid_cert()));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], true);
        assert_eq!(body["studentName"], "Alice");
        assert_eq!(body["issuerReputation"], 88);
        assert_eq!(body["isForged"], false);
    }

    #[test]
    fn test_forged_flag_is_not_suppressed() {
        let mut cert = valid_cert();
        cert.is_forged = true;

        let (status, Json(body)) = verify_response(VerificationOutcome::Valid(cert));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], true);
        assert_eq!(body["isForged"], true);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, Json(body)) = verify_response(VerificationOutcome::NotFound {
            reason: NOT_FOUND_REASON.to_owned(),
        });

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["isValid"], false);
        assert_eq!(body["reason"], "Certificate not found");
    }
}
