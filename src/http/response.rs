//! Error responses.
//!
//! Every failure leaves as `{"error": "<message>"}`. Failures after a
//! successful broadcast also carry the transaction hash so the caller can
//! keep tracking it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::blockchain::types::BlockchainError;
use crate::error::ServiceError;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::InvalidRecipient
            | ServiceError::InvalidAmount(_)
            | ServiceError::SelfTransferRejected
            | ServiceError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ServiceError::QueryFailed(_) | ServiceError::ExecutionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::ConfirmationTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServiceError::ConfirmationTimeout { tx_hash, .. }
            | ServiceError::ExecutionFailed(BlockchainError::ReceiptPolling { tx_hash, .. }) => json!({
                "error": self.to_string(),
                "txHash": tx_hash,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::units::AmountError;
    use alloy::primitives::TxHash;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::NotReady.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ServiceError::InvalidRecipient.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::InvalidAmount(AmountError::NotPositive).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::SelfTransferRejected.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::QueryFailed(BlockchainError::Timeout(10)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::ExecutionFailed(BlockchainError::Rpc("nonce too low".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ServiceError::NotReady.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await, json!({ "error": "Not ready" }));
    }

    #[tokio::test]
    async fn test_timeout_body_carries_hash() {
        let tx_hash = TxHash::repeat_byte(0xab);
        let response = ServiceError::ConfirmationTimeout { tx_hash, waited_secs: 180 }.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let body = body_json(response).await;
        assert_eq!(body["txHash"], json!(tx_hash));
        assert!(body["error"].as_str().unwrap().contains("180 seconds"));
    }

    #[tokio::test]
    async fn test_lost_receipt_body_carries_hash() {
        let tx_hash = TxHash::repeat_byte(0xcd);
        let response = ServiceError::ExecutionFailed(BlockchainError::ReceiptPolling {
            tx_hash,
            reason: "RPC error: connection reset".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["txHash"], json!(tx_hash));
        assert!(body["error"].as_str().unwrap().contains("Lost track of transaction"));
    }
}
