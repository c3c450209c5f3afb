//! Route handlers.
//!
//! Handlers only translate between JSON and [`WalletService`]; every rule
//! about what is allowed lives in the service and the executor.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::sync::Arc;

use crate::blockchain::units::AmountError;
use crate::error::ServiceError;
use crate::service::{BalanceReport, HealthSummary, WalletService};
use crate::strategies::StrategyListing;

/// `POST /withdraw` body. Both fields are optional here so a missing field
/// reports the same error as an invalid one.
#[derive(Debug, Default, Deserialize)]
pub struct WithdrawBody {
    #[serde(rename = "toAddress")]
    pub to_address: Option<String>,
    /// JSON string or number, kept as written so numbers never pass
    /// through `f64`.
    #[serde(rename = "amountETH")]
    pub amount_eth: Option<Box<RawValue>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub success: bool,
    pub tx_hash: String,
    pub block_number: u64,
}

pub async fn health(State(service): State<Arc<WalletService>>) -> Json<HealthSummary> {
    Json(service.health())
}

pub async fn strategies(State(service): State<Arc<WalletService>>) -> Json<StrategyListing> {
    Json(service.strategies())
}

pub async fn balance(
    State(service): State<Arc<WalletService>>,
) -> Result<Json<BalanceReport>, ServiceError> {
    service.balance().await.map(Json)
}

pub async fn withdraw(
    State(service): State<Arc<WalletService>>,
    body: Result<Json<WithdrawBody>, JsonRejection>,
) -> Result<Json<WithdrawResponse>, ServiceError> {
    if !service.is_ready() {
        return Err(ServiceError::NotReady);
    }

    let Json(body) = body.map_err(|rejection| ServiceError::InvalidBody(rejection.body_text()))?;

    let recipient = body.to_address.ok_or(ServiceError::InvalidRecipient)?;
    let amount = amount_text(body.amount_eth.as_deref())?;

    let receipt = service.withdraw(&recipient, &amount).await?;

    Ok(Json(WithdrawResponse {
        success: true,
        tx_hash: receipt.transaction_hash.to_string(),
        block_number: receipt.block_number,
    }))
}

/// Decimal text of the amount field. A number is used exactly as it was
/// written in the body; exponent forms are left for the amount parser to
/// reject.
fn amount_text(raw: Option<&RawValue>) -> Result<String, ServiceError> {
    let text = match raw {
        None => return Err(AmountError::Empty.into()),
        Some(raw) => raw.get().trim(),
    };

    match text.as_bytes().first() {
        Some(b'"') => serde_json::from_str::<String>(text).map_err(|_| ServiceError::from(AmountError::Malformed)),
        Some(b'-' | b'0'..=b'9') => Ok(text.to_string()),
        _ => Err(AmountError::Malformed.into()),
    }
}
