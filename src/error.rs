//! Service-level error taxonomy.
//!
//! `ServiceError` is what request handlers see; its HTTP mapping lives in
//! `http::response`. `StartupError` is fatal and ends the process.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::units::AmountError;
use crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR;
use crate::config::loader::ConfigError;

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The connection or wallet is not initialized.
    #[error("Not ready")]
    NotReady,

    #[error("Invalid address")]
    InvalidRecipient,

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Cannot send to the gateway wallet itself")]
    SelfTransferRejected,

    /// Request body could not be parsed at all.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A read-only chain query failed.
    #[error("{0}")]
    QueryFailed(BlockchainError),

    /// Building, signing, broadcasting or confirming failed.
    #[error("{0}")]
    ExecutionFailed(BlockchainError),

    /// Broadcast succeeded but no receipt arrived in time.
    #[error("Transaction {tx_hash} not confirmed within {waited_secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },
}

impl ServiceError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotReady => "not_ready",
            ServiceError::InvalidRecipient => "invalid_recipient",
            ServiceError::InvalidAmount(_) => "invalid_amount",
            ServiceError::SelfTransferRejected => "self_transfer",
            ServiceError::InvalidBody(_) => "invalid_body",
            ServiceError::QueryFailed(_) => "query_failed",
            ServiceError::ExecutionFailed(_) => "execution_failed",
            ServiceError::ConfirmationTimeout { .. } => "confirmation_timeout",
        }
    }
}

/// Fatal process errors. All but `Serve` stop the service before it binds.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{} not set", PRIVATE_KEY_ENV_VAR)]
    MissingKey,

    #[error("invalid signing key: {0}")]
    InvalidKey(BlockchainError),

    #[error("no usable RPC endpoint: {0}")]
    NoReachableEndpoint(BlockchainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener failed after it started serving.
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}
