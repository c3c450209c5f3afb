//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a single JSON-RPC endpoint
//! - Query chain state (chain id, block number, balances, nonces, receipts)
//! - Broadcast raw signed transactions
//! - Bound every call by the configured RPC timeout
//!
//! The [`ChainRpc`] trait is the seam between the prober/executor and the
//! network, so both can run against an in-memory node in tests.

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, ReceiptSummary};

/// Read and broadcast operations against one chain endpoint.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Latest block number.
    async fn block_number(&self) -> BlockchainResult<u64>;

    /// Balance of an address at the latest block, in wei.
    async fn balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Transaction count including pending transactions.
    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Current legacy gas price in wei.
    async fn gas_price(&self) -> BlockchainResult<u128>;

    /// Submit an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;

    /// Receipt for a transaction, `None` while it is still pending.
    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>>;
}

/// Blockchain RPC client wrapper around an alloy HTTP provider.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    /// Full endpoint, used only to scrub error text.
    url: url::Url,
    /// Endpoint label with credentials stripped, safe for logs.
    label: String,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a client for one endpoint.
    ///
    /// No network traffic happens here; the first RPC call opens the connection.
    pub fn connect(rpc_url: &str, timeout_duration: Duration) -> BlockchainResult<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| BlockchainError::Rpc(format!("Invalid RPC URL: {}", e)))?;
        let label = redact_url(&url);
        let provider = ProviderBuilder::new().connect_http(url.clone());

        Ok(Self {
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            url,
            label,
            timeout_duration,
        })
    }

    /// Endpoint label safe for logging.
    pub fn label(&self) -> &str {
        &self.label
    }

    async fn call<T, E, F>(&self, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>> + Send,
        F::IntoFuture: Send,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(BlockchainError::Rpc(redact_message(&e.to_string(), &self.url))),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }
}

#[async_trait]
impl ChainRpc for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.call(self.provider.get_chain_id()).await.map(ChainId)
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.call(self.provider.get_block_number()).await
    }

    async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call(self.provider.get_balance(address)).await
    }

    async fn pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.call(self.provider.get_transaction_count(address).pending())
            .await
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.call(self.provider.get_gas_price()).await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let pending = self.call(self.provider.send_raw_transaction(raw)).await?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        let receipt = self
            .call(self.provider.get_transaction_receipt(tx_hash))
            .await?;

        Ok(receipt.map(|r| ReceiptSummary {
            block_number: ReceiptResponse::block_number(&r),
            success: ReceiptResponse::status(&r),
        }))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("endpoint", &self.label)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// Reduce an RPC URL to `scheme://host[:port]`.
///
/// Hosted providers put API keys in the path or userinfo, so only the origin is ever logged.
pub fn redact_url(url: &url::Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        _ => url.scheme().to_string(),
    }
}

/// Strip every secret-bearing part of `url` out of an error message.
///
/// Transport errors quote the request URL verbatim.
pub fn redact_message(message: &str, url: &url::Url) -> String {
    let mut scrubbed = message.replace(url.as_str(), &redact_url(url));

    let path = url.path();
    let secrets = [
        (path.len() > 1).then_some(path),
        url.query(),
        url.password(),
        (!url.username().is_empty()).then_some(url.username()),
    ];
    for secret in secrets.into_iter().flatten() {
        scrubbed = scrubbed.replace(secret, "[redacted]");
    }
    scrubbed
}
