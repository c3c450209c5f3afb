//! Endpoint selection.
//!
//! Walks the candidate list in priority order and binds the first endpoint
//! that answers with the pinned chain id and a block height. Later candidates
//! are never contacted once one succeeds.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::client::{BlockchainClient, ChainRpc};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::observability::metrics;

/// One RPC option in the priority-ordered fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub url: String,
    pub expected_chain_id: ChainId,
}

impl EndpointCandidate {
    pub fn new(url: impl Into<String>, expected_chain_id: u64) -> Self {
        Self {
            url: url.into(),
            expected_chain_id: ChainId(expected_chain_id),
        }
    }

    /// URL reduced to its origin, for logs.
    pub fn label(&self) -> String {
        match self.url.parse::<url::Url>() {
            Ok(url) => crate::blockchain::client::redact_url(&url),
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

/// Opens transport handles for candidate URLs.
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str) -> BlockchainResult<Arc<dyn ChainRpc>>;
}

/// Connector producing alloy HTTP clients.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    pub rpc_timeout: Duration,
}

impl Connector for HttpConnector {
    fn connect(&self, url: &str) -> BlockchainResult<Arc<dyn ChainRpc>> {
        let client = BlockchainClient::connect(url, self.rpc_timeout)?;
        Ok(Arc::new(client))
    }
}

/// The endpoint bound for the process lifetime.
#[derive(Clone)]
pub struct ActiveConnection {
    rpc: Arc<dyn ChainRpc>,
    chain_id: ChainId,
    block_at_selection: u64,
    endpoint: String,
    /// Position of the endpoint in the candidate list.
    index: usize,
}

impl ActiveConnection {
    pub fn rpc(&self) -> &Arc<dyn ChainRpc> {
        &self.rpc
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn block_at_selection(&self) -> u64 {
        self.block_at_selection
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Debug for ActiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveConnection")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.chain_id.0)
            .field("block_at_selection", &self.block_at_selection)
            .finish()
    }
}

/// Probe candidates in order and return the first usable connection.
///
/// Each candidate gets `probe_timeout` for both of its RPC calls together.
/// Fails with [`BlockchainError::NotAvailable`] when every candidate fails.
pub async fn probe_endpoints(
    candidates: &[EndpointCandidate],
    connector: &dyn Connector,
    probe_timeout: Duration,
) -> BlockchainResult<ActiveConnection> {
    tracing::info!(candidates = candidates.len(), "Probing RPC endpoints");

    for (index, candidate) in candidates.iter().enumerate() {
        let endpoint = candidate.label();
        tracing::info!(index, endpoint = %endpoint, "Testing endpoint");

        let result = match timeout(probe_timeout, probe_one(candidate, connector)).await {
            Ok(result) => result,
            Err(_) => Err(BlockchainError::Timeout(probe_timeout.as_secs())),
        };

        match result {
            Ok((rpc, block)) => {
                metrics::record_probe(&endpoint, true);
                tracing::info!(
                    index,
                    endpoint = %endpoint,
                    chain_id = candidate.expected_chain_id.0,
                    block,
                    "Connected"
                );
                return Ok(ActiveConnection {
                    rpc,
                    chain_id: candidate.expected_chain_id,
                    block_at_selection: block,
                    endpoint,
                    index,
                });
            }
            Err(e) => {
                metrics::record_probe(&endpoint, false);
                tracing::warn!(index, endpoint = %endpoint, error = %e, "Endpoint failed, trying next");
            }
        }
    }

    Err(BlockchainError::NotAvailable(format!(
        "all {} RPC endpoints failed",
        candidates.len()
    )))
}

async fn probe_one(
    candidate: &EndpointCandidate,
    connector: &dyn Connector,
) -> BlockchainResult<(Arc<dyn ChainRpc>, u64)> {
    let rpc = connector.connect(&candidate.url)?;

    let actual = rpc.chain_id().await?;
    if actual != candidate.expected_chain_id {
        return Err(BlockchainError::ChainMismatch {
            expected: candidate.expected_chain_id.0,
            actual: actual.0,
        });
    }

    let block = rpc.block_number().await?;
    Ok((rpc, block))
}
