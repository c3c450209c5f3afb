//! In-memory chain node for unit tests.

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::blockchain::client::ChainRpc;
use crate::blockchain::prober::Connector;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, ReceiptSummary};

#[derive(Debug, Clone, Copy)]
enum ReceiptPlan {
    Mined { after_polls: u32, success: bool },
    Never,
}

/// Scriptable node. Broadcast transactions are mined one block above the
/// current head once the receipt has been polled `after_polls` times.
pub struct MockRpc {
    chain_id: u64,
    block: AtomicU64,
    balance: U256,
    pending_nonce: u64,
    gas_price: u128,
    hanging: bool,
    failing_queries: bool,
    failing_balance: bool,
    reject_send: Option<String>,
    receipt: ReceiptPlan,
    receipt_failures: AtomicU32,
    sent: Mutex<Vec<Bytes>>,
    polls: AtomicU32,
    calls: AtomicUsize,
}

impl MockRpc {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            block: AtomicU64::new(1),
            balance: U256::ZERO,
            pending_nonce: 0,
            gas_price: 20_000_000_000,
            hanging: false,
            failing_queries: false,
            failing_balance: false,
            reject_send: None,
            receipt: ReceiptPlan::Mined { after_polls: 1, success: true },
            receipt_failures: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            polls: AtomicU32::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_block(self, block: u64) -> Self {
        self.block.store(block, Ordering::SeqCst);
        self
    }

    pub fn with_balance(mut self, wei: U256) -> Self {
        self.balance = wei;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.pending_nonce = nonce;
        self
    }

    pub fn with_gas_price(mut self, wei: u128) -> Self {
        self.gas_price = wei;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.failing_queries = true;
        self
    }

    /// Answer everything except `eth_getBalance`.
    pub fn failing_balance(mut self) -> Self {
        self.failing_balance = true;
        self
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_send = Some(reason.to_string());
        self
    }

    pub fn mined_after(mut self, polls: u32) -> Self {
        self.receipt = ReceiptPlan::Mined { after_polls: polls, success: true };
        self
    }

    pub fn reverting(mut self) -> Self {
        self.receipt = ReceiptPlan::Mined { after_polls: 1, success: false };
        self
    }

    pub fn never_mined(mut self) -> Self {
        self.receipt = ReceiptPlan::Never;
        self
    }

    /// Fail the next `count` receipt lookups; `u32::MAX` fails them all.
    pub fn failing_receipts(self, count: u32) -> Self {
        self.receipt_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Raw payloads accepted by `send_raw_transaction`.
    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    /// Total RPC calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> BlockchainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging {
            std::future::pending::<()>().await;
        }
        if self.failing_queries {
            return Err(BlockchainError::Rpc("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.enter().await?;
        Ok(ChainId(self.chain_id))
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.enter().await?;
        Ok(self.block.load(Ordering::SeqCst))
    }

    async fn balance(&self, _address: Address) -> BlockchainResult<U256> {
        self.enter().await?;
        if self.failing_balance {
            return Err(BlockchainError::Rpc("header not found".to_string()));
        }
        Ok(self.balance)
    }

    async fn pending_nonce(&self, _address: Address) -> BlockchainResult<u64> {
        self.enter().await?;
        Ok(self.pending_nonce)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        self.enter().await?;
        Ok(self.gas_price)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.enter().await?;
        if let Some(reason) = &self.reject_send {
            return Err(BlockchainError::Rpc(reason.clone()));
        }
        self.sent.lock().unwrap().push(Bytes::copy_from_slice(raw));
        Ok(keccak256(raw))
    }

    async fn receipt(&self, _tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        self.enter().await?;
        let failures = self.receipt_failures.load(Ordering::SeqCst);
        if failures > 0 {
            if failures != u32::MAX {
                self.receipt_failures.store(failures - 1, Ordering::SeqCst);
            }
            return Err(BlockchainError::Rpc("connection reset".to_string()));
        }
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.receipt {
            ReceiptPlan::Mined { after_polls, success } if polls >= after_polls => {
                let mined = if polls == after_polls {
                    self.block.fetch_add(1, Ordering::SeqCst) + 1
                } else {
                    self.block.load(Ordering::SeqCst)
                };
                Ok(Some(ReceiptSummary {
                    block_number: Some(mined),
                    success,
                }))
            }
            _ => Ok(None),
        }
    }
}

/// Connector serving [`MockRpc`] nodes by URL; unknown URLs fail to connect.
#[derive(Default)]
pub struct MockConnector {
    nodes: HashMap<String, Arc<MockRpc>>,
    attempts: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, url: &str, rpc: MockRpc) -> Self {
        self.nodes.insert(url.to_string(), Arc::new(rpc));
        self
    }

    /// Register a URL that refuses connections.
    pub fn down(self, url: &str) -> Self {
        self.node(url, MockRpc::new(0).failing_queries())
    }

    /// URLs passed to `connect`, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    fn connect(&self, url: &str) -> BlockchainResult<Arc<dyn ChainRpc>> {
        self.attempts.lock().unwrap().push(url.to_string());
        match self.nodes.get(url) {
            Some(rpc) => Ok(rpc.clone() as Arc<dyn ChainRpc>),
            None => Err(BlockchainError::Rpc(format!("cannot connect to {}", url))),
        }
    }
}
