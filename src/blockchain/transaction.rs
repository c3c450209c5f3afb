//! Transaction building, signing, broadcast and confirmation monitoring.
//!
//! # Responsibilities
//! - Validate withdrawal input before anything touches the key
//! - Build plain value transfers with a fixed gas limit
//! - Serialize nonce assignment and broadcast across concurrent withdrawals
//! - Wait for confirmation with a hard deadline
//!
//! Nothing here retries. A rejected or dropped transaction is reported to the
//! caller, who decides whether to resubmit.

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, timeout};

use crate::blockchain::client::ChainRpc;
use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ConfirmationStatus, WithdrawalReceipt,
};
use crate::blockchain::units::{format_ether, parse_ether};
use crate::blockchain::wallet::Wallet;
use crate::error::ServiceError;
use crate::observability::metrics;

/// Gas used by a plain ether transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Consecutive failed receipt lookups after which the wait is abandoned.
pub const RECEIPT_POLL_FAILURE_LIMIT: u32 = 3;

/// Executor tuning taken from [`BlockchainConfig`].
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub gas_limit: u64,
    pub confirmation_blocks: u32,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    pub gas_price_multiplier: f64,
    pub max_gas_price_gwei: u64,
}

impl From<&BlockchainConfig> for ExecutorSettings {
    fn from(config: &BlockchainConfig) -> Self {
        Self {
            gas_limit: config.gas_limit,
            confirmation_blocks: config.confirmation_blocks.max(1),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            gas_price_multiplier: config.gas_price_multiplier,
            max_gas_price_gwei: config.max_gas_price_gwei,
        }
    }
}

/// Parse an address the way wallets accept them.
///
/// Requires 40 hex digits after an optional `0x`. All-lowercase and
/// all-uppercase forms are accepted as-is; mixed case must be a valid
/// EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let input = input.trim();
    let hex = input.strip_prefix("0x").unwrap_or(input);
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let address = Address::from_str(hex).ok()?;

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *hex {
        return None;
    }

    Some(address)
}

/// Check a recipient string against the sending wallet.
pub fn validate_recipient(input: &str, own: Address) -> Result<Address, ServiceError> {
    let recipient = parse_address(input).ok_or(ServiceError::InvalidRecipient)?;
    // Address equality is byte equality, so input casing is irrelevant.
    if recipient == own {
        return Err(ServiceError::SelfTransferRejected);
    }
    Ok(recipient)
}

/// Builds, signs, broadcasts and confirms transfers from one wallet.
pub struct TxExecutor {
    rpc: Arc<dyn ChainRpc>,
    wallet: Wallet,
    settings: ExecutorSettings,
    /// Held from nonce assignment through broadcast.
    send_lock: Mutex<()>,
}

impl TxExecutor {
    pub fn new(rpc: Arc<dyn ChainRpc>, wallet: Wallet, settings: ExecutorSettings) -> Self {
        Self {
            rpc,
            wallet,
            settings,
            send_lock: Mutex::new(()),
        }
    }

    /// Address funds are sent from.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Send `amount_eth` ether to `recipient` and wait for it to be mined.
    pub async fn withdraw(
        &self,
        recipient: &str,
        amount_eth: &str,
    ) -> Result<WithdrawalReceipt, ServiceError> {
        let result = self.execute(recipient, amount_eth).await;
        match &result {
            Ok(_) => metrics::record_withdrawal("confirmed"),
            Err(e) => metrics::record_withdrawal(e.kind()),
        }
        result
    }

    async fn execute(
        &self,
        recipient: &str,
        amount_eth: &str,
    ) -> Result<WithdrawalReceipt, ServiceError> {
        let to = validate_recipient(recipient, self.wallet.address())?;
        let value = parse_ether(amount_eth)?;

        tracing::info!(to = %to, amount_eth = %format_ether(value), "Withdrawal requested");

        let (tx_hash, head) = self
            .broadcast(to, value)
            .await
            .map_err(ServiceError::ExecutionFailed)?;

        tracing::info!(tx_hash = %tx_hash, head, "Transaction broadcast");

        let block_number = self.wait_for_confirmation(tx_hash).await?;

        tracing::info!(tx_hash = %tx_hash, block_number, "Withdrawal confirmed");

        Ok(WithdrawalReceipt {
            transaction_hash: tx_hash,
            block_number,
            recipient: to,
        })
    }

    /// Build a transfer with a fresh nonce and capped gas price.
    ///
    /// # Arguments
    /// * `to` - Destination address
    /// * `value` - Amount in wei
    /// * `chain_pending_nonce` - Node's pending transaction count for the wallet
    async fn build(&self, to: Address, value: U256, chain_pending_nonce: u64) -> BlockchainResult<TxLegacy> {
        let gas_price = self.rpc.gas_price().await?;

        // Applied to the fee only; the transferred value stays exact.
        let adjusted_gas_price = (gas_price as f64 * self.settings.gas_price_multiplier) as u128;

        // The cap bounds the price actually signed.
        let adjusted_gwei = adjusted_gas_price / 1_000_000_000;
        if adjusted_gwei > self.settings.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: u64::try_from(adjusted_gwei).unwrap_or(u64::MAX),
                max_gwei: self.settings.max_gas_price_gwei,
            });
        }

        Ok(TxLegacy {
            chain_id: Some(self.wallet.chain_id()),
            nonce: self.wallet.next_nonce(chain_pending_nonce),
            gas_price: adjusted_gas_price,
            gas_limit: self.settings.gas_limit,
            to: TxKind::Call(to),
            value,
            input: Bytes::new(),
        })
    }

    /// Sign and submit. Returns the hash and the head block seen just before sending.
    async fn broadcast(&self, to: Address, value: U256) -> BlockchainResult<(TxHash, u64)> {
        let _guard = self.send_lock.lock().await;

        let pending = self.rpc.pending_nonce(self.wallet.address()).await?;
        let tx = self.build(to, value, pending).await?;
        let nonce = tx.nonce;
        let signed = self.wallet.sign_transaction(tx)?;

        let head = self.rpc.block_number().await?;
        let node_hash = self.rpc.send_raw_transaction(&signed.raw).await?;
        if node_hash != signed.hash {
            tracing::warn!(
                local = %signed.hash,
                node = %node_hash,
                "Node reported a different transaction hash"
            );
        }

        self.wallet.commit_nonce(nonce);
        Ok((signed.hash, head))
    }

    /// Poll until the transaction has the required confirmations.
    ///
    /// A failed lookup is retried on the next tick. After
    /// [`RECEIPT_POLL_FAILURE_LIMIT`] failures in a row the wait ends with an
    /// execution failure naming the hash.
    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<u64, ServiceError> {
        let deadline = self.settings.confirmation_timeout;

        let result = timeout(deadline, async {
            let mut ticker = interval(self.settings.poll_interval);
            let mut failures = 0u32;

            loop {
                ticker.tick().await;

                let status = self.confirmation_status(tx_hash).await;
                if status.is_ok() {
                    failures = 0;
                }

                match status {
                    Ok(ConfirmationStatus::Confirmed { block_number }) => return Ok(block_number),
                    Ok(ConfirmationStatus::Confirming { current, required }) => {
                        tracing::debug!(tx_hash = %tx_hash, current, required, "Waiting for confirmations");
                    }
                    Ok(ConfirmationStatus::Pending) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    }
                    Err(BlockchainError::Reverted(hash)) => {
                        return Err(ServiceError::ExecutionFailed(BlockchainError::Reverted(hash)));
                    }
                    Err(e) => {
                        failures += 1;
                        tracing::warn!(tx_hash = %tx_hash, error = %e, failures, "Receipt poll failed");
                        if failures >= RECEIPT_POLL_FAILURE_LIMIT {
                            return Err(ServiceError::ExecutionFailed(BlockchainError::ReceiptPolling {
                                tx_hash,
                                reason: e.to_string(),
                            }));
                        }
                    }
                }
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(tx_hash = %tx_hash, "Confirmation timed out");
                Err(ServiceError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: deadline.as_secs(),
                })
            }
        }
    }

    async fn confirmation_status(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let receipt = match self.rpc.receipt(tx_hash).await? {
            Some(r) => r,
            None => return Ok(ConfirmationStatus::Pending),
        };

        if !receipt.success {
            return Err(BlockchainError::Reverted(tx_hash));
        }

        let tx_block = match receipt.block_number {
            Some(b) => b,
            None => return Ok(ConfirmationStatus::Pending),
        };

        let required = self.settings.confirmation_blocks;
        let current_block = self.rpc.block_number().await?.max(tx_block);
        // The inclusion block itself counts as the first confirmation.
        let confirmations = (current_block - tx_block + 1) as u32;

        if confirmations >= required {
            Ok(ConfirmationStatus::Confirmed { block_number: tx_block })
        } else {
            Ok(ConfirmationStatus::Confirming {
                current: confirmations,
                required,
            })
        }
    }
}

impl std::fmt::Debug for TxExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxExecutor")
            .field("wallet", &self.wallet)
            .field("settings", &self.settings)
            .finish()
    }
}
