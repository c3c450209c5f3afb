//! Wallet management and transaction signing.
//!
//! # Security
//! - The private key is loaded ONLY from the environment
//! - Keys are never logged or serialized; `Debug` shows the address only
//! - Signatures are deterministic (RFC 6979), so no randomness can leak key material

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "BACKEND_PRIVATE_KEY";

/// Signed, encoded transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub hash: TxHash,
    pub raw: Bytes,
    pub signature: Signature,
    pub signature_hash: B256,
}

/// Wallet for transaction signing with nonce management.
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Next nonce this process will use, when ahead of the node's view.
    nonce: Arc<AtomicU64>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        // The parse error is discarded so nothing derived from the input reaches a message.
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|_| BlockchainError::Wallet("Invalid private key format".to_string()))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        })
    }

    /// Wallet from the value of `BACKEND_PRIVATE_KEY`. Returns `Ok(None)` when
    /// the variable is unset or blank so the caller can decide how fatal that is.
    pub fn from_optional_key(key: Option<&str>, chain_id: u64) -> BlockchainResult<Option<Self>> {
        match key {
            Some(key) if !key.trim().is_empty() => Self::from_private_key(key, chain_id).map(Some),
            _ => Ok(None),
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Reserve a nonce given the node's pending count.
    ///
    /// Returns the larger of the node's view and the local counter, so a
    /// transaction broadcast a moment ago but not yet visible to the node is
    /// never reused. Callers must hold the executor's send lock.
    pub fn next_nonce(&self, chain_pending: u64) -> u64 {
        chain_pending.max(self.nonce.load(Ordering::SeqCst))
    }

    /// Record that `nonce` was accepted by the node.
    pub fn commit_nonce(&self, nonce: u64) {
        self.nonce.fetch_max(nonce + 1, Ordering::SeqCst);
    }

    /// Get the local next nonce.
    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Sign a legacy transaction and encode it for `eth_sendRawTransaction`.
    ///
    /// The transaction must carry this wallet's chain id.
    pub fn sign_transaction(&self, tx: TxLegacy) -> BlockchainResult<SignedTransaction> {
        if tx.chain_id != Some(self.chain_id) {
            return Err(BlockchainError::ChainMismatch {
                expected: self.chain_id,
                actual: tx.chain_id.unwrap_or_default(),
            });
        }

        let signature_hash = tx.signature_hash();
        let signature = self
            .signer
            .sign_hash_sync(&signature_hash)
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;

        let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
        let hash = *envelope.tx_hash();
        let raw = Bytes::from(envelope.encoded_2718());

        Ok(SignedTransaction {
            hash,
            raw,
            signature,
            signature_hash,
        })
    }
}

impl Clone for Wallet {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            nonce: self.nonce.clone(),
            chain_id: self.chain_id,
        }
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
