//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! The signing key is deliberately absent; see `blockchain::wallet`.

use serde::{Deserialize, Serialize};

use crate::strategies::Strategy;

/// Root configuration for the wallet gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Chain connectivity and transaction settings.
    pub blockchain: BlockchainConfig,

    /// Display contract and expected wallet.
    pub contract: ContractConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// HTTP hardening.
    pub security: SecurityConfig,

    /// Strategy catalogue; empty means the built-in list.
    pub strategies: Vec<Strategy>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Timeout configuration for HTTP requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    ///
    /// Must exceed `blockchain.confirmation_timeout_secs` plus four RPC
    /// timeouts, otherwise a withdrawal is cut off before its own deadline
    /// can report.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 240 }
    }
}

/// Blockchain connectivity and transaction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// Candidate JSON-RPC endpoints in priority order.
    pub rpc_urls: Vec<String>,

    /// Pinned chain ID (1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Per-call RPC timeout in seconds; also bounds each endpoint probe.
    pub rpc_timeout_secs: u64,

    /// Confirmations required before a withdrawal is reported. 1 = included.
    pub confirmation_blocks: u32,

    /// How long to wait for confirmation after broadcast.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Gas limit for transfers. No estimation is performed.
    pub gas_limit: u64,

    /// Gas price multiplier (1.0 = node price, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_urls: vec![
                "https://eth.llamarpc.com".to_string(),
                "https://rpc.ankr.com/eth".to_string(),
                "https://ethereum.publicnode.com".to_string(),
            ],
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 180,
            poll_interval_ms: 2000,
            gas_limit: 21_000,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
        }
    }
}

/// Display contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract address reported by `/health` and `/balance`. Never called.
    pub address: String,

    /// Address the signing key is expected to derive; a mismatch is logged.
    pub expected_wallet: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0x83EF5c401fAa5B9674BAfAcFb089b30bAc67C9A0".to_string(),
            expected_wallet: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Answer CORS preflights for any origin.
    pub cors_allow_any: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_allow_any: true,
        }
    }
}
