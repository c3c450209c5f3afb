//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Candidate RPC URLs (config, priority order)
//!     → prober.rs (first endpoint with the pinned chain id wins)
//!     → client.rs (RPC calls with timeouts)
//! BACKEND_PRIVATE_KEY (environment)
//!     → wallet.rs (key loading, signing)
//! Withdrawal request
//!     → transaction.rs (validate, build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or full RPC URLs
//! - All RPC calls have configurable timeouts
//! - Transactions are signed for the pinned chain only

pub mod client;
pub mod prober;
pub mod transaction;
pub mod types;
pub mod units;
pub mod wallet;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{BlockchainClient, ChainRpc};
pub use prober::{probe_endpoints, ActiveConnection, EndpointCandidate, HttpConnector};
pub use transaction::{ExecutorSettings, TxExecutor};
pub use types::{BlockchainConfig, BlockchainError, ChainId};
pub use wallet::Wallet;
