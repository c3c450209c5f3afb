//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, RPC_URLS, CHAIN_ID, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the process is restarted to change it
//! - All fields have defaults to allow running from environment alone
//! - The signing key never passes through here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BlockchainConfig, ContractConfig, GatewayConfig, ListenerConfig, ObservabilityConfig,
    SecurityConfig, TimeoutConfig,
};
