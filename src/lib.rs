//! Custodial wallet gateway library.
//!
//! Selects a live RPC endpoint at startup, then serves balance queries and
//! signed ether withdrawals from a single wallet over a small JSON API.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;
pub mod strategies;

pub use config::schema::GatewayConfig;
pub use error::{ServiceError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::WalletService;
