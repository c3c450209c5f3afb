//! Query and withdrawal operations behind the HTTP API.
//!
//! `WalletService` is the context object built once at startup and shared by
//! `Arc` with every handler. It is either ready (connection and wallet bound)
//! or not; readiness never changes after construction.

use alloy::primitives::Address;
use serde::Serialize;

use crate::blockchain::prober::ActiveConnection;
use crate::blockchain::transaction::TxExecutor;
use crate::blockchain::types::WithdrawalReceipt;
use crate::blockchain::units::format_ether;
use crate::error::ServiceError;
use crate::observability::metrics;
use crate::strategies::{StrategyCatalogue, StrategyListing};

/// Response body for `GET /health`. Addresses are EIP-55 strings.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub status: &'static str,
    pub wallet: String,
    pub contract: String,
    pub strategies: usize,
}

/// Response body for `GET /balance`.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub address: String,
    pub balance: String,
    pub contract: String,
}

struct Ready {
    connection: ActiveConnection,
    executor: TxExecutor,
}

/// Shared request context.
pub struct WalletService {
    ready: Option<Ready>,
    contract: Address,
    catalogue: StrategyCatalogue,
}

impl WalletService {
    /// Context with a bound connection and wallet.
    pub fn ready(
        connection: ActiveConnection,
        executor: TxExecutor,
        contract: Address,
        catalogue: StrategyCatalogue,
    ) -> Self {
        Self {
            ready: Some(Ready { connection, executor }),
            contract,
            catalogue,
        }
    }

    /// Context that answers `/health` and `/strategies` only.
    pub fn not_ready(contract: Address, catalogue: StrategyCatalogue) -> Self {
        Self {
            ready: None,
            contract,
            catalogue,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// Wallet address once initialized.
    pub fn wallet_address(&self) -> Option<Address> {
        self.ready.as_ref().map(|r| r.executor.address())
    }

    pub fn connection(&self) -> Option<&ActiveConnection> {
        self.ready.as_ref().map(|r| &r.connection)
    }

    pub fn health(&self) -> HealthSummary {
        HealthSummary {
            status: "online",
            wallet: self
                .wallet_address()
                .map(|a| a.to_checksum(None))
                .unwrap_or_else(|| "not ready".to_string()),
            contract: self.contract.to_checksum(None),
            strategies: self.catalogue.total(),
        }
    }

    pub fn strategies(&self) -> StrategyListing {
        self.catalogue.listing()
    }

    /// Wallet balance as seen by the bound endpoint.
    pub async fn balance(&self) -> Result<BalanceReport, ServiceError> {
        let ready = self.ready.as_ref().ok_or(ServiceError::NotReady)?;
        let address = ready.executor.address();

        let wei = ready.connection.rpc().balance(address).await.map_err(|e| {
            metrics::record_balance_query(false);
            tracing::error!(error = %e, "Balance query failed");
            ServiceError::QueryFailed(e)
        })?;
        metrics::record_balance_query(true);

        Ok(BalanceReport {
            address: address.to_checksum(None),
            balance: format_ether(wei),
            contract: self.contract.to_checksum(None),
        })
    }

    /// Send ether from the gateway wallet and wait for confirmation.
    pub async fn withdraw(
        &self,
        recipient: &str,
        amount_eth: &str,
    ) -> Result<WithdrawalReceipt, ServiceError> {
        let ready = self.ready.as_ref().ok_or(ServiceError::NotReady)?;
        ready.executor.withdraw(recipient, amount_eth).await
    }
}
