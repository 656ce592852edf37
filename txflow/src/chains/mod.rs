//! Chain Readers Module
//!
//! Read-only collaborators the core queries while planning transactions:
//! balances for token lists, ERC20 allowances, LayerZero fee quotes and
//! Cosmos account metadata for signing contexts.
//!
//! Readers return `anyhow::Result`; the caller tags failures with the
//! operation that observed them (`FlowError::Upstream`).

pub mod cosmos;
pub mod evm;

use async_trait::async_trait;
use num_bigint::BigInt;
use std::sync::Arc;

use chain_clients_cosmos::AccountInfo;

use crate::catalog::{EvmNetwork, Network, Token};
use crate::signing::Chain;

pub use cosmos::CosmosReader;
pub use evm::EvmReader;

/// Addresses of the user on both families
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accounts {
    pub eth_address: Option<String>,
    pub cosmos_address: Option<String>,
}

/// Balance of a token on the network it is held on
#[async_trait]
pub trait BalanceService: Send + Sync {
    /// Base-unit balance as a decimal string.
    async fn balance(&self, network: &Network, token: &Token, accounts: &Accounts) -> anyhow::Result<String>;
}

/// ERC20 allowance lookup
#[async_trait]
pub trait AllowanceReader: Send + Sync {
    async fn allowance(
        &self,
        network: &EvmNetwork,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> anyhow::Result<BigInt>;
}

/// LayerZero OFT send fee quote
#[async_trait]
pub trait LayerZeroQuoter: Send + Sync {
    /// Native fee (wei) to send `amount` of `oft` to `to_address` on `dst_lz_chain_id`.
    async fn estimate_send_fee(
        &self,
        network: &EvmNetwork,
        oft: &str,
        dst_lz_chain_id: u16,
        to_address: &str,
        amount: &BigInt,
        adapter_params: &str,
    ) -> anyhow::Result<BigInt>;
}

/// Cosmos account metadata for signing
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Account on a hub chain signed through the native context.
    async fn native_account(&self, chain: &Chain, address: &str) -> anyhow::Result<AccountInfo>;

    /// Account on Gravity Bridge.
    async fn gravity_account(&self, address: &str) -> anyhow::Result<AccountInfo>;
}

/// Routes balance lookups to the reader of the network's family
pub struct LiveBalances {
    pub evm: Arc<EvmReader>,
    pub cosmos: Arc<CosmosReader>,
}

#[async_trait]
impl BalanceService for LiveBalances {
    async fn balance(&self, network: &Network, token: &Token, accounts: &Accounts) -> anyhow::Result<String> {
        match network {
            Network::Evm(evm) => {
                let owner = accounts
                    .eth_address
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("No EVM account for {}", evm.id))?;
                self.evm.balance(evm, token, owner).await
            }
            Network::Cosmos(cosmos) => {
                let owner = accounts
                    .cosmos_address
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("No cosmos account for {}", cosmos.id))?;
                self.cosmos.balance(cosmos, token, owner).await
            }
        }
    }
}
