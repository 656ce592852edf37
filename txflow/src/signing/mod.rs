//! Chain Context Resolver
//!
//! Derives the EIP-712 signing context (chain identity plus sender account
//! metadata) for Cosmos messages signed with an Ethereum key. Two families of
//! chains are handled: the hub's native chains and Gravity Bridge, which is
//! fronted by a pseudo EVM chain id.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use chain_clients_common::eth_to_bech32;
use chain_clients_cosmos::AccountInfo;

use crate::chains::AccountLookup;
use crate::config::{FlowConfig, NativeChainConfig};
use crate::error::{FlowError, FlowResult, ResultExt};
use crate::transaction::{Transaction, TxChainId, TxPayload};

const OP: &str = "resolve_context";

/// Chain identity used in the EIP-712 domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub chain_id: u64,
    pub cosmos_chain_id: String,
}

/// Sender account metadata; refetched on every resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sender {
    pub account_address: String,
    pub sequence: u64,
    pub account_number: u64,
    pub pubkey: Option<String>,
}

impl From<AccountInfo> for Sender {
    fn from(info: AccountInfo) -> Self {
        Self {
            account_address: info.address,
            sequence: info.sequence,
            account_number: info.account_number,
            pubkey: info.pubkey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningContext {
    pub chain: Chain,
    pub sender: Sender,
}

/// A transaction paired with the context its signer needs.
///
/// `context` is `None` for EVM calls and for Cosmos transactions signed
/// natively by a Cosmos wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignableTransaction {
    pub tx: Transaction,
    pub context: Option<SigningContext>,
}

/// Resolves signing contexts for hub native chains and Gravity Bridge
pub struct ContextResolver {
    native_chains: Vec<NativeChainConfig>,
    hub_prefix: String,
    gravity: Chain,
    gravity_prefix: String,
    accounts: Arc<dyn AccountLookup>,
}

impl ContextResolver {
    pub fn new(config: &FlowConfig, accounts: Arc<dyn AccountLookup>) -> Self {
        Self {
            native_chains: config.hub.native_chains.clone(),
            hub_prefix: config.hub.bech32_prefix.clone(),
            gravity: Chain {
                chain_id: config.gravity.evm_chain_id,
                cosmos_chain_id: config.gravity.cosmos_chain_id.clone(),
            },
            gravity_prefix: config.gravity.bech32_prefix.clone(),
            accounts,
        }
    }

    /// Resolves the signing context of `eth_address` on `chain_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(SigningContext)` - Chain identity and fresh sender metadata
    /// * `Err(FlowError::Unsupported)` - Chain id is neither native nor Gravity
    /// * `Err(FlowError::Upstream)` - Address conversion or account lookup failed
    pub async fn resolve_context(&self, chain_id: u64, eth_address: &str) -> FlowResult<SigningContext> {
        if let Some(native) = self.native_chains.iter().find(|c| c.evm_chain_id == chain_id) {
            let address = eth_to_bech32(eth_address, &self.hub_prefix).upstream(OP)?;
            let chain = Chain {
                chain_id,
                cosmos_chain_id: native.cosmos_chain_id.clone(),
            };
            let account = self
                .accounts
                .native_account(&chain, &address)
                .await
                .upstream(OP)?;
            debug!("Resolved native context on {} for {}", chain.cosmos_chain_id, address);
            return Ok(SigningContext {
                chain,
                sender: account.into(),
            });
        }

        if chain_id == self.gravity.chain_id {
            let address = eth_to_bech32(eth_address, &self.gravity_prefix).upstream(OP)?;
            let account = self.accounts.gravity_account(&address).await.upstream(OP)?;
            debug!("Resolved gravity context for {}", address);
            return Ok(SigningContext {
                chain: self.gravity.clone(),
                sender: account.into(),
            });
        }

        Err(FlowError::Unsupported(format!(
            "unsupported chain id for this signing context: {}",
            chain_id
        )))
    }

    /// Pairs every EIP-712 signed Cosmos transaction with a signing context.
    ///
    /// Transactions keep their order. When several transactions are queued
    /// on the same chain the later ones get the sequence they will have once
    /// the earlier ones are included.
    pub async fn prepare_for_signing(
        &self,
        txs: Vec<Transaction>,
        eth_address: &str,
    ) -> FlowResult<Vec<SignableTransaction>> {
        let mut queued: HashMap<u64, u64> = HashMap::new();
        let mut prepared = Vec::with_capacity(txs.len());

        for tx in txs {
            let context = match (&tx.payload, &tx.chain_id) {
                (TxPayload::Cosmos(_), TxChainId::Evm(chain_id)) => {
                    let mut context = self.resolve_context(*chain_id, eth_address).await?;
                    let ahead = queued.entry(*chain_id).or_insert(0);
                    context.sender.sequence += *ahead;
                    *ahead += 1;
                    Some(context)
                }
                _ => None,
            };
            prepared.push(SignableTransaction { tx, context });
        }

        info!("Prepared {} transactions for signing", prepared.len());
        Ok(prepared)
    }
}
