//! EVM reader backed by `chain-clients-evm`

use anyhow::Context;
use async_trait::async_trait;
use chain_clients_evm::EvmClient;
use num_bigint::BigInt;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use super::{AllowanceReader, LayerZeroQuoter};
use crate::catalog::{EvmNetwork, Network, Token};
use crate::transaction::contracts::{hex_bytes, to_bigint, uint256, IOFT};

/// One JSON-RPC client per EVM network with an RPC URL
pub struct EvmReader {
    clients: HashMap<u64, EvmClient>,
}

impl EvmReader {
    /// Creates clients for every configured EVM network that has an `rpc_url`.
    pub fn new(networks: &[Network]) -> anyhow::Result<Self> {
        let mut clients = HashMap::new();
        for network in networks.iter().filter_map(Network::as_evm) {
            if let Some(url) = &network.rpc_url {
                clients.insert(network.chain_id, EvmClient::new(url)?);
            }
        }
        Ok(Self { clients })
    }

    fn client(&self, network: &EvmNetwork) -> anyhow::Result<&EvmClient> {
        self.clients
            .get(&network.chain_id)
            .ok_or_else(|| anyhow::anyhow!("No RPC URL configured for {}", network.id))
    }

    /// Native balance when the token has no contract address, ERC20 balance otherwise.
    pub async fn balance(&self, network: &EvmNetwork, token: &Token, owner: &str) -> anyhow::Result<String> {
        let client = self.client(network)?;
        match &token.address {
            Some(address) => client.erc20_balance_of(address, owner).await,
            None => client.get_balance(owner).await,
        }
    }
}

fn parse_uint(value: &str) -> anyhow::Result<BigInt> {
    BigInt::from_str(value).with_context(|| format!("Invalid uint {}", value))
}

#[async_trait]
impl AllowanceReader for EvmReader {
    async fn allowance(
        &self,
        network: &EvmNetwork,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> anyhow::Result<BigInt> {
        let raw = self
            .client(network)?
            .erc20_allowance(token, owner, spender)
            .await?;
        parse_uint(&raw)
    }
}

#[async_trait]
impl LayerZeroQuoter for EvmReader {
    async fn estimate_send_fee(
        &self,
        network: &EvmNetwork,
        oft: &str,
        dst_lz_chain_id: u16,
        to_address: &str,
        amount: &BigInt,
        adapter_params: &str,
    ) -> anyhow::Result<BigInt> {
        let call = IOFT::estimateSendFeeCall {
            dstChainId: dst_lz_chain_id,
            toAddress: hex_bytes(to_address)?,
            amount: uint256(amount)?,
            useZro: false,
            adapterParams: hex_bytes(adapter_params)?,
        };
        debug!("Quoting LayerZero fee on {} for {}", network.id, oft);

        let fees = self
            .client(network)?
            .call(oft, &call)
            .await
            .with_context(|| format!("Failed to quote estimateSendFee on {}", oft))?;
        Ok(to_bigint(fees.nativeFee))
    }
}
