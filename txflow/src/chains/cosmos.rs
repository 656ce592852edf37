//! Cosmos reader backed by `chain-clients-cosmos`

use async_trait::async_trait;
use chain_clients_cosmos::{AccountInfo, CosmosRestClient};
use std::collections::HashMap;

use super::AccountLookup;
use crate::catalog::{CosmosNetwork, Network, Token};
use crate::config::FlowConfig;
use crate::signing::Chain;

/// REST clients keyed by cosmos chain-id
pub struct CosmosReader {
    clients: HashMap<String, CosmosRestClient>,
    gravity_chain_id: String,
}

impl CosmosReader {
    /// Creates clients for the hub native chains, Gravity Bridge and every
    /// Cosmos network with a `rest_url`.
    pub fn new(config: &FlowConfig) -> anyhow::Result<Self> {
        let mut clients = HashMap::new();
        for native in &config.hub.native_chains {
            clients.insert(native.cosmos_chain_id.clone(), CosmosRestClient::new(&native.rest_url)?);
        }
        clients.insert(
            config.gravity.cosmos_chain_id.clone(),
            CosmosRestClient::new(&config.gravity.rest_url)?,
        );
        for network in config.networks.iter().filter_map(Network::as_cosmos) {
            if let Some(url) = &network.rest_url {
                clients.insert(network.chain_id.clone(), CosmosRestClient::new(url)?);
            }
        }
        Ok(Self {
            clients,
            gravity_chain_id: config.gravity.cosmos_chain_id.clone(),
        })
    }

    fn client(&self, cosmos_chain_id: &str) -> anyhow::Result<&CosmosRestClient> {
        self.clients
            .get(cosmos_chain_id)
            .ok_or_else(|| anyhow::anyhow!("No REST URL configured for {}", cosmos_chain_id))
    }

    /// Bank balance of the token's denom.
    pub async fn balance(&self, network: &CosmosNetwork, token: &Token, owner: &str) -> anyhow::Result<String> {
        let denom = token
            .denom
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Token {} has no denom on {}", token.id, network.id))?;
        self.client(&network.chain_id)?.get_balance(owner, denom).await
    }
}

#[async_trait]
impl AccountLookup for CosmosReader {
    async fn native_account(&self, chain: &Chain, address: &str) -> anyhow::Result<AccountInfo> {
        self.client(&chain.cosmos_chain_id)?.get_account(address).await
    }

    async fn gravity_account(&self, address: &str) -> anyhow::Result<AccountInfo> {
        self.client(&self.gravity_chain_id)?.get_account(address).await
    }
}
