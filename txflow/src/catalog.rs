//! Networks, tokens and bridging methods
//!
//! Static tables built once from configuration. Nothing here is mutated after
//! start-up; selections hold clones of these records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::{FeeEntry, FlowConfig};
use crate::error::{FlowError, FlowResult};

/// Chain family, decides which signing and transaction format a network uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    Evm,
    Cosmos,
}

/// EVM network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmNetwork {
    pub id: String,
    pub name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// LayerZero endpoint id; networks without one cannot use LayerZero
    #[serde(default)]
    pub lz_chain_id: Option<u16>,
    #[serde(default)]
    pub testnet: bool,
}

/// Cosmos SDK network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmosNetwork {
    pub id: String,
    pub name: String,
    /// Cosmos chain-id string (e.g. `cosmoshub-4`)
    pub chain_id: String,
    pub bech32_prefix: String,
    #[serde(default)]
    pub rest_url: Option<String>,
    /// Channel on this chain that leads to the hub (used for bridge-in)
    #[serde(default)]
    pub channel_to_hub: Option<String>,
    /// Channel on the hub that leads to this chain (used for bridge-out)
    #[serde(default)]
    pub hub_channel: Option<String>,
    /// Fee for transfers signed on this chain; defaults to a zero fee in the
    /// transferred denom for the wallet to adjust
    #[serde(default)]
    pub transfer_fee: Option<FeeEntry>,
    #[serde(default)]
    pub testnet: bool,
}

/// A configured network. Use the `type` field in TOML to pick the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Network {
    #[serde(rename = "evm")]
    Evm(EvmNetwork),
    #[serde(rename = "cosmos")]
    Cosmos(CosmosNetwork),
}

impl Network {
    pub fn id(&self) -> &str {
        match self {
            Network::Evm(n) => &n.id,
            Network::Cosmos(n) => &n.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Network::Evm(n) => &n.name,
            Network::Cosmos(n) => &n.name,
        }
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Network::Evm(_) => ChainFamily::Evm,
            Network::Cosmos(_) => ChainFamily::Cosmos,
        }
    }

    pub fn is_testnet(&self) -> bool {
        match self {
            Network::Evm(n) => n.testnet,
            Network::Cosmos(n) => n.testnet,
        }
    }

    pub fn as_evm(&self) -> Option<&EvmNetwork> {
        match self {
            Network::Evm(n) => Some(n),
            Network::Cosmos(_) => None,
        }
    }

    pub fn as_cosmos(&self) -> Option<&CosmosNetwork> {
        match self {
            Network::Cosmos(n) => Some(n),
            Network::Evm(_) => None,
        }
    }
}

/// Cross-chain transfer protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgingMethod {
    GravityBridge,
    LayerZero,
    Ibc,
}

/// Which way funds move relative to the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeDirection {
    /// External network → hub
    In,
    /// Hub → external network
    Out,
}

impl BridgingMethod {
    pub const ALL: [BridgingMethod; 3] = [
        BridgingMethod::GravityBridge,
        BridgingMethod::LayerZero,
        BridgingMethod::Ibc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BridgingMethod::GravityBridge => "GRAVITY_BRIDGE",
            BridgingMethod::LayerZero => "LAYER_ZERO",
            BridgingMethod::Ibc => "IBC",
        }
    }

    /// Static compatibility predicate over the source and destination families.
    ///
    /// Bridge-in: Gravity needs an EVM source, LayerZero EVM on both ends, IBC a
    /// Cosmos source. Bridge-out swaps the constrained side to the destination.
    pub fn is_compatible(&self, direction: BridgeDirection, from: ChainFamily, to: ChainFamily) -> bool {
        use ChainFamily::*;
        match (self, direction) {
            (BridgingMethod::GravityBridge, BridgeDirection::In) => from == Evm,
            (BridgingMethod::GravityBridge, BridgeDirection::Out) => to == Evm,
            (BridgingMethod::LayerZero, _) => from == Evm && to == Evm,
            (BridgingMethod::Ibc, BridgeDirection::In) => from == Cosmos,
            (BridgingMethod::Ibc, BridgeDirection::Out) => to == Cosmos,
        }
    }
}

impl fmt::Display for BridgingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BridgingMethod {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BridgingMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FlowError::not_found("bridging method", s))
    }
}

/// A bridgeable token entry.
///
/// `network_id` is the network whose token list this entry belongs to: the
/// source network for bridge-in lists and the destination for bridge-out lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub network_id: String,
    /// ERC20 or OFT contract on the sending chain
    #[serde(default)]
    pub address: Option<String>,
    /// Bank denom on the sending chain
    #[serde(default)]
    pub denom: Option<String>,
    /// Denom the token carries on the receiving Cosmos chain
    #[serde(default)]
    pub counterparty_denom: Option<String>,
    /// Supported methods, in display order
    #[serde(default)]
    pub bridge_methods: Vec<BridgingMethod>,
}

/// Token with the user's balance attached for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenWithBalance {
    #[serde(flatten)]
    pub token: Token,
    /// Base units; `None` until a lookup succeeds
    pub balance: Option<String>,
}

/// Immutable lookup tables for networks and bridge token lists
#[derive(Debug, Clone)]
pub struct Catalog {
    networks: Vec<Network>,
    hub_mainnet: String,
    hub_testnet: Option<String>,
    bridge_in_tokens: HashMap<String, Vec<Token>>,
    bridge_out_tokens: HashMap<String, Vec<Token>>,
}

impl Catalog {
    /// Builds the catalog from a validated configuration.
    pub fn from_config(config: &FlowConfig) -> Self {
        let group = |tokens: &[Token]| {
            let mut map: HashMap<String, Vec<Token>> = HashMap::new();
            for token in tokens {
                map.entry(token.network_id.clone())
                    .or_default()
                    .push(token.clone());
            }
            map
        };

        Self {
            networks: config.networks.clone(),
            hub_mainnet: config.hub.mainnet_network_id.clone(),
            hub_testnet: config.hub.testnet_network_id.clone(),
            bridge_in_tokens: group(&config.bridge_in_tokens),
            bridge_out_tokens: group(&config.bridge_out_tokens),
        }
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn network(&self, id: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.id() == id)
    }

    /// The hub network sessions bridge into and out of.
    pub fn hub_network(&self, testnet: bool) -> FlowResult<&Network> {
        let id = if testnet {
            self.hub_testnet
                .as_deref()
                .ok_or_else(|| FlowError::not_found("hub network", "testnet"))?
        } else {
            self.hub_mainnet.as_str()
        };
        self.network(id)
            .ok_or_else(|| FlowError::not_found("hub network", id))
    }

    /// Networks that can be picked as the counterparty of the hub.
    pub fn bridge_networks(&self, testnet: bool) -> Vec<Network> {
        let hub_id = self.hub_network(testnet).map(|n| n.id().to_string()).ok();
        self.networks
            .iter()
            .filter(|n| n.is_testnet() == testnet && Some(n.id()) != hub_id.as_deref())
            .cloned()
            .collect()
    }

    /// Token list configured for a counterparty network. Empty when none.
    pub fn tokens_for(&self, direction: BridgeDirection, network_id: &str) -> &[Token] {
        let table = match direction {
            BridgeDirection::In => &self.bridge_in_tokens,
            BridgeDirection::Out => &self.bridge_out_tokens,
        };
        table.get(network_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
