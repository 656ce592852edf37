//! Configuration Management Module
//!
//! Loads the static tables the core works from: networks, bridge token lists,
//! hub and Gravity Bridge identities, fee constants and contract addresses.
//! The configuration is read once and treated as immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use chain_clients_common::is_eth_address;

use crate::amounts::parse_base_units;
use crate::catalog::{BridgingMethod, ChainFamily, Network, Token};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure.
///
/// This structure holds:
/// - Hub identity (default target network and native signing chains)
/// - Gravity Bridge identity
/// - Networks (use [[network]] with a `type` field)
/// - Bridge-in and bridge-out token lists
/// - Fee constants, IBC and LayerZero settings
/// - Lending and DEX contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub hub: HubConfig,
    pub gravity: GravityConfig,
    #[serde(rename = "network", default)]
    pub networks: Vec<Network>,
    #[serde(rename = "bridge_in_token", default)]
    pub bridge_in_tokens: Vec<Token>,
    #[serde(rename = "bridge_out_token", default)]
    pub bridge_out_tokens: Vec<Token>,
    pub fees: FeeConfig,
    #[serde(default)]
    pub ibc: IbcConfig,
    #[serde(default)]
    pub layer_zero: LayerZeroConfig,
    #[serde(default)]
    pub lending: Option<LendingConfig>,
    #[serde(default)]
    pub dex: Option<DexConfig>,
}

/// Hub chain identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Default target network for mainnet sessions
    pub mainnet_network_id: String,
    /// Default target network for testnet sessions
    #[serde(default)]
    pub testnet_network_id: Option<String>,
    /// bech32 prefix of hub accounts (e.g. "canto")
    pub bech32_prefix: String,
    /// Bond denom used by staking messages
    #[serde(default = "default_staking_denom")]
    pub staking_denom: String,
    #[serde(default = "default_staking_decimals")]
    pub staking_decimals: u32,
    /// Chains signed with the hub's native EIP-712 context
    #[serde(rename = "native_chain", default)]
    pub native_chains: Vec<NativeChainConfig>,
}

/// A hub chain reachable through the native EIP-712 signing context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeChainConfig {
    pub evm_chain_id: u64,
    pub cosmos_chain_id: String,
    /// Cosmos REST endpoint used for account lookups
    pub rest_url: String,
}

/// Gravity Bridge identity and contract settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityConfig {
    /// Pseudo EVM chain id that fronts Gravity Bridge for EIP-712 signing
    pub evm_chain_id: u64,
    /// Gravity Bridge cosmos chain-id (e.g. "gravity-bridge-3")
    pub cosmos_chain_id: String,
    #[serde(default = "default_gravity_prefix")]
    pub bech32_prefix: String,
    /// Cosmos REST endpoint used for account lookups
    pub rest_url: String,
    /// Gravity contract on Ethereum (spender of the bridge-in approval)
    pub bridge_contract: String,
    /// IBC channel on the hub that leads to Gravity Bridge
    pub hub_channel: String,
    /// Bridge fee paid to relayers on MsgSendToEth (base units of the token)
    #[serde(default = "default_zero")]
    pub bridge_fee: String,
    /// Chain fee in basis points of the amount on MsgSendToEth
    #[serde(default = "default_chain_fee_bps")]
    pub chain_fee_bps: u32,
}

/// A fixed Cosmos fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEntry {
    pub amount: String,
    pub denom: String,
    pub gas: u64,
}

/// Fee constants for Cosmos transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    pub delegate: FeeEntry,
    pub undelegate: FeeEntry,
    pub redelegate: FeeEntry,
    pub claim_rewards: FeeEntry,
    pub convert_erc20: FeeEntry,
    pub ibc_transfer: FeeEntry,
    pub send_to_eth: FeeEntry,
}

/// Longest accepted IBC timeout (one week)
pub const MAX_IBC_TIMEOUT_SECS: u64 = 7 * 24 * 3600;

/// Longest accepted default DEX deadline (one day)
pub const MAX_DEADLINE_MINS: u64 = 24 * 60;

/// IBC transfer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IbcConfig {
    /// Relative timeout applied to every MsgTransfer
    pub timeout_secs: u64,
}

impl Default for IbcConfig {
    fn default() -> Self {
        Self { timeout_secs: 3600 }
    }
}

/// LayerZero OFT settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerZeroConfig {
    /// Adapter params passed to estimateSendFee and sendFrom
    pub adapter_params: String,
}

impl Default for LayerZeroConfig {
    fn default() -> Self {
        Self {
            adapter_params: "0x".to_string(),
        }
    }
}

/// Lending market settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingConfig {
    pub comptroller_address: String,
}

/// DEX router settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexConfig {
    pub router_address: String,
    /// Deadline applied to liquidity transactions when the caller gives none
    #[serde(default = "default_deadline_mins")]
    pub default_deadline_mins: u64,
}

fn default_staking_denom() -> String {
    "acanto".to_string()
}

fn default_staking_decimals() -> u32 {
    18
}

fn default_gravity_prefix() -> String {
    "gravity".to_string()
}

fn default_zero() -> String {
    "0".to_string()
}

fn default_chain_fee_bps() -> u32 {
    2
}

fn default_deadline_mins() -> u64 {
    10
}

impl FlowConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Uses the provided path, then the `TXFLOW_CONFIG_PATH` env var, then
    /// `config/txflow.toml`. The loaded configuration is validated.
    ///
    /// # Returns
    ///
    /// * `Ok(FlowConfig)` - Loaded and validated configuration
    /// * `Err(anyhow::Error)` - Missing file, parse error, or validation failure
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("TXFLOW_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/txflow.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/txflow.template.toml config/txflow.toml\n\
                Then edit config/txflow.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: FlowConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn network(&self, id: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.id() == id)
    }

    /// Validates the configuration for consistency.
    ///
    /// Checks:
    /// - Network ids are unique
    /// - Hub networks exist, are EVM, and are listed as native chains
    /// - The Gravity chain id does not collide with a native chain
    /// - Token lists reference known networks and use well-formed addresses
    /// - Bridge-out tokens are not keyed by the hub itself
    /// - Fee amounts are integers
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.networks.is_empty() {
            anyhow::bail!("Configuration error: At least one [[network]] must be configured");
        }

        let mut seen = HashSet::new();
        for network in &self.networks {
            if !seen.insert(network.id()) {
                anyhow::bail!("Configuration error: Duplicate network id {}", network.id());
            }
        }

        let native_ids: HashSet<u64> = self.hub.native_chains.iter().map(|c| c.evm_chain_id).collect();
        if native_ids.is_empty() {
            anyhow::bail!("Configuration error: At least one [[hub.native_chain]] must be configured");
        }
        if native_ids.contains(&self.gravity.evm_chain_id) {
            anyhow::bail!(
                "Configuration error: Gravity EVM chain id {} collides with a hub native chain",
                self.gravity.evm_chain_id
            );
        }

        let mut hub_ids = vec![self.hub.mainnet_network_id.as_str()];
        if let Some(testnet) = &self.hub.testnet_network_id {
            hub_ids.push(testnet.as_str());
        }
        for hub_id in &hub_ids {
            let hub = self
                .network(hub_id)
                .ok_or_else(|| anyhow::anyhow!("Configuration error: Unknown hub network {}", hub_id))?;
            let evm = hub.as_evm().ok_or_else(|| {
                anyhow::anyhow!("Configuration error: Hub network {} must be an EVM network", hub_id)
            })?;
            if !native_ids.contains(&evm.chain_id) {
                anyhow::bail!(
                    "Configuration error: Hub network {} (chain {}) has no [[hub.native_chain]] entry",
                    hub_id,
                    evm.chain_id
                );
            }
        }

        if !is_eth_address(&self.gravity.bridge_contract) {
            anyhow::bail!(
                "Configuration error: Invalid gravity bridge_contract {}",
                self.gravity.bridge_contract
            );
        }

        for token in &self.bridge_in_tokens {
            self.validate_token(token, "bridge_in_token")?;
        }
        for token in &self.bridge_out_tokens {
            self.validate_token(token, "bridge_out_token")?;
            if hub_ids.contains(&token.network_id.as_str()) {
                anyhow::bail!(
                    "Configuration error: bridge_out_token {} is keyed by the hub network {}",
                    token.id,
                    token.network_id
                );
            }
        }

        let fees = [
            ("delegate", &self.fees.delegate),
            ("undelegate", &self.fees.undelegate),
            ("redelegate", &self.fees.redelegate),
            ("claim_rewards", &self.fees.claim_rewards),
            ("convert_erc20", &self.fees.convert_erc20),
            ("ibc_transfer", &self.fees.ibc_transfer),
            ("send_to_eth", &self.fees.send_to_eth),
        ];
        for (name, fee) in fees {
            parse_base_units(&fee.amount)
                .map_err(|e| anyhow::anyhow!("Configuration error: fees.{}: {}", name, e))?;
        }
        parse_base_units(&self.gravity.bridge_fee)
            .map_err(|e| anyhow::anyhow!("Configuration error: gravity.bridge_fee: {}", e))?;

        if self.ibc.timeout_secs == 0 || self.ibc.timeout_secs > MAX_IBC_TIMEOUT_SECS {
            anyhow::bail!(
                "Configuration error: ibc.timeout_secs must be between 1 and {}, got {}",
                MAX_IBC_TIMEOUT_SECS,
                self.ibc.timeout_secs
            );
        }

        if let Some(lending) = &self.lending {
            if !is_eth_address(&lending.comptroller_address) {
                anyhow::bail!("Configuration error: Invalid lending.comptroller_address");
            }
        }
        if let Some(dex) = &self.dex {
            if !is_eth_address(&dex.router_address) {
                anyhow::bail!("Configuration error: Invalid dex.router_address");
            }
            if dex.default_deadline_mins == 0 || dex.default_deadline_mins > MAX_DEADLINE_MINS {
                anyhow::bail!(
                    "Configuration error: dex.default_deadline_mins must be between 1 and {}, got {}",
                    MAX_DEADLINE_MINS,
                    dex.default_deadline_mins
                );
            }
        }

        Ok(())
    }

    fn validate_token(&self, token: &Token, table: &str) -> anyhow::Result<()> {
        let network = self.network(&token.network_id).ok_or_else(|| {
            anyhow::anyhow!(
                "Configuration error: {} {} references unknown network {}",
                table,
                token.id,
                token.network_id
            )
        })?;

        if let Some(address) = &token.address {
            if !is_eth_address(address) {
                anyhow::bail!(
                    "Configuration error: {} {} has invalid address {}",
                    table,
                    token.id,
                    address
                );
            }
        }

        // A method that can never be compatible with the listing network is a typo
        for method in &token.bridge_methods {
            let listing_family = network.family();
            let impossible = match method {
                BridgingMethod::Ibc => listing_family != ChainFamily::Cosmos,
                BridgingMethod::GravityBridge | BridgingMethod::LayerZero => {
                    listing_family != ChainFamily::Evm
                }
            };
            if impossible {
                anyhow::bail!(
                    "Configuration error: {} {} lists {} but network {} is {:?}",
                    table,
                    token.id,
                    method,
                    token.network_id,
                    listing_family
                );
            }
        }

        Ok(())
    }
}
