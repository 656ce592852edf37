//! Shared test helpers for txflow tests
//!
//! This module provides constants, a default configuration and mock
//! collaborators used across the txflow test files.

#![allow(dead_code)]

use alloy_sol_types::SolCall;
use async_trait::async_trait;
use num_bigint::BigInt;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chain_clients_cosmos::AccountInfo;
use txflow::bridge::{BridgeRequest, TxBuilder};
use txflow::catalog::{EvmNetwork, Network, Token};
use txflow::chains::{AccountLookup, Accounts, AllowanceReader, BalanceService, LayerZeroQuoter};
use txflow::signing::Chain;
use txflow::transaction::{EvmTx, Transaction};
use txflow::{BridgeDispatcher, Catalog, FlowConfig, FlowEnv, FlowError, FlowResult};

/// `0x`-prefixed selector of a contract call, as builders put it at the head of calldata
pub fn selector<C: SolCall>() -> String {
    format!("0x{}", hex::encode(C::SELECTOR))
}

// ============================================================================
// CONSTANTS
// ============================================================================

// -------------------------------- USERS ---------------------------------

/// Dummy user EVM address (40 hex characters)
pub const DUMMY_ETH_ADDR: &str = "0x1111111111111111111111111111111111111111";

/// Dummy user Cosmos Hub address
pub const DUMMY_COSMOS_ADDR: &str = "cosmos1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3ls5l5l";

// ------------------------- TOKENS AND CONTRACTS -------------------------

/// Dummy ERC20 token on Ethereum
pub const DUMMY_TOKEN_ADDR_ETH: &str = "0x000000000000000000000000000000000000000a";

/// Dummy LayerZero OFT on Ethereum
pub const DUMMY_OFT_ADDR: &str = "0x000000000000000000000000000000000000000b";

/// Dummy ERC20 token on the hub
pub const DUMMY_TOKEN_ADDR_HUB: &str = "0x000000000000000000000000000000000000000c";

/// Dummy Gravity Bridge contract on Ethereum
pub const DUMMY_GRAVITY_CONTRACT: &str = "0x000000000000000000000000000000000000000d";

/// Dummy cToken market
pub const DUMMY_CTOKEN_ADDR: &str = "0x000000000000000000000000000000000000000e";

/// Dummy comptroller
pub const DUMMY_COMPTROLLER_ADDR: &str = "0x000000000000000000000000000000000000000f";

/// Dummy DEX router
pub const DUMMY_ROUTER_ADDR: &str = "0x0000000000000000000000000000000000000010";

/// Dummy LP pair (also the LP token)
pub const DUMMY_PAIR_ADDR: &str = "0x00000000000000000000000000000000000000aa";

// -------------------------------- CHAINS --------------------------------

pub const HUB_CHAIN_ID: u64 = 7700;
pub const HUB_COSMOS_CHAIN_ID: &str = "canto_7700-1";
pub const GRAVITY_EVM_CHAIN_ID: u64 = 999999;
pub const GRAVITY_COSMOS_CHAIN_ID: &str = "gravity-bridge-3";
pub const ETHEREUM_CHAIN_ID: u64 = 1;

/// Dummy validator operator addresses
pub const DUMMY_VALIDATOR_1: &str = "cantovaloper1aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const DUMMY_VALIDATOR_2: &str = "cantovaloper1bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Default configuration used by most tests
pub const DEFAULT_CONFIG_TOML: &str = r#"
[hub]
mainnet_network_id = "canto"
testnet_network_id = "canto-testnet"
bech32_prefix = "canto"

[[hub.native_chain]]
evm_chain_id = 7700
cosmos_chain_id = "canto_7700-1"
rest_url = "http://127.0.0.1:1317"

[[hub.native_chain]]
evm_chain_id = 7701
cosmos_chain_id = "canto_7701-1"
rest_url = "http://127.0.0.1:1318"

[gravity]
evm_chain_id = 999999
cosmos_chain_id = "gravity-bridge-3"
rest_url = "http://127.0.0.1:1319"
bridge_contract = "0x000000000000000000000000000000000000000d"
hub_channel = "channel-0"
bridge_fee = "0"
chain_fee_bps = 2

[[network]]
type = "evm"
id = "canto"
name = "Canto"
chain_id = 7700
lz_chain_id = 159

[[network]]
type = "evm"
id = "canto-testnet"
name = "Canto Testnet"
chain_id = 7701
testnet = true

[[network]]
type = "evm"
id = "ethereum"
name = "Ethereum"
chain_id = 1
lz_chain_id = 101

[[network]]
type = "evm"
id = "empty-evm"
name = "Empty EVM"
chain_id = 56

[[network]]
type = "cosmos"
id = "cosmoshub"
name = "Cosmos Hub"
chain_id = "cosmoshub-4"
bech32_prefix = "cosmos"
channel_to_hub = "channel-358"
hub_channel = "channel-2"

[[bridge_in_token]]
id = "eth-usdc"
symbol = "USDC"
name = "USD Coin"
decimals = 6
network_id = "ethereum"
address = "0x000000000000000000000000000000000000000a"
bridge_methods = ["GRAVITY_BRIDGE", "LAYER_ZERO"]

[[bridge_in_token]]
id = "eth-oft"
symbol = "OFT"
name = "Omni Token"
decimals = 18
network_id = "ethereum"
address = "0x000000000000000000000000000000000000000b"
bridge_methods = ["LAYER_ZERO"]

[[bridge_in_token]]
id = "eth-dead"
symbol = "DEAD"
name = "No Route Token"
decimals = 18
network_id = "ethereum"

[[bridge_in_token]]
id = "atom"
symbol = "ATOM"
name = "Cosmos Hub Atom"
decimals = 6
network_id = "cosmoshub"
denom = "uatom"
bridge_methods = ["IBC"]

[[bridge_out_token]]
id = "canto-usdc"
symbol = "USDC"
name = "USD Coin"
decimals = 6
network_id = "ethereum"
address = "0x000000000000000000000000000000000000000c"
denom = "gravity0x000000000000000000000000000000000000000a"
counterparty_denom = "gravity0x000000000000000000000000000000000000000a"
bridge_methods = ["GRAVITY_BRIDGE"]

[[bridge_out_token]]
id = "canto-atom"
symbol = "ATOM"
name = "Cosmos Hub Atom"
decimals = 6
network_id = "cosmoshub"
denom = "ibc/ATOM"
bridge_methods = ["IBC"]

[fees.delegate]
amount = "600000000000000000"
denom = "acanto"
gas = 600000

[fees.undelegate]
amount = "600000000000000000"
denom = "acanto"
gas = 600000

[fees.redelegate]
amount = "800000000000000000"
denom = "acanto"
gas = 800000

[fees.claim_rewards]
amount = "400000000000000000"
denom = "acanto"
gas = 400000

[fees.convert_erc20]
amount = "300000000000000000"
denom = "acanto"
gas = 300000

[fees.ibc_transfer]
amount = "300000000000000000"
denom = "acanto"
gas = 300000

[fees.send_to_eth]
amount = "0"
denom = "ugraviton"
gas = 300000

[lending]
comptroller_address = "0x000000000000000000000000000000000000000f"

[dex]
router_address = "0x0000000000000000000000000000000000000010"
"#;

// ============================================================================
// CONFIG AND CATALOG
// ============================================================================

/// Create the default validated configuration
pub fn create_default_config() -> FlowConfig {
    FlowConfig::from_toml_str(DEFAULT_CONFIG_TOML).expect("default test config must be valid")
}

/// Create a catalog from the default configuration
pub fn create_default_catalog() -> Catalog {
    Catalog::from_config(&create_default_config())
}

pub fn network(config: &FlowConfig, id: &str) -> Network {
    config
        .networks
        .iter()
        .find(|n| n.id() == id)
        .cloned()
        .expect("network must exist in test config")
}

pub fn bridge_in_token(config: &FlowConfig, id: &str) -> Token {
    config
        .bridge_in_tokens
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .expect("token must exist in test config")
}

pub fn bridge_out_token(config: &FlowConfig, id: &str) -> Token {
    config
        .bridge_out_tokens
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .expect("token must exist in test config")
}

// ============================================================================
// MOCK COLLABORATORS
// ============================================================================

/// Allowance reader returning a fixed allowance and recording its calls
pub struct MockAllowances {
    pub allowance: BigInt,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl MockAllowances {
    pub fn new(allowance: u64) -> Self {
        Self {
            allowance: BigInt::from(allowance),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }
}

#[async_trait]
impl AllowanceReader for MockAllowances {
    async fn allowance(
        &self,
        _network: &EvmNetwork,
        token: &str,
        owner: &str,
        spender: &str,
    ) -> anyhow::Result<BigInt> {
        self.calls
            .lock()
            .unwrap()
            .push((token.to_string(), owner.to_string(), spender.to_string()));
        if self.fail {
            anyhow::bail!("rpc unavailable");
        }
        Ok(self.allowance.clone())
    }
}

/// LayerZero quoter returning a fixed native fee
pub struct MockQuoter {
    pub fee: BigInt,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, u16)>>,
}

impl MockQuoter {
    pub fn new(fee: u64) -> Self {
        Self {
            fee: BigInt::from(fee),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LayerZeroQuoter for MockQuoter {
    async fn estimate_send_fee(
        &self,
        _network: &EvmNetwork,
        oft: &str,
        dst_lz_chain_id: u16,
        _to_address: &str,
        _amount: &BigInt,
        _adapter_params: &str,
    ) -> anyhow::Result<BigInt> {
        self.calls.lock().unwrap().push((oft.to_string(), dst_lz_chain_id));
        if self.fail {
            anyhow::bail!("quote reverted");
        }
        Ok(self.fee.clone())
    }
}

/// Account lookup returning fixed metadata and recording every lookup
pub struct MockAccounts {
    pub account_number: u64,
    pub sequence: u64,
    pub fail: bool,
    pub native_calls: Mutex<Vec<(String, String)>>,
    pub gravity_calls: Mutex<Vec<String>>,
}

impl MockAccounts {
    pub fn new() -> Self {
        Self {
            account_number: 42,
            sequence: 7,
            fail: false,
            native_calls: Mutex::new(Vec::new()),
            gravity_calls: Mutex::new(Vec::new()),
        }
    }

    fn account(&self, address: &str) -> anyhow::Result<AccountInfo> {
        if self.fail {
            anyhow::bail!("account not found");
        }
        Ok(AccountInfo {
            address: address.to_string(),
            account_number: self.account_number,
            sequence: self.sequence,
            pubkey: Some("A1b2c3".to_string()),
        })
    }
}

#[async_trait]
impl AccountLookup for MockAccounts {
    async fn native_account(&self, chain: &Chain, address: &str) -> anyhow::Result<AccountInfo> {
        self.native_calls
            .lock()
            .unwrap()
            .push((chain.cosmos_chain_id.clone(), address.to_string()));
        self.account(address)
    }

    async fn gravity_account(&self, address: &str) -> anyhow::Result<AccountInfo> {
        self.gravity_calls.lock().unwrap().push(address.to_string());
        self.account(address)
    }
}

/// Balance service with fixed per-token balances; listed tokens fail
#[derive(Default)]
pub struct MockBalances {
    pub balances: HashMap<String, String>,
    pub failing: HashSet<String>,
}

impl MockBalances {
    pub fn with(balances: &[(&str, &str)]) -> Self {
        Self {
            balances: balances
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            failing: HashSet::new(),
        }
    }
}

#[async_trait]
impl BalanceService for MockBalances {
    async fn balance(&self, _network: &Network, token: &Token, _accounts: &Accounts) -> anyhow::Result<String> {
        if self.failing.contains(&token.id) {
            anyhow::bail!("lookup failed for {}", token.id);
        }
        Ok(self
            .balances
            .get(&token.id)
            .cloned()
            .unwrap_or_else(|| "0".to_string()))
    }
}

/// Builder that records every request and returns one marker transaction
pub struct RecordingBuilder {
    pub name: &'static str,
    pub fail: bool,
    pub calls: Mutex<Vec<BridgeRequest>>,
}

impl RecordingBuilder {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TxBuilder for RecordingBuilder {
    async fn build(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        self.calls.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(FlowError::InvalidState(format!("{} builder failed", self.name)));
        }
        Ok(vec![Transaction::evm(
            1,
            self.name,
            "recorded",
            EvmTx {
                from: request.eth_address.clone(),
                to: DUMMY_TOKEN_ADDR_ETH.to_string(),
                data: "0x".to_string(),
                value: "0".to_string(),
            },
        )])
    }
}

/// Recording builders for gravity, layer zero and ibc, plus their dispatcher
pub struct RecordingDispatcher {
    pub gravity: Arc<RecordingBuilder>,
    pub layer_zero: Arc<RecordingBuilder>,
    pub ibc: Arc<RecordingBuilder>,
    pub dispatcher: Arc<BridgeDispatcher>,
}

pub fn create_recording_dispatcher() -> RecordingDispatcher {
    let gravity = RecordingBuilder::new("gravity");
    let layer_zero = RecordingBuilder::new("layer_zero");
    let ibc = RecordingBuilder::new("ibc");
    let dispatcher = Arc::new(BridgeDispatcher::new(
        gravity.clone(),
        layer_zero.clone(),
        ibc.clone(),
    ));
    RecordingDispatcher {
        gravity,
        layer_zero,
        ibc,
        dispatcher,
    }
}

/// Dispatcher wired to the real builders over mock readers
pub fn create_live_dispatcher(
    config: &FlowConfig,
    allowances: Arc<MockAllowances>,
    quoter: Arc<MockQuoter>,
) -> BridgeDispatcher {
    BridgeDispatcher::from_config(config, allowances, quoter)
}

/// Flow environment over the default configuration
pub fn create_flow_env(dispatcher: Arc<BridgeDispatcher>, allowances: Arc<MockAllowances>) -> FlowEnv {
    let config = Arc::new(create_default_config());
    FlowEnv {
        catalog: Arc::new(Catalog::from_config(&config)),
        config,
        dispatcher,
        allowances,
    }
}
