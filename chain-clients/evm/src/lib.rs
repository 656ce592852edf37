//! EVM JSON-RPC client
//!
//! Read-only access to EVM chains: native balances, ERC20 balances and
//! allowances, and typed `eth_call` for contracts declared with `sol!`.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use anyhow::{Context, Result};
use chain_clients_common::strip_0x;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// EVM JSON-RPC request wrapper
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<serde_json::Value>,
    id: u64,
}

/// EVM JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

sol! {
    /// ERC20 surface used for balances, allowances and approvals
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function allowance(address owner, address spender) external view returns (uint256 remaining);
        function approve(address spender, uint256 amount) external returns (bool success);
    }
}

/// Parses a `0x` hex EVM address (checksum not enforced).
pub fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).map_err(|e| anyhow::anyhow!("Invalid EVM address {}: {}", address, e))
}

/// ABI-encodes `call` (selector included) as `0x` hex calldata.
pub fn encode_calldata<C: SolCall>(call: &C) -> String {
    format!("0x{}", hex::encode(call.abi_encode()))
}

/// Parses a `0x` hex quantity into a decimal string.
pub fn hex_quantity_to_decimal(value: &str) -> Result<String> {
    let stripped = strip_0x(value);
    if stripped.is_empty() {
        anyhow::bail!("Empty hex quantity");
    }
    let parsed = U256::from_str_radix(stripped, 16)
        .map_err(|e| anyhow::anyhow!("Invalid hex quantity {}: {}", value, e))?;
    Ok(parsed.to_string())
}

/// Client for reading state from an EVM chain
pub struct EvmClient {
    /// HTTP client for JSON-RPC calls
    client: Client,
    /// Base RPC URL
    base_url: String,
}

impl EvmClient {
    /// Creates a new EVM client
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - JSON-RPC endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(EvmClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create client
    pub fn new(rpc_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: rpc_url.to_string(),
        })
    }

    /// Base RPC URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", method))?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = response.error {
            anyhow::bail!("JSON-RPC error: {} ({})", error.message, error.code);
        }

        response
            .result
            .ok_or_else(|| anyhow::anyhow!("JSON-RPC response for {} has no result", method))
    }

    /// Gets the chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        let hex_id: String = self.request("eth_chainId", vec![]).await?;
        u64::from_str_radix(strip_0x(&hex_id), 16).context("Failed to parse chain id")
    }

    /// Executes `eth_call` against the latest block
    ///
    /// # Arguments
    ///
    /// * `to` - Contract address
    /// * `data` - `0x`-prefixed calldata
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - `0x`-prefixed return data
    /// * `Err(anyhow::Error)` - RPC failure or empty return data
    pub async fn eth_call(&self, to: &str, data: &str) -> Result<String> {
        debug!("eth_call to={} on {}", to, self.base_url);
        let result: String = self
            .request(
                "eth_call",
                vec![
                    serde_json::json!({ "to": to, "data": data }),
                    serde_json::json!("latest"),
                ],
            )
            .await?;
        if strip_0x(&result).is_empty() {
            anyhow::bail!("eth_call to {} returned no data", to);
        }
        Ok(result)
    }

    /// Gets the native balance of an account in wei (decimal string)
    pub async fn get_balance(&self, address: &str) -> Result<String> {
        let result: String = self
            .request(
                "eth_getBalance",
                vec![serde_json::json!(address), serde_json::json!("latest")],
            )
            .await?;
        hex_quantity_to_decimal(&result)
    }

    /// Calls a view function and decodes its return data
    ///
    /// # Arguments
    ///
    /// * `to` - Contract address
    /// * `call` - Typed call declared with `sol!`
    ///
    /// # Returns
    ///
    /// * `Ok(C::Return)` - Decoded return value
    /// * `Err(anyhow::Error)` - RPC failure or return data that does not decode
    pub async fn call<C: SolCall>(&self, to: &str, call: &C) -> Result<C::Return> {
        let result = self.eth_call(to, &encode_calldata(call)).await?;
        let data = hex::decode(strip_0x(&result))
            .with_context(|| format!("Invalid hex in {} return data", C::SIGNATURE))?;
        C::abi_decode_returns(&data)
            .map_err(|e| anyhow::anyhow!("Failed to decode {} return data: {}", C::SIGNATURE, e))
    }

    /// Gets an ERC20 balance in base units (decimal string)
    pub async fn erc20_balance_of(&self, token: &str, owner: &str) -> Result<String> {
        let call = IERC20::balanceOfCall {
            owner: parse_address(owner)?,
        };
        let balance = self
            .call(token, &call)
            .await
            .with_context(|| format!("Failed to read balanceOf on {}", token))?;
        Ok(balance.to_string())
    }

    /// Gets the ERC20 allowance granted by `owner` to `spender` (decimal string)
    pub async fn erc20_allowance(&self, token: &str, owner: &str, spender: &str) -> Result<String> {
        let call = IERC20::allowanceCall {
            owner: parse_address(owner)?,
            spender: parse_address(spender)?,
        };
        let remaining = self
            .call(token, &call)
            .await
            .with_context(|| format!("Failed to read allowance on {}", token))?;
        Ok(remaining.to_string())
    }
}
