//! Cosmos SDK REST client
//!
//! Reads account metadata (account number, sequence, public key) needed to
//! sign Cosmos transactions and bank balances for token lists.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Signing metadata for a Cosmos account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// bech32 account address
    pub address: String,
    /// Account number assigned at creation
    pub account_number: u64,
    /// Current sequence (nonce); changes after every signed transaction
    pub sequence: u64,
    /// Base64 public key, absent until the account has signed once
    pub pubkey: Option<String>,
}

/// Raw `BaseAccount` as returned by the auth module
#[derive(Debug, Deserialize)]
struct BaseAccount {
    address: String,
    #[serde(default)]
    pub_key: Option<PubKey>,
    account_number: String,
    sequence: String,
}

#[derive(Debug, Deserialize)]
struct PubKey {
    key: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    account: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Coin {
    #[allow(dead_code)]
    denom: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Option<Coin>,
}

/// Client for the Cosmos SDK REST (LCD) API
pub struct CosmosRestClient {
    /// HTTP client for REST calls
    client: Client,
    /// Base REST URL
    base_url: String,
}

impl CosmosRestClient {
    /// Creates a new Cosmos REST client
    ///
    /// # Arguments
    ///
    /// * `rest_url` - LCD endpoint (e.g. `https://api.canto.example`)
    ///
    /// # Returns
    ///
    /// * `Ok(CosmosRestClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create client
    pub fn new(rest_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: rest_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches account number, sequence and public key for `address`.
    ///
    /// Handles both plain `BaseAccount` responses and Ethermint `EthAccount`
    /// responses, which nest the base account under `base_account`.
    ///
    /// # Returns
    ///
    /// * `Ok(AccountInfo)` - Current signing metadata
    /// * `Err(anyhow::Error)` - Account missing, request failed, or unexpected shape
    pub async fn get_account(&self, address: &str) -> Result<AccountInfo> {
        let url = format!("{}/cosmos/auth/v1beta1/accounts/{}", self.base_url, address);
        debug!("Fetching cosmos account {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to query account {}", address))?;

        if response.status() == StatusCode::NOT_FOUND {
            anyhow::bail!("Account {} not found on chain", address);
        }
        if !response.status().is_success() {
            anyhow::bail!(
                "Account query for {} failed with status {}",
                address,
                response.status()
            );
        }

        let body: AccountResponse = response
            .json()
            .await
            .context("Failed to parse account response")?;

        let base = body
            .account
            .get("base_account")
            .cloned()
            .unwrap_or(body.account);
        let base: BaseAccount =
            serde_json::from_value(base).context("Unexpected account format")?;

        Ok(AccountInfo {
            address: base.address,
            account_number: base
                .account_number
                .parse()
                .context("Invalid account_number")?,
            sequence: base.sequence.parse().context("Invalid sequence")?,
            pubkey: base.pub_key.map(|k| k.key),
        })
    }

    /// Fetches the bank balance of `denom` for `address` (base units, decimal string).
    pub async fn get_balance(&self, address: &str, denom: &str) -> Result<String> {
        let url = format!(
            "{}/cosmos/bank/v1beta1/balances/{}/by_denom",
            self.base_url, address
        );

        let response = self
            .client
            .get(&url)
            .query(&[("denom", denom)])
            .send()
            .await
            .with_context(|| format!("Failed to query balance of {} for {}", denom, address))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Balance query for {} failed with status {}",
                address,
                response.status()
            );
        }

        let body: BalanceResponse = response
            .json()
            .await
            .context("Failed to parse balance response")?;

        Ok(body
            .balance
            .map(|coin| coin.amount)
            .unwrap_or_else(|| "0".to_string()))
    }
}
