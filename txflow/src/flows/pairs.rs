//! DEX liquidity transactions
//!
//! Add and remove liquidity through the DEX router. Minimum amounts are
//! derived from a slippage tolerance in basis points.

use chrono::{DateTime, TimeDelta, Utc};
use chain_clients_common::normalize_eth_address;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::amounts::{is_positive, to_base_units};
use crate::error::{FlowError, FlowResult};
use crate::flows::approval_if_needed;
use crate::registry::FlowEnv;
use crate::transaction::contracts::{address, encode_calldata, uint256, IRouter};
use crate::transaction::{EvmTx, Transaction};

const MAX_BPS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairToken {
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
}

/// A liquidity pair; `address` is also the LP token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpPair {
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
    pub token1: PairToken,
    pub token2: PairToken,
    pub stable: bool,
}

/// Pairs known to the client, looked up by address
#[derive(Debug, Clone, Default)]
pub struct PairBook {
    pairs: Vec<LpPair>,
}

impl PairBook {
    pub fn new(pairs: Vec<LpPair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[LpPair] {
        &self.pairs
    }

    /// Finds a pair by address, ignoring case.
    pub fn pair(&self, address: &str) -> FlowResult<&LpPair> {
        self.pairs
            .iter()
            .find(|p| p.address.eq_ignore_ascii_case(address))
            .ok_or_else(|| FlowError::not_found("pair", address))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairsTxType {
    AddLiquidity {
        amount1: String,
        amount2: String,
    },
    RemoveLiquidity {
        lp_amount: String,
        /// Underlying amounts the LP tokens are currently worth
        expected1: String,
        expected2: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairsTxParams {
    pub chain_id: u64,
    pub eth_address: String,
    pub pair: LpPair,
    pub tx_type: PairsTxType,
    pub slippage_bps: u32,
    /// Falls back to the configured default
    pub deadline_mins: Option<u64>,
}

/// `amount` reduced by `slippage_bps`, truncated.
pub fn min_amount(amount: &BigInt, slippage_bps: u32) -> BigInt {
    amount * BigInt::from(MAX_BPS - slippage_bps.min(MAX_BPS)) / BigInt::from(MAX_BPS)
}

fn positive_units(amount: &str, decimals: u32) -> FlowResult<BigInt> {
    let value = to_base_units(amount, decimals)?;
    if !is_positive(&value) {
        return Err(FlowError::InvalidAmount("amount must be greater than zero".to_string()));
    }
    Ok(value)
}

/// Unix timestamp `minutes` after `now`; out-of-range deadlines are rejected.
pub fn deadline_after(now: DateTime<Utc>, minutes: u64) -> FlowResult<i64> {
    i64::try_from(minutes)
        .ok()
        .and_then(TimeDelta::try_minutes)
        .and_then(|delta| now.checked_add_signed(delta))
        .map(|deadline| deadline.timestamp())
        .ok_or_else(|| FlowError::InvalidAmount(format!("deadline of {} minutes is out of range", minutes)))
}

pub async fn build(env: &FlowEnv, params: &PairsTxParams) -> FlowResult<Vec<Transaction>> {
    build_at(env, params, Utc::now()).await
}

/// Builds the liquidity transactions with the deadline measured from `now`.
pub async fn build_at(env: &FlowEnv, params: &PairsTxParams, now: DateTime<Utc>) -> FlowResult<Vec<Transaction>> {
    let network = env.evm_network(params.chain_id)?;
    let dex = env
        .config
        .dex
        .as_ref()
        .ok_or_else(|| FlowError::InvalidState("dex is not configured".to_string()))?;
    if params.slippage_bps > MAX_BPS {
        return Err(FlowError::InvalidAmount(format!(
            "slippage {} bps exceeds 100%",
            params.slippage_bps
        )));
    }
    let router = normalize_eth_address(&dex.router_address)
        .map_err(|e| FlowError::InvalidState(e.to_string()))?;
    let deadline_mins = params.deadline_mins.unwrap_or(dex.default_deadline_mins);
    let deadline = uint256(&BigInt::from(deadline_after(now, deadline_mins)?))?;
    let pair = &params.pair;
    let owner = params.eth_address.as_str();
    let token_a = address(&pair.token1.address)?;
    let token_b = address(&pair.token2.address)?;
    let to = address(owner)?;

    let mut txs = Vec::new();
    let (data, title) = match &params.tx_type {
        PairsTxType::AddLiquidity { amount1, amount2 } => {
            let amount1 = positive_units(amount1, pair.token1.decimals)?;
            let amount2 = positive_units(amount2, pair.token2.decimals)?;
            for (token, amount) in [(&pair.token1, &amount1), (&pair.token2, &amount2)] {
                if let Some(approve) = approval_if_needed(
                    env.allowances.as_ref(),
                    network,
                    &token.address,
                    owner,
                    &router,
                    amount,
                    &token.symbol,
                )
                .await?
                {
                    txs.push(approve);
                }
            }
            let call = IRouter::addLiquidityCall {
                tokenA: token_a,
                tokenB: token_b,
                stable: pair.stable,
                amountADesired: uint256(&amount1)?,
                amountBDesired: uint256(&amount2)?,
                amountAMin: uint256(&min_amount(&amount1, params.slippage_bps))?,
                amountBMin: uint256(&min_amount(&amount2, params.slippage_bps))?,
                to,
                deadline,
            };
            (encode_calldata(&call), "Add Liquidity")
        }
        PairsTxType::RemoveLiquidity {
            lp_amount,
            expected1,
            expected2,
        } => {
            let liquidity = positive_units(lp_amount, pair.decimals)?;
            let expected1 = to_base_units(expected1, pair.token1.decimals)?;
            let expected2 = to_base_units(expected2, pair.token2.decimals)?;
            if let Some(approve) = approval_if_needed(
                env.allowances.as_ref(),
                network,
                &pair.address,
                owner,
                &router,
                &liquidity,
                &pair.symbol,
            )
            .await?
            {
                txs.push(approve);
            }
            let call = IRouter::removeLiquidityCall {
                tokenA: token_a,
                tokenB: token_b,
                stable: pair.stable,
                liquidity: uint256(&liquidity)?,
                amountAMin: uint256(&min_amount(&expected1, params.slippage_bps))?,
                amountBMin: uint256(&min_amount(&expected2, params.slippage_bps))?,
                to,
                deadline,
            };
            (encode_calldata(&call), "Remove Liquidity")
        }
    };

    txs.push(Transaction::evm(
        params.chain_id,
        format!("{} {}", title, pair.symbol),
        format!("{} for {}/{}", title, pair.token1.symbol, pair.token2.symbol),
        EvmTx {
            from: owner.to_string(),
            to: router,
            data,
            value: "0".to_string(),
        },
    ));
    Ok(txs)
}
