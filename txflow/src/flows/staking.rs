//! Staking transactions
//!
//! Delegate, undelegate, redelegate and claim rewards on the hub, signed
//! through the hub's EIP-712 context with fixed fees.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use chain_clients_common::eth_to_bech32;

use crate::amounts::{is_positive, parse_base_units, to_base_units};
use crate::config::{FeeConfig, FeeEntry, FlowConfig};
use crate::error::{FlowError, FlowResult, ResultExt};
use crate::transaction::cosmos::{
    msg_begin_redelegate, msg_delegate, msg_undelegate, msg_withdraw_delegator_reward,
};
use crate::transaction::{CosmosTx, Transaction, TxChainId, Validation};

/// Validators within this edit distance of a search query are shown
const SEARCH_DISTANCE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    pub moniker: String,
    pub jailed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingTxType {
    Delegate,
    Undelegate,
    Redelegate,
    ClaimRewards,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingTxParams {
    pub chain_id: u64,
    pub eth_address: String,
    pub tx_type: StakingTxType,
    pub validator_address: String,
    /// Destination of a redelegation
    pub new_validator_address: Option<String>,
    /// Human-readable amount of the staking coin
    pub amount: String,
    /// Spendable balance in base units
    pub balance: String,
    /// Current delegation to `validator_address` in base units
    pub delegated: String,
    /// Validators to claim rewards from
    pub reward_validators: Vec<String>,
}

pub fn fee_for(tx_type: StakingTxType, fees: &FeeConfig) -> &FeeEntry {
    match tx_type {
        StakingTxType::Delegate => &fees.delegate,
        StakingTxType::Undelegate => &fees.undelegate,
        StakingTxType::Redelegate => &fees.redelegate,
        StakingTxType::ClaimRewards => &fees.claim_rewards,
    }
}

/// Balance left after reserving the delegate fee, never below zero.
pub fn max_delegate_amount(balance: &BigInt, fees: &FeeConfig) -> FlowResult<BigInt> {
    let fee = parse_base_units(&fees.delegate.amount)?;
    let max = balance - fee;
    Ok(if is_positive(&max) { max } else { BigInt::from(0u32) })
}

/// Largest amount the transaction type allows, in base units.
pub fn max_amount(params: &StakingTxParams, fees: &FeeConfig) -> FlowResult<BigInt> {
    match params.tx_type {
        StakingTxType::Delegate => max_delegate_amount(&parse_base_units(&params.balance)?, fees),
        StakingTxType::Undelegate | StakingTxType::Redelegate => parse_base_units(&params.delegated),
        StakingTxType::ClaimRewards => Ok(BigInt::from(0u32)),
    }
}

/// Checks amount and validator choices before (re)submitting.
pub fn validate_retry(config: &FlowConfig, params: &StakingTxParams) -> Validation {
    if params.tx_type == StakingTxType::ClaimRewards {
        return if params.reward_validators.is_empty() {
            Validation::invalid("no rewards to claim")
        } else {
            Validation::ok()
        };
    }

    let amount = match to_base_units(&params.amount, config.hub.staking_decimals) {
        Ok(amount) => amount,
        Err(e) => return Validation::invalid(e.to_string()),
    };
    if !is_positive(&amount) {
        return Validation::invalid("amount must be greater than zero");
    }
    match max_amount(params, &config.fees) {
        Ok(max) if amount > max => return Validation::invalid("amount exceeds the maximum"),
        Ok(_) => {}
        Err(e) => return Validation::invalid(e.to_string()),
    }

    if params.tx_type == StakingTxType::Redelegate {
        match &params.new_validator_address {
            None => return Validation::invalid("no validator selected to redelegate to"),
            Some(new) if new == &params.validator_address => {
                return Validation::invalid("cannot redelegate to the same validator")
            }
            Some(_) => {}
        }
    }
    Validation::ok()
}

pub fn build(config: &FlowConfig, params: &StakingTxParams) -> FlowResult<Vec<Transaction>> {
    if !config
        .hub
        .native_chains
        .iter()
        .any(|c| c.evm_chain_id == params.chain_id)
    {
        return Err(FlowError::Unsupported(format!(
            "staking is not available on chain {}",
            params.chain_id
        )));
    }

    let delegator = eth_to_bech32(&params.eth_address, &config.hub.bech32_prefix).upstream("address")?;
    let denom = config.hub.staking_denom.as_str();
    let amount = || -> FlowResult<String> {
        let value = to_base_units(&params.amount, config.hub.staking_decimals)?;
        if !is_positive(&value) {
            return Err(FlowError::InvalidAmount("amount must be greater than zero".to_string()));
        }
        Ok(value.to_string())
    };

    let (msgs, title) = match params.tx_type {
        StakingTxType::Delegate => (
            vec![msg_delegate(&delegator, &params.validator_address, denom, &amount()?)],
            "Delegate",
        ),
        StakingTxType::Undelegate => (
            vec![msg_undelegate(&delegator, &params.validator_address, denom, &amount()?)],
            "Undelegate",
        ),
        StakingTxType::Redelegate => {
            let destination = params.new_validator_address.as_deref().ok_or_else(|| {
                FlowError::InvalidState("no validator selected to redelegate to".to_string())
            })?;
            (
                vec![msg_begin_redelegate(
                    &delegator,
                    &params.validator_address,
                    destination,
                    denom,
                    &amount()?,
                )],
                "Redelegate",
            )
        }
        StakingTxType::ClaimRewards => {
            if params.reward_validators.is_empty() {
                return Err(FlowError::InvalidState("no rewards to claim".to_string()));
            }
            (
                params
                    .reward_validators
                    .iter()
                    .map(|v| msg_withdraw_delegator_reward(&delegator, v))
                    .collect(),
                "Claim Rewards",
            )
        }
    };

    Ok(vec![Transaction::cosmos(
        TxChainId::Evm(params.chain_id),
        title,
        format!("{} {}", title, params.validator_address),
        CosmosTx {
            msgs,
            fee: fee_for(params.tx_type, &config.fees).clone(),
            memo: String::new(),
        },
    )])
}

/// Validators that can receive a redelegation from `current`.
pub fn redelegate_candidates<'a>(validators: &'a [Validator], current: &str) -> Vec<&'a Validator> {
    validators
        .iter()
        .filter(|v| !v.jailed && v.operator_address != current)
        .collect()
}

/// Active validators whose moniker is close to `query`, closest first.
pub fn search_validators<'a>(validators: &'a [Validator], query: &str) -> Vec<&'a Validator> {
    let mut scored: Vec<(usize, &Validator)> = validators
        .iter()
        .filter(|v| !v.jailed)
        .map(|v| (levenshtein(query, &v.moniker), v))
        .filter(|(distance, _)| *distance < SEARCH_DISTANCE)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored.into_iter().map(|(_, v)| v).collect()
}

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}
