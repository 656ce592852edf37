//! Transaction Flow Registry
//!
//! Maps every flow type to its retry validator and transaction builder. The
//! mapping is a total match over a closed enum; handlers are plain function
//! pointers returning boxed futures.

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::bridge::{self, BridgeDispatcher, BridgeTransactionParams};
use crate::catalog::{BridgeDirection, Catalog, EvmNetwork};
use crate::chains::AllowanceReader;
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::flows::lending::{self, CTokenTxParams};
use crate::flows::pairs::{self, PairsTxParams};
use crate::flows::staking::{self, StakingTxParams};
use crate::transaction::{Transaction, Validation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionFlowType {
    BridgeIn,
    BridgeOut,
    ClmCtokenTx,
    DexLpTx,
    Staking,
}

impl TransactionFlowType {
    pub const ALL: [TransactionFlowType; 5] = [
        TransactionFlowType::BridgeIn,
        TransactionFlowType::BridgeOut,
        TransactionFlowType::ClmCtokenTx,
        TransactionFlowType::DexLpTx,
        TransactionFlowType::Staking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionFlowType::BridgeIn => "BRIDGE_IN",
            TransactionFlowType::BridgeOut => "BRIDGE_OUT",
            TransactionFlowType::ClmCtokenTx => "CLM_CTOKEN_TX",
            TransactionFlowType::DexLpTx => "DEX_LP_TX",
            TransactionFlowType::Staking => "STAKING",
        }
    }
}

impl fmt::Display for TransactionFlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one flow invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowParams {
    Bridge(BridgeTransactionParams),
    Lending(CTokenTxParams),
    Pairs(PairsTxParams),
    Staking(StakingTxParams),
}

impl FlowParams {
    fn variant(&self) -> &'static str {
        match self {
            FlowParams::Bridge(_) => "Bridge",
            FlowParams::Lending(_) => "Lending",
            FlowParams::Pairs(_) => "Pairs",
            FlowParams::Staking(_) => "Staking",
        }
    }
}

/// Shared collaborators handed to every handler
pub struct FlowEnv {
    pub config: Arc<FlowConfig>,
    pub catalog: Arc<Catalog>,
    pub dispatcher: Arc<BridgeDispatcher>,
    pub allowances: Arc<dyn AllowanceReader>,
}

impl FlowEnv {
    /// EVM network with the given chain id.
    pub fn evm_network(&self, chain_id: u64) -> FlowResult<&EvmNetwork> {
        self.catalog
            .networks()
            .iter()
            .filter_map(|n| n.as_evm())
            .find(|n| n.chain_id == chain_id)
            .ok_or_else(|| FlowError::not_found("network", chain_id.to_string()))
    }
}

pub type ValidateRetryFn =
    for<'a> fn(&'a FlowEnv, &'a FlowParams) -> BoxFuture<'a, FlowResult<Validation>>;
pub type BuildFn =
    for<'a> fn(&'a FlowEnv, &'a FlowParams) -> BoxFuture<'a, FlowResult<Vec<Transaction>>>;

/// Handler pair of a flow
#[derive(Clone, Copy)]
pub struct FlowHandlers {
    /// Whether a failed flow may be retried with the same parameters
    pub validate_retry: ValidateRetryFn,
    /// Builds the ordered transactions; never mutates external state
    pub build: BuildFn,
}

/// Returns the handlers of `flow`.
pub fn resolve(flow: TransactionFlowType) -> FlowHandlers {
    match flow {
        TransactionFlowType::BridgeIn => FlowHandlers {
            validate_retry: validate_bridge_in,
            build: build_bridge_in,
        },
        TransactionFlowType::BridgeOut => FlowHandlers {
            validate_retry: validate_bridge_out,
            build: build_bridge_out,
        },
        TransactionFlowType::ClmCtokenTx => FlowHandlers {
            validate_retry: validate_lending,
            build: build_lending,
        },
        TransactionFlowType::DexLpTx => FlowHandlers {
            validate_retry: validate_pairs,
            build: build_pairs,
        },
        TransactionFlowType::Staking => FlowHandlers {
            validate_retry: validate_staking,
            build: build_staking,
        },
    }
}

fn mismatch(flow: TransactionFlowType, params: &FlowParams) -> FlowError {
    FlowError::InvalidState(format!(
        "{} flow cannot take {} parameters",
        flow,
        params.variant()
    ))
}

fn bridge_params(
    flow: TransactionFlowType,
    direction: BridgeDirection,
    params: &FlowParams,
) -> FlowResult<&BridgeTransactionParams> {
    match params {
        FlowParams::Bridge(p) if p.direction == direction => Ok(p),
        _ => Err(mismatch(flow, params)),
    }
}

fn validate_bridge_in<'a>(_env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Validation>> {
    async move {
        let p = bridge_params(TransactionFlowType::BridgeIn, BridgeDirection::In, params)?;
        Ok(bridge::validate_retry(p))
    }
    .boxed()
}

fn build_bridge_in<'a>(env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Vec<Transaction>>> {
    async move {
        let p = bridge_params(TransactionFlowType::BridgeIn, BridgeDirection::In, params)?;
        env.dispatcher.build(p).await
    }
    .boxed()
}

fn validate_bridge_out<'a>(_env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Validation>> {
    async move {
        let p = bridge_params(TransactionFlowType::BridgeOut, BridgeDirection::Out, params)?;
        Ok(bridge::validate_retry(p))
    }
    .boxed()
}

fn build_bridge_out<'a>(env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Vec<Transaction>>> {
    async move {
        let p = bridge_params(TransactionFlowType::BridgeOut, BridgeDirection::Out, params)?;
        env.dispatcher.build(p).await
    }
    .boxed()
}

fn validate_lending<'a>(_env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Validation>> {
    async move {
        match params {
            FlowParams::Lending(p) => Ok(lending::validate_retry(p)),
            _ => Err(mismatch(TransactionFlowType::ClmCtokenTx, params)),
        }
    }
    .boxed()
}

fn build_lending<'a>(env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Vec<Transaction>>> {
    async move {
        match params {
            FlowParams::Lending(p) => lending::build(env, p).await,
            _ => Err(mismatch(TransactionFlowType::ClmCtokenTx, params)),
        }
    }
    .boxed()
}

// LP retries are always allowed
fn validate_pairs<'a>(_env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Validation>> {
    async move {
        match params {
            FlowParams::Pairs(_) => Ok(Validation::ok()),
            _ => Err(mismatch(TransactionFlowType::DexLpTx, params)),
        }
    }
    .boxed()
}

fn build_pairs<'a>(env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Vec<Transaction>>> {
    async move {
        match params {
            FlowParams::Pairs(p) => pairs::build(env, p).await,
            _ => Err(mismatch(TransactionFlowType::DexLpTx, params)),
        }
    }
    .boxed()
}

fn validate_staking<'a>(env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Validation>> {
    async move {
        match params {
            FlowParams::Staking(p) => Ok(staking::validate_retry(&env.config, p)),
            _ => Err(mismatch(TransactionFlowType::Staking, params)),
        }
    }
    .boxed()
}

fn build_staking<'a>(env: &'a FlowEnv, params: &'a FlowParams) -> BoxFuture<'a, FlowResult<Vec<Transaction>>> {
    async move {
        match params {
            FlowParams::Staking(p) => staking::build(&env.config, p),
            _ => Err(mismatch(TransactionFlowType::Staking, params)),
        }
    }
    .boxed()
}
