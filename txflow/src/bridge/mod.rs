//! Bridge Strategy Dispatcher
//!
//! Validates a bridge intent against the method/network compatibility table
//! and hands it to exactly one chain-specific builder.

pub mod gravity;
pub mod ibc;
pub mod layer_zero;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::amounts::{is_positive, to_base_units};
use crate::catalog::{BridgeDirection, BridgingMethod, Network, Token};
use crate::chains::{AllowanceReader, LayerZeroQuoter};
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::selection::Selection;
use crate::transaction::{Transaction, Validation};

pub use gravity::GravityBridgeBuilder;
pub use ibc::IbcBuilder;
pub use layer_zero::LayerZeroBuilder;

/// Bridge intent as supplied by the caller; every selection may be missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeTransactionParams {
    pub direction: BridgeDirection,
    pub method: Option<BridgingMethod>,
    pub from: Option<Network>,
    pub to: Option<Network>,
    pub token: Option<Token>,
    pub eth_address: String,
    pub cosmos_address: Option<String>,
    /// Human-readable decimal amount
    pub amount: String,
}

/// Bridge intent whose preconditions have been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
    pub direction: BridgeDirection,
    pub method: BridgingMethod,
    pub from: Network,
    pub to: Network,
    pub token: Token,
    pub eth_address: String,
    pub cosmos_address: Option<String>,
    pub amount: String,
}

/// Chain-specific transaction builder for one bridging method
#[async_trait]
pub trait TxBuilder: Send + Sync {
    async fn build(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>>;
}

fn operation(direction: BridgeDirection) -> &'static str {
    match direction {
        BridgeDirection::In => "bridge_in",
        BridgeDirection::Out => "bridge_out",
    }
}

/// Checks the dispatch preconditions in order.
///
/// # Returns
///
/// * `Err(FlowError::InvalidState)` - Token, either network, or method missing
/// * `Err(FlowError::Incompatible)` - Method cannot bridge between the two families
pub fn check_params(params: &BridgeTransactionParams) -> FlowResult<BridgeRequest> {
    let token = params
        .token
        .clone()
        .ok_or_else(|| FlowError::InvalidState("no token selected".to_string()))?;
    let (from, to) = match (&params.from, &params.to) {
        (Some(from), Some(to)) => (from.clone(), to.clone()),
        _ => {
            return Err(FlowError::InvalidState(
                "source and destination networks must both be selected".to_string(),
            ))
        }
    };
    let method = params
        .method
        .ok_or_else(|| FlowError::InvalidState("no bridging method selected".to_string()))?;

    if !method.is_compatible(params.direction, from.family(), to.family()) {
        return Err(FlowError::Incompatible(format!(
            "{} cannot bridge {:?} from {} to {}",
            method,
            params.direction,
            from.id(),
            to.id()
        )));
    }

    Ok(BridgeRequest {
        direction: params.direction,
        method,
        from,
        to,
        token,
        eth_address: params.eth_address.clone(),
        cosmos_address: params.cosmos_address.clone(),
        amount: params.amount.clone(),
    })
}

/// Dispatches bridge intents to the builder registered for each method
pub struct BridgeDispatcher {
    gravity: Arc<dyn TxBuilder>,
    layer_zero: Arc<dyn TxBuilder>,
    ibc: Arc<dyn TxBuilder>,
}

impl BridgeDispatcher {
    pub fn new(gravity: Arc<dyn TxBuilder>, layer_zero: Arc<dyn TxBuilder>, ibc: Arc<dyn TxBuilder>) -> Self {
        Self {
            gravity,
            layer_zero,
            ibc,
        }
    }

    /// Dispatcher with the Gravity, LayerZero and IBC builders.
    pub fn from_config(
        config: &FlowConfig,
        allowances: Arc<dyn AllowanceReader>,
        quoter: Arc<dyn LayerZeroQuoter>,
    ) -> Self {
        Self::new(
            Arc::new(GravityBridgeBuilder::new(config, allowances)),
            Arc::new(LayerZeroBuilder::new(config, quoter)),
            Arc::new(IbcBuilder::new(config)),
        )
    }

    fn builder(&self, method: BridgingMethod) -> &Arc<dyn TxBuilder> {
        match method {
            BridgingMethod::GravityBridge => &self.gravity,
            BridgingMethod::LayerZero => &self.layer_zero,
            BridgingMethod::Ibc => &self.ibc,
        }
    }

    /// Builds the ordered transactions for a bridge intent.
    ///
    /// Builder failures are returned as `FlowError::Upstream` tagged with
    /// `bridge_in` or `bridge_out`.
    pub async fn build(&self, params: &BridgeTransactionParams) -> FlowResult<Vec<Transaction>> {
        let request = check_params(params)?;
        info!(
            "Dispatching {} {:?}: {} -> {} ({})",
            request.method,
            request.direction,
            request.from.id(),
            request.to.id(),
            request.token.symbol
        );

        let txs = self
            .builder(request.method)
            .build(&request)
            .await
            .map_err(|e| FlowError::upstream(operation(request.direction), e))?;
        debug!("Builder produced {} transactions", txs.len());
        Ok(txs)
    }

    /// Builds a bridge-in from a selection snapshot.
    pub async fn bridge_in(
        &self,
        selection: &Selection,
        eth_address: &str,
        cosmos_address: Option<&str>,
        amount: &str,
    ) -> FlowResult<Vec<Transaction>> {
        self.build(&params_from_selection(selection, BridgeDirection::In, eth_address, cosmos_address, amount)?)
            .await
    }

    /// Builds a bridge-out from a selection snapshot.
    pub async fn bridge_out(
        &self,
        selection: &Selection,
        eth_address: &str,
        cosmos_address: Option<&str>,
        amount: &str,
    ) -> FlowResult<Vec<Transaction>> {
        self.build(&params_from_selection(selection, BridgeDirection::Out, eth_address, cosmos_address, amount)?)
            .await
    }

    /// Checks whether a failed bridge may be retried with the same parameters.
    pub fn validate_retry(&self, params: &BridgeTransactionParams) -> Validation {
        validate_retry(params)
    }
}

/// Converts a selection into dispatcher parameters.
pub fn params_from_selection(
    selection: &Selection,
    direction: BridgeDirection,
    eth_address: &str,
    cosmos_address: Option<&str>,
    amount: &str,
) -> FlowResult<BridgeTransactionParams> {
    if selection.direction != direction {
        return Err(FlowError::InvalidState(format!(
            "selection is for {:?}, not {:?}",
            selection.direction, direction
        )));
    }
    Ok(BridgeTransactionParams {
        direction,
        method: selection.selected_method,
        from: selection.from_network.clone(),
        to: selection.to_network.clone(),
        token: selection.selected_token.clone(),
        eth_address: eth_address.to_string(),
        cosmos_address: cosmos_address.map(str::to_string),
        amount: amount.to_string(),
    })
}

/// Retry validation: the preconditions, a positive amount, and a Cosmos
/// sender for IBC bridge-in.
pub fn validate_retry(params: &BridgeTransactionParams) -> Validation {
    let request = match check_params(params) {
        Ok(request) => request,
        Err(e) => return Validation::invalid(e.to_string()),
    };

    match to_base_units(&request.amount, request.token.decimals) {
        Ok(amount) if is_positive(&amount) => {}
        Ok(_) => return Validation::invalid("amount must be greater than zero"),
        Err(e) => return Validation::invalid(e.to_string()),
    }

    if request.method == BridgingMethod::Ibc
        && request.direction == BridgeDirection::In
        && request.cosmos_address.is_none()
    {
        return Validation::invalid("a cosmos sender address is required for IBC");
    }

    Validation::ok()
}

/// Parses and checks the amount of a request in the token's base units.
pub(crate) fn request_amount(request: &BridgeRequest) -> FlowResult<num_bigint::BigInt> {
    let amount = to_base_units(&request.amount, request.token.decimals)?;
    if !is_positive(&amount) {
        return Err(FlowError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}
