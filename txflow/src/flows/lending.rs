//! cToken lending transactions
//!
//! Supply, withdraw, borrow and repay on a cToken market, plus entering and
//! exiting the market as collateral through the comptroller.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::amounts::{is_positive, max_uint256, to_base_units};
use crate::error::{FlowError, FlowResult};
use crate::flows::approval_if_needed;
use crate::registry::FlowEnv;
use crate::transaction::contracts::{address, encode_calldata, uint256, ICErc20, ICEther, IComptroller};
use crate::transaction::{EvmTx, Transaction, Validation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CTokenTxType {
    Supply,
    Withdraw,
    Borrow,
    Repay,
    Collateralize,
    Decollateralize,
}

impl CTokenTxType {
    fn needs_amount(&self) -> bool {
        !matches!(self, CTokenTxType::Collateralize | CTokenTxType::Decollateralize)
    }
}

/// cToken market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CToken {
    pub address: String,
    pub symbol: String,
    /// ERC20 underlying; `None` for the native-coin market
    pub underlying: Option<String>,
    /// Decimals of the underlying
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CTokenTxParams {
    pub chain_id: u64,
    pub eth_address: String,
    pub ctoken: CToken,
    pub tx_type: CTokenTxType,
    /// Human-readable amount of the underlying
    pub amount: String,
    /// Largest amount the user may enter (wallet balance, liquidity, debt)
    pub max: Option<String>,
    /// Repay the whole borrow, including interest accrued until inclusion
    pub repay_all: bool,
}

fn call(params: &CTokenTxParams, to: &str, data: String, value: &BigInt, title: &str) -> Transaction {
    Transaction::evm(
        params.chain_id,
        format!("{} {}", title, params.ctoken.symbol),
        format!("{} {} {}", title, params.amount, params.ctoken.symbol),
        EvmTx {
            from: params.eth_address.clone(),
            to: to.to_string(),
            data,
            value: value.to_string(),
        },
    )
}

/// Builds the lending transactions.
///
/// ERC20 supply and repay are preceded by an approval of the underlying to
/// the cToken when the current allowance is lower than the amount.
pub async fn build(env: &FlowEnv, params: &CTokenTxParams) -> FlowResult<Vec<Transaction>> {
    let network = env.evm_network(params.chain_id)?;
    let zero = BigInt::from(0u32);
    let ctoken = params.ctoken.address.as_str();

    match params.tx_type {
        CTokenTxType::Collateralize | CTokenTxType::Decollateralize => {
            let comptroller = env
                .config
                .lending
                .as_ref()
                .map(|l| l.comptroller_address.as_str())
                .ok_or_else(|| FlowError::InvalidState("lending is not configured".to_string()))?;
            let (data, title) = if params.tx_type == CTokenTxType::Collateralize {
                (
                    encode_calldata(&IComptroller::enterMarketsCall {
                        cTokens: vec![address(ctoken)?],
                    }),
                    "Collateralize",
                )
            } else {
                (
                    encode_calldata(&IComptroller::exitMarketCall {
                        cToken: address(ctoken)?,
                    }),
                    "Decollateralize",
                )
            };
            return Ok(vec![call(params, comptroller, data, &zero, title)]);
        }
        _ => {}
    }

    let amount = if params.repay_all && params.tx_type == CTokenTxType::Repay && params.ctoken.underlying.is_some() {
        max_uint256()
    } else {
        let amount = to_base_units(&params.amount, params.ctoken.decimals)?;
        if !is_positive(&amount) {
            return Err(FlowError::InvalidAmount("amount must be greater than zero".to_string()));
        }
        amount
    };

    let mut txs = Vec::new();
    match (params.tx_type, params.ctoken.underlying.as_deref()) {
        (CTokenTxType::Supply, Some(underlying)) | (CTokenTxType::Repay, Some(underlying)) => {
            if let Some(approve) = approval_if_needed(
                env.allowances.as_ref(),
                network,
                underlying,
                &params.eth_address,
                ctoken,
                &amount,
                &params.ctoken.symbol,
            )
            .await?
            {
                txs.push(approve);
            }
            let value = uint256(&amount)?;
            let (data, title) = if params.tx_type == CTokenTxType::Supply {
                (encode_calldata(&ICErc20::mintCall { mintAmount: value }), "Supply")
            } else {
                (encode_calldata(&ICErc20::repayBorrowCall { repayAmount: value }), "Repay")
            };
            txs.push(call(params, ctoken, data, &zero, title));
        }
        (CTokenTxType::Supply, None) => {
            let data = encode_calldata(&ICEther::mintCall {});
            txs.push(call(params, ctoken, data, &amount, "Supply"));
        }
        (CTokenTxType::Repay, None) => {
            let data = encode_calldata(&ICEther::repayBorrowCall {});
            txs.push(call(params, ctoken, data, &amount, "Repay"));
        }
        (CTokenTxType::Withdraw, _) => {
            let data = encode_calldata(&ICErc20::redeemUnderlyingCall {
                redeemAmount: uint256(&amount)?,
            });
            txs.push(call(params, ctoken, data, &zero, "Withdraw"));
        }
        (CTokenTxType::Borrow, _) => {
            let data = encode_calldata(&ICErc20::borrowCall {
                borrowAmount: uint256(&amount)?,
            });
            txs.push(call(params, ctoken, data, &zero, "Borrow"));
        }
        (CTokenTxType::Collateralize, _) | (CTokenTxType::Decollateralize, _) => {}
    }
    Ok(txs)
}

/// A retry is valid when the amount is positive and within `max`.
pub fn validate_retry(params: &CTokenTxParams) -> Validation {
    if !params.tx_type.needs_amount()
        || (params.repay_all && params.tx_type == CTokenTxType::Repay && params.ctoken.underlying.is_some())
    {
        return Validation::ok();
    }
    let amount = match to_base_units(&params.amount, params.ctoken.decimals) {
        Ok(amount) => amount,
        Err(e) => return Validation::invalid(e.to_string()),
    };
    if !is_positive(&amount) {
        return Validation::invalid("amount must be greater than zero");
    }
    if let Some(max) = &params.max {
        match to_base_units(max, params.ctoken.decimals) {
            Ok(max) if amount > max => return Validation::invalid("amount exceeds the maximum"),
            Ok(_) => {}
            Err(e) => return Validation::invalid(e.to_string()),
        }
    }
    Validation::ok()
}
