//! Non-bridge transaction flows: lending, liquidity pairs and staking.

pub mod lending;
pub mod pairs;
pub mod staking;

use num_bigint::BigInt;
use tracing::debug;

use crate::catalog::EvmNetwork;
use crate::chains::AllowanceReader;
use crate::error::{FlowResult, ResultExt};
use crate::transaction::contracts::{address, encode_calldata, uint256, IERC20};
use crate::transaction::{EvmTx, Transaction};

/// Approval of `amount` to `spender` when the current allowance is lower.
///
/// The allowance lookup fails closed: an unreadable allowance is an error,
/// not an assumed zero.
pub(crate) async fn approval_if_needed(
    allowances: &dyn AllowanceReader,
    network: &EvmNetwork,
    token: &str,
    owner: &str,
    spender: &str,
    amount: &BigInt,
    symbol: &str,
) -> FlowResult<Option<Transaction>> {
    let current = allowances
        .allowance(network, token, owner, spender)
        .await
        .upstream("allowance")?;
    if &current >= amount {
        debug!("Allowance {} covers {} on {}", current, amount, token);
        return Ok(None);
    }

    let data = encode_calldata(&IERC20::approveCall {
        spender: address(spender)?,
        amount: uint256(amount)?,
    });
    Ok(Some(Transaction::evm(
        network.chain_id,
        format!("Approve {}", symbol),
        format!("Approve {} for spending", symbol),
        EvmTx {
            from: owner.to_string(),
            to: token.to_string(),
            data,
            value: "0".to_string(),
        },
    )))
}
