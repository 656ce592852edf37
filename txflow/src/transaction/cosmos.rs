//! Cosmos message constructors
//!
//! Messages are emitted in proto-JSON form (`type_url` plus a JSON body with
//! string-encoded integers) and are serialized to protobuf by the signer.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use super::CosmosMsg;
use crate::error::{FlowError, FlowResult};

pub const MSG_TRANSFER: &str = "/ibc.applications.transfer.v1.MsgTransfer";
pub const MSG_CONVERT_ERC20: &str = "/canto.erc20.v1.MsgConvertERC20";
pub const MSG_SEND_TO_ETH: &str = "/gravity.v1.MsgSendToEth";
pub const MSG_DELEGATE: &str = "/cosmos.staking.v1beta1.MsgDelegate";
pub const MSG_UNDELEGATE: &str = "/cosmos.staking.v1beta1.MsgUndelegate";
pub const MSG_BEGIN_REDELEGATE: &str = "/cosmos.staking.v1beta1.MsgBeginRedelegate";
pub const MSG_WITHDRAW_DELEGATOR_REWARD: &str =
    "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward";

fn coin(denom: &str, amount: &str) -> serde_json::Value {
    json!({ "denom": denom, "amount": amount })
}

/// IBC timeout timestamp in nanoseconds, `timeout_secs` after `now`.
pub fn ibc_timeout_ns(now: DateTime<Utc>, timeout_secs: u64) -> FlowResult<u64> {
    i64::try_from(timeout_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .and_then(|deadline| deadline.timestamp_nanos_opt())
        .and_then(|nanos| u64::try_from(nanos).ok())
        .ok_or_else(|| FlowError::InvalidAmount(format!("IBC timeout of {} seconds is out of range", timeout_secs)))
}

/// ICS-20 token transfer over `channel`; timeout is by timestamp only.
pub fn msg_transfer(
    channel: &str,
    denom: &str,
    amount: &str,
    sender: &str,
    receiver: &str,
    timeout_timestamp_ns: u64,
    memo: &str,
) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_TRANSFER.to_string(),
        value: json!({
            "source_port": "transfer",
            "source_channel": channel,
            "token": coin(denom, amount),
            "sender": sender,
            "receiver": receiver,
            "timeout_height": { "revision_number": "0", "revision_height": "0" },
            "timeout_timestamp": timeout_timestamp_ns.to_string(),
            "memo": memo,
        }),
    }
}

/// Converts an ERC20 held by the hex `sender` into its bank coin for `receiver`.
pub fn msg_convert_erc20(contract: &str, amount: &str, receiver: &str, sender: &str) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_CONVERT_ERC20.to_string(),
        value: json!({
            "contract_address": contract,
            "amount": amount,
            "receiver": receiver,
            "sender": sender,
        }),
    }
}

/// Gravity Bridge withdrawal to Ethereum.
pub fn msg_send_to_eth(
    sender: &str,
    eth_dest: &str,
    denom: &str,
    amount: &str,
    bridge_fee: &str,
    chain_fee: &str,
) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_SEND_TO_ETH.to_string(),
        value: json!({
            "sender": sender,
            "eth_dest": eth_dest,
            "amount": coin(denom, amount),
            "bridge_fee": coin(denom, bridge_fee),
            "chain_fee": coin(denom, chain_fee),
        }),
    }
}

pub fn msg_delegate(delegator: &str, validator: &str, denom: &str, amount: &str) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_DELEGATE.to_string(),
        value: json!({
            "delegator_address": delegator,
            "validator_address": validator,
            "amount": coin(denom, amount),
        }),
    }
}

pub fn msg_undelegate(delegator: &str, validator: &str, denom: &str, amount: &str) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_UNDELEGATE.to_string(),
        value: json!({
            "delegator_address": delegator,
            "validator_address": validator,
            "amount": coin(denom, amount),
        }),
    }
}

pub fn msg_begin_redelegate(
    delegator: &str,
    src_validator: &str,
    dst_validator: &str,
    denom: &str,
    amount: &str,
) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_BEGIN_REDELEGATE.to_string(),
        value: json!({
            "delegator_address": delegator,
            "validator_src_address": src_validator,
            "validator_dst_address": dst_validator,
            "amount": coin(denom, amount),
        }),
    }
}

pub fn msg_withdraw_delegator_reward(delegator: &str, validator: &str) -> CosmosMsg {
    CosmosMsg {
        type_url: MSG_WITHDRAW_DELEGATOR_REWARD.to_string(),
        value: json!({
            "delegator_address": delegator,
            "validator_address": validator,
        }),
    }
}
