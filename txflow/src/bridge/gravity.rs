//! Gravity Bridge builder
//!
//! Bridge-in: optional ERC20 approval, then `sendToCosmos` on the Gravity
//! contract with the user's hub address as destination.
//!
//! Bridge-out: convert the hub ERC20 to its bank coin, IBC it to Gravity
//! Bridge, then `MsgSendToEth` on Gravity Bridge.

use async_trait::async_trait;
use chrono::Utc;
use num_bigint::BigInt;
use std::sync::Arc;

use chain_clients_common::eth_to_bech32;

use super::{request_amount, BridgeRequest, TxBuilder};
use crate::catalog::{BridgeDirection, EvmNetwork, Network};
use crate::chains::AllowanceReader;
use crate::config::{FeeConfig, FlowConfig, GravityConfig};
use crate::error::{FlowError, FlowResult, ResultExt};
use crate::flows::approval_if_needed;
use crate::transaction::contracts::{address, encode_calldata, uint256, IGravity};
use crate::transaction::cosmos::{ibc_timeout_ns, msg_convert_erc20, msg_send_to_eth, msg_transfer};
use crate::transaction::{CosmosTx, EvmTx, Transaction, TxChainId};

pub struct GravityBridgeBuilder {
    gravity: GravityConfig,
    hub_prefix: String,
    fees: FeeConfig,
    ibc_timeout_secs: u64,
    allowances: Arc<dyn AllowanceReader>,
}

pub(crate) fn evm_network<'a>(network: &'a Network, role: &str) -> FlowResult<&'a EvmNetwork> {
    network
        .as_evm()
        .ok_or_else(|| FlowError::InvalidState(format!("{} network {} is not an EVM network", role, network.id())))
}

impl GravityBridgeBuilder {
    pub fn new(config: &FlowConfig, allowances: Arc<dyn AllowanceReader>) -> Self {
        Self {
            gravity: config.gravity.clone(),
            hub_prefix: config.hub.bech32_prefix.clone(),
            fees: config.fees.clone(),
            ibc_timeout_secs: config.ibc.timeout_secs,
            allowances,
        }
    }

    async fn bridge_in(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        let source = evm_network(&request.from, "source")?;
        let token = request.token.address.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no ERC20 address", request.token.id))
        })?;
        let amount = request_amount(request)?;
        let destination = eth_to_bech32(&request.eth_address, &self.hub_prefix).upstream("address")?;

        let mut txs = Vec::new();
        if let Some(approve) = approval_if_needed(
            self.allowances.as_ref(),
            source,
            token,
            &request.eth_address,
            &self.gravity.bridge_contract,
            &amount,
            &request.token.symbol,
        )
        .await?
        {
            txs.push(approve);
        }

        let data = encode_calldata(&IGravity::sendToCosmosCall {
            tokenContract: address(token)?,
            destination,
            amount: uint256(&amount)?,
        });
        txs.push(Transaction::evm(
            source.chain_id,
            format!("Bridge {}", request.token.symbol),
            format!("Send {} {} through Gravity Bridge", request.amount, request.token.symbol),
            EvmTx {
                from: request.eth_address.clone(),
                to: self.gravity.bridge_contract.clone(),
                data,
                value: "0".to_string(),
            },
        ));
        Ok(txs)
    }

    async fn bridge_out(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        let hub = evm_network(&request.from, "source")?;
        let denom = request.token.denom.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no denom on the hub", request.token.id))
        })?;
        let gravity_denom = request.token.counterparty_denom.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no Gravity Bridge denom", request.token.id))
        })?;
        let amount = request_amount(request)?;

        let hub_address = eth_to_bech32(&request.eth_address, &self.hub_prefix).upstream("address")?;
        let gravity_address =
            eth_to_bech32(&request.eth_address, &self.gravity.bech32_prefix).upstream("address")?;

        // fees are taken out of the bridged amount
        let bridge_fee = crate::amounts::parse_base_units(&self.gravity.bridge_fee)?;
        let chain_fee = &amount * BigInt::from(self.gravity.chain_fee_bps) / BigInt::from(10_000u32);
        let send_amount = &amount - &bridge_fee - &chain_fee;
        if !crate::amounts::is_positive(&send_amount) {
            return Err(FlowError::InvalidAmount(format!(
                "{} does not cover the Gravity Bridge fees",
                request.amount
            )));
        }

        let hub_chain = TxChainId::Evm(hub.chain_id);
        let mut txs = Vec::new();

        if let Some(contract) = &request.token.address {
            txs.push(Transaction::cosmos(
                hub_chain.clone(),
                format!("Convert {}", request.token.symbol),
                format!("Convert {} {} to its native coin", request.amount, request.token.symbol),
                CosmosTx {
                    msgs: vec![msg_convert_erc20(
                        contract,
                        &amount.to_string(),
                        &hub_address,
                        &request.eth_address,
                    )],
                    fee: self.fees.convert_erc20.clone(),
                    memo: String::new(),
                },
            ));
        }

        txs.push(Transaction::cosmos(
            hub_chain,
            format!("IBC {} to Gravity Bridge", request.token.symbol),
            format!("Transfer {} {} to Gravity Bridge", request.amount, request.token.symbol),
            CosmosTx {
                msgs: vec![msg_transfer(
                    &self.gravity.hub_channel,
                    denom,
                    &amount.to_string(),
                    &hub_address,
                    &gravity_address,
                    ibc_timeout_ns(Utc::now(), self.ibc_timeout_secs)?,
                    "",
                )],
                fee: self.fees.ibc_transfer.clone(),
                memo: String::new(),
            },
        ));

        txs.push(Transaction::cosmos(
            TxChainId::Evm(self.gravity.evm_chain_id),
            format!("Send {} to {}", request.token.symbol, request.to.name()),
            format!("Withdraw {} {} to Ethereum", request.amount, request.token.symbol),
            CosmosTx {
                msgs: vec![msg_send_to_eth(
                    &gravity_address,
                    &request.eth_address,
                    gravity_denom,
                    &send_amount.to_string(),
                    &bridge_fee.to_string(),
                    &chain_fee.to_string(),
                )],
                fee: self.fees.send_to_eth.clone(),
                memo: String::new(),
            },
        ));
        Ok(txs)
    }
}

#[async_trait]
impl TxBuilder for GravityBridgeBuilder {
    async fn build(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        match request.direction {
            BridgeDirection::In => self.bridge_in(request).await,
            BridgeDirection::Out => self.bridge_out(request).await,
        }
    }
}
