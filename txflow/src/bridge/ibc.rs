//! IBC builder
//!
//! Bridge-in is a single `MsgTransfer` signed natively on the Cosmos source
//! chain. Bridge-out converts the hub ERC20 (when there is one) and then
//! transfers the bank coin over the hub's channel to the destination.

use async_trait::async_trait;
use chrono::Utc;

use chain_clients_common::eth_to_bech32;

use super::gravity::evm_network;
use super::{request_amount, BridgeRequest, TxBuilder};
use crate::catalog::{BridgeDirection, CosmosNetwork, Network};
use crate::config::{FeeEntry, FlowConfig};
use crate::error::{FlowError, FlowResult, ResultExt};
use crate::transaction::cosmos::{ibc_timeout_ns, msg_convert_erc20, msg_transfer};
use crate::transaction::{CosmosTx, Transaction, TxChainId};

pub struct IbcBuilder {
    hub_prefix: String,
    timeout_secs: u64,
    convert_fee: FeeEntry,
    transfer_fee: FeeEntry,
}

fn cosmos_network<'a>(network: &'a Network, role: &str) -> FlowResult<&'a CosmosNetwork> {
    network.as_cosmos().ok_or_else(|| {
        FlowError::InvalidState(format!("{} network {} is not a Cosmos network", role, network.id()))
    })
}

impl IbcBuilder {
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            hub_prefix: config.hub.bech32_prefix.clone(),
            timeout_secs: config.ibc.timeout_secs,
            convert_fee: config.fees.convert_erc20.clone(),
            transfer_fee: config.fees.ibc_transfer.clone(),
        }
    }

    fn bridge_in(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        let source = cosmos_network(&request.from, "source")?;
        let sender = request.cosmos_address.as_deref().ok_or_else(|| {
            FlowError::InvalidState("a cosmos sender address is required for IBC".to_string())
        })?;
        let channel = source.channel_to_hub.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no channel to the hub", source.id))
        })?;
        let denom = request.token.denom.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no denom on {}", request.token.id, source.id))
        })?;
        let amount = request_amount(request)?;
        let receiver = eth_to_bech32(&request.eth_address, &self.hub_prefix).upstream("address")?;

        let fee = source.transfer_fee.clone().unwrap_or_else(|| FeeEntry {
            amount: "0".to_string(),
            denom: denom.to_string(),
            gas: self.transfer_fee.gas,
        });

        Ok(vec![Transaction::cosmos(
            TxChainId::Cosmos(source.chain_id.clone()),
            format!("IBC {}", request.token.symbol),
            format!(
                "Transfer {} {} from {} to {}",
                request.amount,
                request.token.symbol,
                source.name,
                request.to.name()
            ),
            CosmosTx {
                msgs: vec![msg_transfer(
                    channel,
                    denom,
                    &amount.to_string(),
                    sender,
                    &receiver,
                    ibc_timeout_ns(Utc::now(), self.timeout_secs)?,
                    "",
                )],
                fee,
                memo: String::new(),
            },
        )])
    }

    fn bridge_out(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        let hub = evm_network(&request.from, "source")?;
        let destination = cosmos_network(&request.to, "destination")?;
        let channel = destination.hub_channel.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("no hub channel configured for {}", destination.id))
        })?;
        let denom = request.token.denom.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no denom on the hub", request.token.id))
        })?;
        let amount = request_amount(request)?;

        let hub_address = eth_to_bech32(&request.eth_address, &self.hub_prefix).upstream("address")?;
        let receiver = match &request.cosmos_address {
            Some(address) => address.clone(),
            None => eth_to_bech32(&request.eth_address, &destination.bech32_prefix).upstream("address")?,
        };

        let mut txs = Vec::new();
        if let Some(contract) = &request.token.address {
            txs.push(Transaction::cosmos(
                TxChainId::Evm(hub.chain_id),
                format!("Convert {}", request.token.symbol),
                format!("Convert {} {} to its native coin", request.amount, request.token.symbol),
                CosmosTx {
                    msgs: vec![msg_convert_erc20(
                        contract,
                        &amount.to_string(),
                        &hub_address,
                        &request.eth_address,
                    )],
                    fee: self.convert_fee.clone(),
                    memo: String::new(),
                },
            ));
        }

        txs.push(Transaction::cosmos(
            TxChainId::Evm(hub.chain_id),
            format!("IBC {}", request.token.symbol),
            format!(
                "Transfer {} {} to {}",
                request.amount, request.token.symbol, destination.name
            ),
            CosmosTx {
                msgs: vec![msg_transfer(
                    channel,
                    denom,
                    &amount.to_string(),
                    &hub_address,
                    &receiver,
                    ibc_timeout_ns(Utc::now(), self.timeout_secs)?,
                    "",
                )],
                fee: self.transfer_fee.clone(),
                memo: String::new(),
            },
        ));
        Ok(txs)
    }
}

#[async_trait]
impl TxBuilder for IbcBuilder {
    async fn build(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        match request.direction {
            BridgeDirection::In => self.bridge_in(request),
            BridgeDirection::Out => self.bridge_out(request),
        }
    }
}
