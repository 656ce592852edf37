//! LayerZero OFT builder
//!
//! Quotes the native messaging fee with `estimateSendFee` and sends the
//! tokens with `sendFrom`, paying the quoted fee as value. Used in both
//! directions; both ends must have a LayerZero endpoint id.

use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::gravity::evm_network;
use super::{request_amount, BridgeRequest, TxBuilder};
use crate::chains::LayerZeroQuoter;
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult, ResultExt};
use crate::transaction::contracts::{address, encode_calldata, hex_bytes, uint256, IOFT};
use crate::transaction::{EvmTx, Transaction};

pub struct LayerZeroBuilder {
    adapter_params: String,
    quoter: Arc<dyn LayerZeroQuoter>,
}

impl LayerZeroBuilder {
    pub fn new(config: &FlowConfig, quoter: Arc<dyn LayerZeroQuoter>) -> Self {
        Self {
            adapter_params: config.layer_zero.adapter_params.clone(),
            quoter,
        }
    }
}

#[async_trait]
impl TxBuilder for LayerZeroBuilder {
    async fn build(&self, request: &BridgeRequest) -> FlowResult<Vec<Transaction>> {
        let source = evm_network(&request.from, "source")?;
        let destination = evm_network(&request.to, "destination")?;
        if source.lz_chain_id.is_none() {
            return Err(FlowError::InvalidState(format!(
                "{} has no LayerZero endpoint id",
                source.id
            )));
        }
        let dst_lz_chain_id = destination.lz_chain_id.ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no LayerZero endpoint id", destination.id))
        })?;
        let oft = request.token.address.as_deref().ok_or_else(|| {
            FlowError::InvalidState(format!("{} has no OFT address", request.token.id))
        })?;
        let amount = request_amount(request)?;

        let native_fee = self
            .quoter
            .estimate_send_fee(
                source,
                oft,
                dst_lz_chain_id,
                &request.eth_address,
                &amount,
                &self.adapter_params,
            )
            .await
            .upstream("estimate_send_fee")?;
        info!("LayerZero fee for {} to {}: {} wei", request.token.symbol, destination.id, native_fee);

        let sender = address(&request.eth_address)?;
        let data = encode_calldata(&IOFT::sendFromCall {
            from: sender,
            dstChainId: dst_lz_chain_id,
            toAddress: hex_bytes(&request.eth_address)?,
            amount: uint256(&amount)?,
            refundAddress: sender,
            zroPaymentAddress: Address::ZERO,
            adapterParams: hex_bytes(&self.adapter_params)?,
        });

        Ok(vec![Transaction::evm(
            source.chain_id,
            format!("Bridge {}", request.token.symbol),
            format!(
                "Send {} {} to {} through LayerZero",
                request.amount, request.token.symbol, destination.name
            ),
            EvmTx {
                from: request.eth_address.clone(),
                to: oft.to_string(),
                data,
                value: native_fee.to_string(),
            },
        )])
    }
}
