//! Transaction Model
//!
//! Unsigned, ordered units of work produced by the flow builders. An EVM
//! transaction is a contract call; a Cosmos transaction is a list of proto
//! messages (JSON encoded) with a fixed fee.

pub mod contracts;
pub mod cosmos;

use serde::Serialize;
use std::fmt;

use crate::config::FeeEntry;

/// Chain a transaction must be signed for.
///
/// Cosmos payloads on an `Evm` chain id are signed through EIP-712 (see
/// `signing`); Cosmos payloads on a `Cosmos` chain id are signed natively by
/// the user's Cosmos wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TxChainId {
    Evm(u64),
    Cosmos(String),
}

impl fmt::Display for TxChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxChainId::Evm(id) => write!(f, "{}", id),
            TxChainId::Cosmos(id) => f.write_str(id),
        }
    }
}

/// EVM contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvmTx {
    pub from: String,
    pub to: String,
    /// `0x`-prefixed calldata
    pub data: String,
    /// Native value in wei (decimal)
    pub value: String,
}

/// Single Cosmos proto message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CosmosMsg {
    pub type_url: String,
    pub value: serde_json::Value,
}

/// Cosmos transaction body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CosmosTx {
    pub msgs: Vec<CosmosMsg>,
    pub fee: FeeEntry,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxPayload {
    Evm(EvmTx),
    Cosmos(CosmosTx),
}

/// Signable unit of work; flows return these in execution order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub chain_id: TxChainId,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub payload: TxPayload,
}

impl Transaction {
    pub fn evm(chain_id: u64, title: impl Into<String>, description: impl Into<String>, tx: EvmTx) -> Self {
        Self {
            chain_id: TxChainId::Evm(chain_id),
            title: title.into(),
            description: description.into(),
            payload: TxPayload::Evm(tx),
        }
    }

    pub fn cosmos(
        chain_id: TxChainId,
        title: impl Into<String>,
        description: impl Into<String>,
        tx: CosmosTx,
    ) -> Self {
        Self {
            chain_id,
            title: title.into(),
            description: description.into(),
            payload: TxPayload::Cosmos(tx),
        }
    }

    pub fn as_evm(&self) -> Option<&EvmTx> {
        match &self.payload {
            TxPayload::Evm(tx) => Some(tx),
            TxPayload::Cosmos(_) => None,
        }
    }

    pub fn as_cosmos(&self) -> Option<&CosmosTx> {
        match &self.payload {
            TxPayload::Cosmos(tx) => Some(tx),
            TxPayload::Evm(_) => None,
        }
    }
}

/// Outcome of a retry validation. Invalid input is reported here, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}
