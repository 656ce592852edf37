//! Transaction flow library for multi-chain clients
//!
//! Resolves user intents (bridge, lend, provide liquidity, stake) into ordered
//! sequences of signable EVM and Cosmos transactions.

pub mod amounts;
pub mod bridge;
pub mod catalog;
pub mod chains;
pub mod config;
pub mod error;
pub mod flows;
pub mod registry;
pub mod selection;
pub mod signing;
pub mod transaction;

// Re-export public types for convenience
pub use amounts::{to_base_units, to_display_string, DisplayOptions};
pub use bridge::{BridgeDispatcher, BridgeRequest, BridgeTransactionParams, TxBuilder};
pub use catalog::{BridgeDirection, BridgingMethod, Catalog, ChainFamily, Network, Token, TokenWithBalance};
pub use chains::{AccountLookup, Accounts, AllowanceReader, BalanceService, LayerZeroQuoter};
pub use config::FlowConfig;
pub use error::{ErrorKind, FlowError, FlowResult};
pub use registry::{resolve, FlowEnv, FlowHandlers, FlowParams, TransactionFlowType};
pub use selection::{BridgeSession, Selection, SelectionEvent, SessionProps, Transition};
pub use signing::{ContextResolver, SignableTransaction, SigningContext};
pub use transaction::{Transaction, TxChainId, TxPayload, Validation};
