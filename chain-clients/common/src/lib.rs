//! Shared utilities for the txflow chain clients
//!
//! Address conversion between EVM hex accounts and bech32 Cosmos accounts, plus
//! hex normalization helpers used by both the EVM and Cosmos clients.

pub mod address;

pub use address::{
    bech32_to_eth, eth_address_bytes, eth_to_bech32, is_eth_address, normalize_eth_address,
    strip_0x,
};
