//! Address conversion helpers
//!
//! Ethermint-style chains (the hub and Gravity Bridge) derive the Cosmos
//! account from the same 20 bytes as the EVM account, so converting between
//! the two is a re-encoding of the raw bytes under a different bech32 prefix.

use anyhow::{Context, Result};
use bech32::{Bech32, Hrp};

/// Strips an optional `0x`/`0X` prefix.
pub fn strip_0x(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Decodes a `0x`-prefixed EVM address into its 20 raw bytes.
///
/// # Returns
///
/// * `Ok([u8; 20])` - Raw address bytes
/// * `Err(anyhow::Error)` - Missing prefix, invalid hex, or wrong length
pub fn eth_address_bytes(address: &str) -> Result<[u8; 20]> {
    let trimmed = address.trim();
    if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        anyhow::bail!("EVM address must be 0x-prefixed: {}", address);
    }
    let bytes = hex::decode(strip_0x(trimmed))
        .with_context(|| format!("Invalid hex in EVM address {}", address))?;
    if bytes.len() != 20 {
        anyhow::bail!(
            "Invalid EVM address length: expected 20 bytes, got {}",
            bytes.len()
        );
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Returns true for a well-formed `0x`-prefixed 20-byte hex address.
pub fn is_eth_address(address: &str) -> bool {
    eth_address_bytes(address).is_ok()
}

/// Lowercases an EVM address and re-adds the `0x` prefix.
pub fn normalize_eth_address(address: &str) -> Result<String> {
    let bytes = eth_address_bytes(address)?;
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Converts an EVM address to a bech32 account under `prefix`.
///
/// # Arguments
///
/// * `address` - `0x`-prefixed EVM address
/// * `prefix` - bech32 human-readable part (e.g. `canto`, `gravity`)
///
/// # Returns
///
/// * `Ok(String)` - bech32 encoded account
/// * `Err(anyhow::Error)` - Malformed address or invalid prefix
pub fn eth_to_bech32(address: &str, prefix: &str) -> Result<String> {
    let bytes = eth_address_bytes(address)?;
    let hrp = Hrp::parse(prefix).with_context(|| format!("Invalid bech32 prefix {}", prefix))?;
    bech32::encode::<Bech32>(hrp, &bytes).context("Failed to bech32-encode address")
}

/// Converts a bech32 account back to a lowercase `0x` EVM address.
///
/// Returns the decoded prefix alongside the address so callers can check it.
pub fn bech32_to_eth(account: &str) -> Result<(String, String)> {
    let (hrp, data) =
        bech32::decode(account.trim()).with_context(|| format!("Invalid bech32 account {}", account))?;
    if data.len() != 20 {
        anyhow::bail!(
            "bech32 account {} does not hold a 20-byte address (got {} bytes)",
            account,
            data.len()
        );
    }
    Ok((hrp.to_string(), format!("0x{}", hex::encode(data))))
}
