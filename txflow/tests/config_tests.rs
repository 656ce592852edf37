//! Unit tests for configuration loading and validation

#[path = "helpers.rs"]
mod test_helpers;

use test_helpers::{create_default_config, DEFAULT_CONFIG_TOML, GRAVITY_EVM_CHAIN_ID};
use txflow::catalog::{BridgeDirection, ChainFamily};
use txflow::{Catalog, FlowConfig};

fn template_path() -> String {
    format!("{}/config/txflow.template.toml", env!("CARGO_MANIFEST_DIR"))
}

fn assert_rejected(from: &str, to: &str, expected: &str) {
    assert!(DEFAULT_CONFIG_TOML.contains(from), "test config lacks {:?}", from);
    let content = DEFAULT_CONFIG_TOML.replacen(from, to, 1);
    let err = FlowConfig::from_toml_str(&content).unwrap_err();
    assert!(
        err.to_string().contains(expected),
        "expected {:?} in {:?}",
        expected,
        err.to_string()
    );
}

/// What is tested: the shipped template parses and validates
/// Why: New deployments start from the template
#[test]
fn test_template_is_valid() {
    let config = FlowConfig::load_from_path(Some(&template_path())).unwrap();

    assert_eq!(config.hub.mainnet_network_id, "canto");
    assert_eq!(config.gravity.cosmos_chain_id, "gravity-bridge-3");
    let cosmoshub = config
        .networks
        .iter()
        .find(|n| n.id() == "cosmoshub")
        .and_then(|n| n.as_cosmos())
        .unwrap();
    assert_eq!(cosmoshub.transfer_fee.as_ref().unwrap().denom, "uatom");
}

/// What is tested: a missing file reports the template copy instructions
/// Why: The error must tell the operator how to fix it
#[test]
fn test_missing_file() {
    let err = FlowConfig::load_from_path(Some("/nonexistent/txflow.toml")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not found"));
    assert!(message.contains("txflow.template.toml"));
}

/// What is tested: a config file on disk is loaded from an explicit path
/// Why: The CLI passes --config through load_from_path
#[test]
fn test_load_from_explicit_path() {
    let path = std::env::temp_dir().join(format!("txflow-config-{}.toml", std::process::id()));
    std::fs::write(&path, DEFAULT_CONFIG_TOML).unwrap();

    let config = FlowConfig::load_from_path(path.to_str()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.networks.len(), 5);
    assert_eq!(config.gravity.evm_chain_id, GRAVITY_EVM_CHAIN_ID);
}

/// What is tested: optional sections fall back to their defaults
/// Why: Minimal configs only name what differs
#[test]
fn test_defaults() {
    let config = create_default_config();

    assert_eq!(config.hub.staking_denom, "acanto");
    assert_eq!(config.hub.staking_decimals, 18);
    assert_eq!(config.gravity.bech32_prefix, "gravity");
    assert_eq!(config.ibc.timeout_secs, 3600);
    assert_eq!(config.layer_zero.adapter_params, "0x");
    assert_eq!(config.dex.as_ref().unwrap().default_deadline_mins, 10);
}

/// What is tested: networks deserialize by family and the catalog groups tokens by network
/// Why: Token lists are looked up by the selectable network id
#[test]
fn test_catalog_from_config() {
    let catalog = Catalog::from_config(&create_default_config());

    assert_eq!(catalog.network("cosmoshub").unwrap().family(), ChainFamily::Cosmos);
    assert_eq!(catalog.hub_network(false).unwrap().id(), "canto");
    assert_eq!(catalog.hub_network(true).unwrap().id(), "canto-testnet");
    assert_eq!(catalog.tokens_for(BridgeDirection::In, "ethereum").len(), 3);
    assert_eq!(catalog.tokens_for(BridgeDirection::Out, "ethereum").len(), 1);
    assert!(catalog.tokens_for(BridgeDirection::In, "empty-evm").is_empty());
}

/// What is tested: each validation rule rejects a broken config
/// Why: Misconfiguration must fail at start-up, not mid-session
#[test]
fn test_validation_rules() {
    assert_rejected(r#"id = "empty-evm""#, r#"id = "ethereum""#, "Duplicate network id");
    assert_rejected(
        r#"mainnet_network_id = "canto""#,
        r#"mainnet_network_id = "nope""#,
        "Unknown hub network",
    );
    assert_rejected(
        "evm_chain_id = 999999",
        "evm_chain_id = 7700",
        "collides with a hub native chain",
    );
    assert_rejected(
        r#"bridge_contract = "0x000000000000000000000000000000000000000d""#,
        r#"bridge_contract = "0x1234""#,
        "Invalid gravity bridge_contract",
    );
    assert_rejected(
        "network_id = \"cosmoshub\"\ndenom = \"uatom\"",
        "network_id = \"osmosis\"\ndenom = \"uatom\"",
        "unknown network osmosis",
    );
    assert_rejected(
        r#"bridge_methods = ["LAYER_ZERO"]"#,
        r#"bridge_methods = ["IBC"]"#,
        "lists IBC",
    );
    assert_rejected(
        "network_id = \"ethereum\"\naddress = \"0x000000000000000000000000000000000000000c\"",
        "network_id = \"canto\"\naddress = \"0x000000000000000000000000000000000000000c\"",
        "keyed by the hub network",
    );
    assert_rejected(
        "[fees.delegate]\namount = \"600000000000000000\"",
        "[fees.delegate]\namount = \"0.6\"",
        "fees.delegate",
    );
}

/// What is tested: IBC timeouts and LP deadlines are bounded at load time
/// Why: Out-of-range durations would otherwise only fail when a transaction is built
#[test]
fn test_duration_bounds() {
    let router = r#"router_address = "0x0000000000000000000000000000000000000010""#;
    for timeout in ["0", "99999999"] {
        let content = format!("{}\n[ibc]\ntimeout_secs = {}\n", DEFAULT_CONFIG_TOML, timeout);
        let err = FlowConfig::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("ibc.timeout_secs"), "{}", err);
    }
    let week = format!("{}\n[ibc]\ntimeout_secs = 604800\n", DEFAULT_CONFIG_TOML);
    assert_eq!(FlowConfig::from_toml_str(&week).unwrap().ibc.timeout_secs, 604_800);

    assert_rejected(
        router,
        &format!("{}\ndefault_deadline_mins = 100000", router),
        "dex.default_deadline_mins",
    );
    assert_rejected(
        router,
        &format!("{}\ndefault_deadline_mins = 0", router),
        "dex.default_deadline_mins",
    );
}

/// What is tested: unknown bridging method names fail to parse
/// Why: Only the three supported methods may be listed
#[test]
fn test_unknown_method_in_config() {
    let content = DEFAULT_CONFIG_TOML.replacen(r#"["LAYER_ZERO"]"#, r#"["WORMHOLE"]"#, 1);
    assert!(FlowConfig::from_toml_str(&content).is_err());
}
