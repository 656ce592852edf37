//! Unit tests for the Cosmos REST client

use chain_clients_cosmos::CosmosRestClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DUMMY_HUB_ACCOUNT: &str = "canto1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqz3v0mk";
const DUMMY_GRAVITY_ACCOUNT: &str = "gravity1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqd4q8dh";
const DUMMY_PUBKEY: &str = "AyT1v0zTtFHqLMvV5GJ2x9Vb6aZL8u6oVqmfFeH3Zr6Q";

/// What is tested: get_account() unwraps Ethermint EthAccount responses
/// Why: The hub returns accounts nested under base_account; the sender object needs the inner fields
#[tokio::test]
async fn test_get_account_eth_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/cosmos/auth/v1beta1/accounts/{}", DUMMY_HUB_ACCOUNT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {
                "@type": "/ethermint.types.v1.EthAccount",
                "base_account": {
                    "address": DUMMY_HUB_ACCOUNT,
                    "pub_key": {
                        "@type": "/ethermint.crypto.v1.ethsecp256k1.PubKey",
                        "key": DUMMY_PUBKEY
                    },
                    "account_number": "42",
                    "sequence": "7"
                },
                "code_hash": "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = CosmosRestClient::new(&mock_server.uri()).unwrap();
    let account = client.get_account(DUMMY_HUB_ACCOUNT).await.unwrap();

    assert_eq!(account.address, DUMMY_HUB_ACCOUNT);
    assert_eq!(account.account_number, 42);
    assert_eq!(account.sequence, 7);
    assert_eq!(account.pubkey.as_deref(), Some(DUMMY_PUBKEY));
}

/// What is tested: get_account() parses a plain BaseAccount without a public key
/// Why: Gravity Bridge returns BaseAccount, and fresh accounts have no pub_key yet
#[tokio::test]
async fn test_get_account_base_account_without_pubkey() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/cosmos/auth/v1beta1/accounts/{}", DUMMY_GRAVITY_ACCOUNT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {
                "@type": "/cosmos.auth.v1beta1.BaseAccount",
                "address": DUMMY_GRAVITY_ACCOUNT,
                "pub_key": null,
                "account_number": "9",
                "sequence": "0"
            }
        })))
        .mount(&mock_server)
        .await;

    let client = CosmosRestClient::new(&mock_server.uri()).unwrap();
    let account = client.get_account(DUMMY_GRAVITY_ACCOUNT).await.unwrap();

    assert_eq!(account.account_number, 9);
    assert_eq!(account.sequence, 0);
    assert!(account.pubkey.is_none());
}

/// What is tested: get_account() reports a missing account as an error
/// Why: An unknown account cannot sign; returning defaults would produce invalid signatures
#[tokio::test]
async fn test_get_account_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 5,
            "message": "account not found"
        })))
        .mount(&mock_server)
        .await;

    let client = CosmosRestClient::new(&mock_server.uri()).unwrap();
    let result = client.get_account(DUMMY_HUB_ACCOUNT).await;
    assert!(result.unwrap_err().to_string().contains("not found"));
}

/// What is tested: get_balance() queries by denom and returns the amount
/// Why: Cosmos token balances are attached to the IBC token list
#[tokio::test]
async fn test_get_balance_by_denom() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/cosmos/bank/v1beta1/balances/{}/by_denom",
            DUMMY_HUB_ACCOUNT
        )))
        .and(query_param("denom", "uatom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balance": { "denom": "uatom", "amount": "2500000" }
        })))
        .mount(&mock_server)
        .await;

    let client = CosmosRestClient::new(&mock_server.uri()).unwrap();
    let balance = client.get_balance(DUMMY_HUB_ACCOUNT, "uatom").await.unwrap();
    assert_eq!(balance, "2500000");
}

/// What is tested: get_balance() fails on a server error
/// Why: Balance failures are reported per token and must not be confused with zero
#[tokio::test]
async fn test_get_balance_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = CosmosRestClient::new(&mock_server.uri()).unwrap();
    assert!(client.get_balance(DUMMY_HUB_ACCOUNT, "uatom").await.is_err());
}
