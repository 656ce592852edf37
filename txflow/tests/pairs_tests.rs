//! Tests for DEX liquidity transactions

#[path = "helpers.rs"]
mod test_helpers;

use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use std::sync::Arc;
use test_helpers::{
    create_flow_env, create_recording_dispatcher, MockAllowances, DUMMY_CTOKEN_ADDR, DUMMY_ETH_ADDR,
    DUMMY_PAIR_ADDR, DUMMY_ROUTER_ADDR, DUMMY_TOKEN_ADDR_HUB, HUB_CHAIN_ID,
    selector,
};
use txflow::flows::pairs::{build_at, deadline_after, min_amount, LpPair, PairBook, PairToken, PairsTxParams, PairsTxType};
use txflow::{ErrorKind, FlowEnv};
use txflow::transaction::contracts::IRouter;

const NOW_SECS: i64 = 1_700_000_000;

fn create_env(allowance: u64) -> (FlowEnv, Arc<MockAllowances>) {
    let allowances = Arc::new(MockAllowances::new(allowance));
    (
        create_flow_env(create_recording_dispatcher().dispatcher, allowances.clone()),
        allowances,
    )
}

fn create_pair() -> LpPair {
    LpPair {
        address: DUMMY_PAIR_ADDR.to_string(),
        symbol: "USDC/NOTE".to_string(),
        decimals: 18,
        token1: PairToken {
            address: DUMMY_TOKEN_ADDR_HUB.to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
        },
        token2: PairToken {
            address: DUMMY_CTOKEN_ADDR.to_string(),
            symbol: "NOTE".to_string(),
            decimals: 18,
        },
        stable: true,
    }
}

fn params(tx_type: PairsTxType) -> PairsTxParams {
    PairsTxParams {
        chain_id: HUB_CHAIN_ID,
        eth_address: DUMMY_ETH_ADDR.to_string(),
        pair: create_pair(),
        tx_type,
        slippage_bps: 100,
        deadline_mins: None,
    }
}

fn add_liquidity() -> PairsTxType {
    PairsTxType::AddLiquidity {
        amount1: "100".to_string(),
        amount2: "100".to_string(),
    }
}

fn word(value: u64) -> String {
    format!("{:064x}", value)
}

/// What is tested: min_amount() applies slippage in basis points and truncates
/// Why: Minimums must never exceed what the pool could return
#[test]
fn test_min_amount() {
    assert_eq!(min_amount(&BigInt::from(10_000), 100), BigInt::from(9_900));
    assert_eq!(min_amount(&BigInt::from(10_001), 50), BigInt::from(9_950));
    assert_eq!(min_amount(&BigInt::from(10_000), 0), BigInt::from(10_000));
    assert_eq!(min_amount(&BigInt::from(10_000), 20_000), BigInt::from(0));
}

/// What is tested: pair lookup ignores address case
/// Why: Addresses arrive both checksummed and lowercase
#[test]
fn test_pair_book_lookup() {
    let book = PairBook::new(vec![create_pair()]);

    assert_eq!(book.pairs().len(), 1);
    assert!(book.pair(&DUMMY_PAIR_ADDR.to_uppercase().replace("0X", "0x")).is_ok());
    assert_eq!(
        book.pair(DUMMY_ROUTER_ADDR).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

/// What is tested: adding liquidity approves both tokens and calls the router with minimums
/// Why: The router pulls both tokens and enforces the slippage bounds
#[tokio::test]
async fn test_add_liquidity_with_approvals() {
    let (env, allowances) = create_env(0);
    let now = Utc.timestamp_opt(NOW_SECS, 0).unwrap();

    let txs = build_at(&env, &params(add_liquidity()), now).await.unwrap();

    assert_eq!(txs.len(), 3);
    assert_eq!(txs[0].as_evm().unwrap().to, DUMMY_TOKEN_ADDR_HUB);
    assert_eq!(txs[1].as_evm().unwrap().to, DUMMY_CTOKEN_ADDR);
    let router = txs[2].as_evm().unwrap();
    assert_eq!(router.to, DUMMY_ROUTER_ADDR);
    assert!(router.data.starts_with(&selector::<IRouter::addLiquidityCall>()));
    // 1% under 100 USDC
    assert!(router.data.contains(&word(99_000_000)));
    // default deadline of 10 minutes
    assert!(router.data.ends_with(&word(NOW_SECS as u64 + 600)));

    let calls = allowances.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(_, owner, spender)| owner == DUMMY_ETH_ADDR && spender == DUMMY_ROUTER_ADDR));
}

/// What is tested: sufficient allowances skip the approvals
/// Why: Only the router call is needed then
#[tokio::test]
async fn test_add_liquidity_without_approvals() {
    let (env, _) = create_env(u64::MAX);
    let now = Utc.timestamp_opt(NOW_SECS, 0).unwrap();
    let mut request = params(PairsTxType::AddLiquidity {
        amount1: "1".to_string(),
        amount2: "1".to_string(),
    });
    request.deadline_mins = Some(30);

    let txs = build_at(&env, &request, now).await.unwrap();

    assert_eq!(txs.len(), 1);
    assert!(txs[0].as_evm().unwrap().data.ends_with(&word(NOW_SECS as u64 + 1800)));
}

/// What is tested: removing liquidity approves the LP token and bounds both outputs
/// Why: The router burns LP tokens it pulls from the user
#[tokio::test]
async fn test_remove_liquidity() {
    let (env, allowances) = create_env(0);
    let now = Utc.timestamp_opt(NOW_SECS, 0).unwrap();

    let txs = build_at(
        &env,
        &params(PairsTxType::RemoveLiquidity {
            lp_amount: "0.5".to_string(),
            expected1: "50".to_string(),
            expected2: "0".to_string(),
        }),
        now,
    )
    .await
    .unwrap();

    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].as_evm().unwrap().to, DUMMY_PAIR_ADDR);
    let router = txs[1].as_evm().unwrap();
    assert!(router.data.starts_with(&selector::<IRouter::removeLiquidityCall>()));
    assert!(router.data.contains(&word(49_500_000)));
    assert_eq!(allowances.calls.lock().unwrap()[0].0, DUMMY_PAIR_ADDR);
}

/// What is tested: zero amounts and slippage above 100% are rejected
/// Why: Neither produces a meaningful router call
#[tokio::test]
async fn test_liquidity_rejections() {
    let (env, _) = create_env(0);
    let now = Utc.timestamp_opt(NOW_SECS, 0).unwrap();

    let zero = params(PairsTxType::AddLiquidity {
        amount1: "0".to_string(),
        amount2: "1".to_string(),
    });
    let err = build_at(&env, &zero, now).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);

    let mut slippage = params(add_liquidity());
    slippage.slippage_bps = 10_001;
    let err = build_at(&env, &slippage, now).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
}

/// What is tested: deadlines beyond the representable time range are rejected
/// Why: Adding an unchecked duration to the clock would panic
#[tokio::test]
async fn test_deadline_out_of_range() {
    let now = Utc.timestamp_opt(NOW_SECS, 0).unwrap();

    assert_eq!(deadline_after(now, 10).unwrap(), NOW_SECS + 600);
    for minutes in [u64::MAX, 1 << 60, i64::MAX as u64] {
        assert_eq!(
            deadline_after(now, minutes).unwrap_err().kind(),
            ErrorKind::InvalidAmount
        );
    }

    let (env, _) = create_env(0);
    let mut request = params(add_liquidity());
    request.deadline_mins = Some(1 << 60);
    let err = build_at(&env, &request, now).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert!(err.to_string().contains("out of range"));
}
