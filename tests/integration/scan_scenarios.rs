//! End-to-end scan scenarios against the mock chain.

use alloy_primitives::U256;

use escrow_keeper::chain::abi;
use escrow_keeper::chain::escrow::KICK_SIG;
use escrow_keeper::config::UserArgs;
use escrow_keeper::engine::scanner::{EscrowScanner, NO_ELIGIBLE_POSITION};
use escrow_keeper::types::{ExecResult, Outcome};

use crate::mock_chain::{Call, MockChain, NFT, TOKEN};

fn args() -> UserArgs {
    UserArgs::new(TOKEN, NFT)
}

fn kick(id: u64) -> alloy_primitives::Bytes {
    abi::encode_call(KICK_SIG, &[U256::from(id)])
}

fn expect_action(outcome: Outcome) -> escrow_keeper::types::ProposedCall {
    match outcome {
        Outcome::Action(call) => call,
        other => panic!("expected an action, got {other:?}"),
    }
}

fn expect_message(outcome: Outcome) -> String {
    match outcome {
        Outcome::NoAction { message } => message,
        other => panic!("expected no action, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reference_scenario() {
    let chain = MockChain::new(3)
        .with_position(0, 100, 0, 500, false)
        .with_empty_slot(1)
        .with_position(2, 50, 10, 900, true);
    let scanner = EscrowScanner::new(chain.clone());

    let call = expect_action(scanner.evaluate(&args()).await);
    assert_eq!(call.to, chain.token());
    assert_eq!(call.data, kick(2));

    assert_eq!(
        chain.calls(),
        vec![
            Call::NextTokenId,
            Call::Positions(0),
            Call::CanUnlock(0),
            Call::Positions(1),
            Call::Positions(2),
            Call::CanUnlock(2),
        ]
    );
}

#[tokio::test]
async fn test_reference_scenario_wire_shape() {
    let chain = MockChain::new(3)
        .with_position(0, 100, 0, 500, false)
        .with_empty_slot(1)
        .with_position(2, 50, 10, 900, true);
    let scanner = EscrowScanner::new(chain);

    let result = ExecResult::from(scanner.evaluate(&args()).await);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["canExec"], true);
    let entries = json["callData"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["to"].as_str().unwrap().to_lowercase(), TOKEN);
    assert_eq!(
        entries[0]["data"].as_str().unwrap(),
        alloy_primitives::hex::encode_prefixed(kick(2))
    );
}

#[tokio::test]
async fn test_missing_config_issues_no_calls() {
    let chain = MockChain::new(3).with_position(0, 1, 1, 1, true);
    let scanner = EscrowScanner::new(chain.clone());

    let cases = [
        (UserArgs::default(), "missing escrowToken configuration"),
        (
            UserArgs {
                escrow_token: Some(TOKEN.into()),
                escrow_nft: None,
            },
            "missing escrowNft configuration",
        ),
        (
            UserArgs {
                escrow_token: Some(String::new()),
                escrow_nft: Some(NFT.into()),
            },
            "missing escrowToken configuration",
        ),
    ];

    for (user_args, expected) in cases {
        let message = expect_message(scanner.evaluate(&user_args).await);
        assert_eq!(message, expected);
    }
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn test_zero_positions() {
    let chain = MockChain::new(0);
    let scanner = EscrowScanner::new(chain.clone());

    let message = expect_message(scanner.evaluate(&args()).await);
    assert_eq!(message, NO_ELIGIBLE_POSITION);
    assert_eq!(chain.calls(), vec![Call::NextTokenId]);
}

#[tokio::test]
async fn test_empty_slots_never_query_can_unlock() {
    // Empty slots claim to be unlockable; the scan must not even ask.
    let chain = MockChain::new(4)
        .with_empty_slot(0)
        .with_empty_slot(1)
        .with_empty_slot(2)
        .with_empty_slot(3);
    let scanner = EscrowScanner::new(chain.clone());

    let message = expect_message(scanner.evaluate(&args()).await);
    assert_eq!(message, NO_ELIGIBLE_POSITION);
    assert!(chain
        .calls()
        .iter()
        .all(|c| !matches!(c, Call::CanUnlock(_))));
    assert_eq!(chain.calls().len(), 5);
}

#[tokio::test]
async fn test_first_eligible_stops_scan() {
    let k = 4;
    let mut chain = MockChain::new(10);
    for id in 0..k {
        chain = chain.with_position(id, 10, 0, 1_000 + id, false);
    }
    chain = chain.with_position(k, 10, 0, 2_000, true);
    for id in (k + 1)..10 {
        chain = chain.with_position(id, 10, 0, 3_000, true);
    }
    let scanner = EscrowScanner::new(chain.clone());

    let call = expect_action(scanner.evaluate(&args()).await);
    assert_eq!(call.data, kick(k));

    let calls = chain.calls();
    assert_eq!(calls.last(), Some(&Call::CanUnlock(k)));
    assert!(calls.iter().all(|c| match c {
        Call::Positions(id) | Call::CanUnlock(id) => *id <= k,
        Call::NextTokenId => true,
    }));
}

#[tokio::test]
async fn test_lowest_id_wins() {
    let chain = MockChain::new(6)
        .with_position(1, 5, 5, 10, false)
        .with_position(3, 5, 5, 10, true)
        .with_position(5, 5, 5, 10, true);
    let scanner = EscrowScanner::new(chain);

    let call = expect_action(scanner.evaluate(&args()).await);
    assert_eq!(call.data, kick(3));
}

#[tokio::test]
async fn test_positions_failure_aborts_scan() {
    let chain = MockChain::new(5)
        .with_position(0, 1, 0, 10, false)
        .with_position(1, 1, 0, 10, false)
        .with_position(2, 1, 0, 10, true);
    chain.set_error(Call::Positions(1));
    let scanner = EscrowScanner::new(chain.clone());

    let message = expect_message(scanner.evaluate(&args()).await);
    assert!(message.starts_with("chain read failed: "), "{message}");
    assert!(message.contains("mock node error"));
    assert_eq!(
        chain.calls(),
        vec![
            Call::NextTokenId,
            Call::Positions(0),
            Call::CanUnlock(0),
            Call::Positions(1),
        ]
    );
}

#[tokio::test]
async fn test_can_unlock_failure_aborts_scan() {
    let chain = MockChain::new(3)
        .with_position(0, 1, 0, 10, true)
        .with_position(1, 1, 0, 10, true);
    chain.set_error(Call::CanUnlock(0));
    let scanner = EscrowScanner::new(chain.clone());

    let message = expect_message(scanner.evaluate(&args()).await);
    assert!(message.starts_with("chain read failed: "));
    assert_eq!(chain.calls().last(), Some(&Call::CanUnlock(0)));
    assert_eq!(chain.calls().len(), 3);
}

#[tokio::test]
async fn test_next_token_id_failure() {
    let chain = MockChain::new(3).with_position(0, 1, 0, 10, true);
    chain.set_error(Call::NextTokenId);
    let scanner = EscrowScanner::new(chain.clone());

    let message = expect_message(scanner.evaluate(&args()).await);
    assert!(message.starts_with("chain read failed: "));
    assert_eq!(chain.calls(), vec![Call::NextTokenId]);
}

#[tokio::test]
async fn test_wrong_contract_is_chain_failure() {
    // Addresses swapped: the NFT contract does not implement positions().
    let chain = MockChain::new(2);
    let scanner = EscrowScanner::new(chain.clone());

    let message = expect_message(scanner.evaluate(&UserArgs::new(NFT, TOKEN)).await);
    assert!(message.starts_with("chain read failed: "));
    assert!(message.contains("execution reverted"));
}

#[tokio::test]
async fn test_evaluate_is_idempotent() {
    let chain = MockChain::new(3)
        .with_position(0, 100, 0, 500, false)
        .with_position(2, 50, 10, 900, true);
    let scanner = EscrowScanner::new(chain.clone());

    let first = scanner.evaluate(&args()).await;
    let first_calls = chain.calls();
    chain.reset_calls();

    let second = scanner.evaluate(&args()).await;
    assert_eq!(first, second);
    assert_eq!(first_calls, chain.calls());
}

#[tokio::test]
async fn test_recovers_after_transient_error() {
    let chain = MockChain::new(2).with_position(1, 1, 0, 10, true);
    chain.set_error(Call::Positions(0));
    let scanner = EscrowScanner::new(chain.clone());

    assert!(!scanner.evaluate(&args()).await.can_exec());

    // Next invocation restarts from id 0 with no memory of the failure.
    chain.clear_error();
    chain.reset_calls();
    let call = expect_action(scanner.evaluate(&args()).await);
    assert_eq!(call.data, kick(1));
    assert_eq!(chain.calls().first(), Some(&Call::NextTokenId));
    assert_eq!(chain.calls()[1], Call::Positions(0));
}
