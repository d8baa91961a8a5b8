mod common;

use common::*;
use scholar_payouts::application::manager::ScholarOutcome;
use scholar_payouts::domain::address::Address;
use scholar_payouts::domain::payment::PaymentKind;
use scholar_payouts::domain::transaction::TxCall;
use scholar_payouts::error::InsufficientBalance;
use scholar_payouts::infrastructure::in_memory::{InMemoryChain, InMemoryResultsLog};

fn address(raw: &str) -> Address {
    Address::parse(raw).unwrap()
}

fn transfers(chain: &InMemoryChain) -> Vec<(Address, u64)> {
    chain
        .sent()
        .into_iter()
        .filter_map(|request| match request.call {
            TxCall::TokenTransfer { to, amount } => Some((to, amount)),
            TxCall::Replacement => None,
        })
        .collect()
}

#[tokio::test]
async fn test_legacy_payout_end_to_end() {
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    let results = InMemoryResultsLog::new();
    let confirmation = ScriptedConfirmation::answering(true);
    let mut manager = manager(
        validated(&legacy_payments()),
        &chain,
        &results,
        confirmation.clone(),
    );

    let reports = manager.run().await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "Scholar 1");
    assert_eq!(
        reports[0].outcome,
        ScholarOutcome::Completed {
            confirmed: 5,
            replaced: 0
        }
    );
    assert_eq!(confirmation.asked(), vec!["Scholar 1".to_string()]);
    assert_eq!(
        transfers(&chain),
        vec![
            (address(SCHOLAR_PAYOUT), 450),
            (address(TRAINER_PAYOUT), 100),
            (address(DONATION), 10),
            (address(FEE), 10),
            (address(MANAGER), 430),
        ]
    );
    assert_eq!(chain.balance(&address(SCHOLAR_ACCOUNT)), 0);

    let nonces: Vec<u64> = chain.sent().iter().map(|r| r.nonce).collect();
    assert_eq!(nonces, vec![0, 1, 2, 3, 4]);

    let lines = results.lines();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with(&format!(
        "Important: Transaction Payment to scholar of Scholar 1({}) for the amount of 450 SLP completed! Hash: 0x",
        SCHOLAR_PAYOUT
    )));
    assert!(lines.iter().all(|l| l.contains("Explorer: https://explorer.roninchain.com/tx/0x")));

    assert_eq!(
        manager.summary().render(),
        "Paid 1 scholars, 450 SLP.\nPaid 1 trainers, 100 SLP.\nPaid 1 donations, 10 SLP.\nPaid 1 fees, 10 SLP.\nPaid 1 managers, 430 SLP.\n"
    );
}

#[tokio::test]
async fn test_splits_payout_end_to_end() {
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    chain.set_balance(&address(SECOND_ACCOUNT), 500);
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&splits_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(true),
    );

    let reports = manager.run().await;

    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, ScholarOutcome::Completed { replaced: 0, .. })));
    assert_eq!(chain.balance(&address(SCHOLAR_ACCOUNT)), 0);
    assert_eq!(chain.balance(&address(SECOND_ACCOUNT)), 0);
    assert_eq!(chain.balance(&address(FEE)), 30);

    let summary = manager.summary();
    let managers = summary.get(PaymentKind::Manager).unwrap();
    assert_eq!((managers.count, managers.total), (2, 645));
    let scholars = summary.get(PaymentKind::Scholar).unwrap();
    assert_eq!((scholars.count, scholars.total), (2, 650));
    let fees = summary.get(PaymentKind::Fee).unwrap();
    assert_eq!((fees.count, fees.total), (4, 30));
    let other = summary.get(PaymentKind::Other).unwrap();
    assert_eq!((other.count, other.total), (1, 100));
}

#[tokio::test]
async fn test_declined_plan_makes_no_transfers() {
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&legacy_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(false),
    );

    let reports = manager.run().await;

    assert_eq!(reports[0].outcome, ScholarOutcome::Canceled);
    assert!(chain.sent().is_empty());
    assert!(results.lines().is_empty());
    assert_eq!(chain.balance(&address(SCHOLAR_ACCOUNT)), 1000);
    assert_eq!(manager.summary().render(), "No payments made!");
}

#[tokio::test]
async fn test_unfunded_scholars_are_skipped_without_prompt() {
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SECOND_ACCOUNT), 1);
    let results = InMemoryResultsLog::new();
    let confirmation = ScriptedConfirmation::answering(true);
    let mut manager = manager(
        validated(&splits_payments()),
        &chain,
        &results,
        confirmation.clone(),
    );

    let reports = manager.run().await;

    assert_eq!(reports[0].outcome, ScholarOutcome::NoBalance);
    assert!(matches!(
        reports[1].outcome,
        ScholarOutcome::Skipped(InsufficientBalance::BelowScholarFloor { balance: 1, .. })
    ));
    assert!(confirmation.asked().is_empty());
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn test_failed_transfer_is_replaced_and_left_out_of_summary() {
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    chain.fail_next_transfers(1);
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&legacy_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(true),
    );

    let reports = manager.run().await;

    assert_eq!(
        reports[0].outcome,
        ScholarOutcome::Completed {
            confirmed: 4,
            replaced: 1
        }
    );
    let sent = chain.sent();
    assert_eq!(sent[1].call, TxCall::Replacement);
    assert_eq!(sent[1].nonce, sent[0].nonce);
    assert_eq!(chain.balance(&address(SCHOLAR_PAYOUT)), 0);
    assert!(manager.summary().get(PaymentKind::Scholar).is_none());

    let lines = results.lines();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("failed. Trying to replace it with a 0 value tx and re-try."));
}

#[tokio::test]
async fn test_summary_accumulates_across_runs_until_cleared() {
    let chain = InMemoryChain::new();
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&legacy_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(true),
    );

    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    manager.run().await;
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    manager.run().await;

    let scholars = manager.summary().get(PaymentKind::Scholar).unwrap();
    assert_eq!((scholars.count, scholars.total), (2, 900));

    manager.clear_summary();
    assert_eq!(manager.summary().render(), "No payments made!");
}

#[tokio::test]
async fn test_offline_chain_aborts_each_scholar() {
    let chain = InMemoryChain::new();
    chain.go_offline(true);
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&splits_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(true),
    );

    let reports = manager.run().await;

    assert_eq!(reports.len(), 2);
    assert!(reports
        .iter()
        .all(|r| matches!(&r.outcome, ScholarOutcome::Aborted(reason) if reason.contains("RPC error"))));
}

#[tokio::test]
async fn test_declined_plan_logs_cancellation() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&legacy_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(false),
    );

    manager.run().await;

    let canceled = logs.lines_with("Transactions canceled for account: 'Scholar 1'");
    assert_eq!(canceled.len(), 1);
    assert!(canceled[0].contains("INFO"));
    assert!(logs
        .lines_with("Transactions completed for account")
        .is_empty());
    // The plan is shown before the operator is asked.
    assert_eq!(
        logs.lines_with(&format!(
            "Payment to scholar of Scholar 1({}) for the amount of 450 SLP",
            SCHOLAR_PAYOUT
        ))
        .len(),
        1
    );
}

#[tokio::test]
async fn test_failed_transfer_logs_important_warning() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let chain = InMemoryChain::new();
    chain.set_balance(&address(SCHOLAR_ACCOUNT), 1000);
    chain.fail_next_transfers(1);
    let results = InMemoryResultsLog::new();
    let mut manager = manager(
        validated(&legacy_payments()),
        &chain,
        &results,
        ScriptedConfirmation::answering(true),
    );

    manager.run().await;

    let failed = logs.lines_with("Trying to replace it with a 0 value tx and re-try.");
    assert_eq!(failed.len(), 1);
    assert!(failed[0].contains("WARN"));
    assert!(failed[0].contains("important=true"));
    assert!(failed[0].contains(&format!(
        "Important: Transaction Payment to scholar of Scholar 1({}) for the amount of 450 SLP failed.",
        SCHOLAR_PAYOUT
    )));

    let completed = logs.lines_with("completed! Hash: 0x");
    assert_eq!(completed.len(), 4);
    assert!(completed.iter().all(|line| line.contains("important=true")));
    assert_eq!(
        logs.lines_with("Transactions completed for account: 'Scholar 1'")
            .len(),
        1
    );
    assert_eq!(logs.lines_with("Transactions Summary:").len(), 1);
}
