//! Integration tests for the atomic transfer operation: atomicity, balance
//! conservation, entry symmetry, overdraw rejection and deadlock freedom
//! under concurrent opposite-direction transfers.

mod common;

use common::{seed_account, table_count, test_store};
use minibank_store::repos::{AccountRepo, EntryRepo, TransferRepo};
use minibank_store::{
    CreateEntryParams, CreateTransferParams, Ledger, SqlStore, StoreError, StoreResult,
    TransferTxParams, TransferTxResult,
};

/// Assertions shared by every successful transfer in these tests,
/// mirroring what the result must contain per the store contract.
async fn assert_transfer_result(
    store: &SqlStore,
    result: &TransferTxResult,
    from_id: i64,
    to_id: i64,
    amount: i64,
) {
    let transfer = &result.transfer;
    assert!(transfer.id > 0);
    assert_eq!(transfer.from_account_id, from_id);
    assert_eq!(transfer.to_account_id, to_id);
    assert_eq!(transfer.amount, amount);
    store
        .get_transfer(transfer.id)
        .await
        .expect("transfer row persisted");

    assert_eq!(result.from_entry.account_id, from_id);
    assert_eq!(result.from_entry.amount, -amount);
    assert_eq!(result.to_entry.account_id, to_id);
    assert_eq!(result.to_entry.amount, amount);
    store
        .get_entry(result.from_entry.id)
        .await
        .expect("from entry persisted");
    store
        .get_entry(result.to_entry.id)
        .await
        .expect("to entry persisted");

    // Accounts come back in request order regardless of lock order.
    assert_eq!(result.from_account.id, from_id);
    assert_eq!(result.to_account.id, to_id);
}

#[tokio::test]
async fn transfer_moves_money_and_records_both_sides() {
    let (store, _dir) = test_store().await;
    let from = seed_account(&store, "alice", 1000).await;
    let to = seed_account(&store, "bob", 500).await;

    let amount = 110;
    let result = store
        .transfer_tx(TransferTxParams::new(from.id, to.id, amount))
        .await
        .expect("transfer succeeds");

    assert_transfer_result(&store, &result, from.id, to.id, amount).await;
    assert_eq!(result.from_account.balance, 890);
    assert_eq!(result.to_account.balance, 610);

    let from_db = store.get_account(from.id).await.expect("from account");
    let to_db = store.get_account(to.id).await.expect("to account");
    assert_eq!(from_db.balance, 890);
    assert_eq!(to_db.balance, 610);
}

/// Five concurrent transfers of 10 from A (300) to B (100): A ends at 250,
/// B at 150, with 5 transfer rows and 10 entry rows.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_same_direction() {
    let (store, _dir) = test_store().await;
    let from = seed_account(&store, "alice", 300).await;
    let to = seed_account(&store, "bob", 100).await;

    let n = 5;
    let amount = 10;
    let (sender, mut receiver) = tokio::sync::mpsc::channel(n);

    for i in 0..n {
        let store = store.clone();
        let sender = sender.clone();
        let params = TransferTxParams::new(from.id, to.id, amount)
            .with_trace_id(format!("same-direction-{}", i));
        tokio::spawn(async move {
            let result = store.transfer_tx(params).await;
            sender.send(result).await.expect("send result");
        });
    }
    drop(sender);

    let mut committed = 0;
    while let Some(result) = receiver.recv().await {
        let result = result.expect("transfer succeeds");
        assert_transfer_result(&store, &result, from.id, to.id, amount).await;
        committed += 1;
    }
    assert_eq!(committed, n);

    let from_db = store.get_account(from.id).await.expect("from account");
    let to_db = store.get_account(to.id).await.expect("to account");
    assert_eq!(from_db.balance, 250);
    assert_eq!(to_db.balance, 150);
    assert_eq!(table_count(&store, "transfers").await, 5);
    assert_eq!(table_count(&store, "entries").await, 10);
}

/// Deadlock freedom under reversal: five A->B interleaved with five B->A on
/// the same pair of accounts. All ten must commit and the balances end where
/// they started.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_opposite_directions() {
    let (store, _dir) = test_store().await;
    let a = seed_account(&store, "alice", 1000).await;
    let b = seed_account(&store, "bob", 1000).await;

    let n = 10;
    let amount = 10;
    let (sender, mut receiver) = tokio::sync::mpsc::channel(n);

    for i in 0..n {
        // Half the transfers run in the reverse direction.
        let (from_id, to_id) = if i % 2 == 0 { (a.id, b.id) } else { (b.id, a.id) };
        let store = store.clone();
        let sender = sender.clone();
        let params =
            TransferTxParams::new(from_id, to_id, amount).with_trace_id(format!("reversal-{}", i));
        tokio::spawn(async move {
            let result = store.transfer_tx(params).await;
            sender.send(result).await.expect("send result");
        });
    }
    drop(sender);

    while let Some(result) = receiver.recv().await {
        result.expect("transfer succeeds");
    }

    let a_db = store.get_account(a.id).await.expect("account a");
    let b_db = store.get_account(b.id).await.expect("account b");
    assert_eq!(a_db.balance, 1000);
    assert_eq!(b_db.balance, 1000);
    assert_eq!(table_count(&store, "transfers").await, 10);
    assert_eq!(table_count(&store, "entries").await, 20);
}

#[tokio::test]
async fn overdraw_fails_with_insufficient_funds_and_writes_nothing() {
    let (store, _dir) = test_store().await;
    let from = seed_account(&store, "alice", 50).await;
    let to = seed_account(&store, "bob", 0).await;

    let err = store
        .transfer_tx(TransferTxParams::new(from.id, to.id, 100))
        .await
        .expect_err("overdraw must fail");
    match err {
        StoreError::InsufficientFunds {
            account_id,
            requested,
            balance,
        } => {
            assert_eq!(account_id, from.id);
            assert_eq!(requested, 100);
            assert_eq!(balance, 50);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }

    // Nothing observable remains of the aborted transfer.
    assert_eq!(store.get_account(from.id).await.unwrap().balance, 50);
    assert_eq!(store.get_account(to.id).await.unwrap().balance, 0);
    assert_eq!(table_count(&store, "transfers").await, 0);
    assert_eq!(table_count(&store, "entries").await, 0);
}

#[tokio::test]
async fn transfer_to_missing_account_fails_with_not_found() {
    let (store, _dir) = test_store().await;
    let from = seed_account(&store, "alice", 100).await;

    let err = store
        .transfer_tx(TransferTxParams::new(from.id, from.id + 99, 10))
        .await
        .expect_err("missing destination must fail");
    match err {
        StoreError::NotFound { entity, id } => {
            assert_eq!(entity, "account");
            assert_eq!(id, (from.id + 99).to_string());
        }
        other => panic!("expected NotFound, got {:?}", other),
    }

    assert_eq!(store.get_account(from.id).await.unwrap().balance, 100);
    assert_eq!(table_count(&store, "transfers").await, 0);
    assert_eq!(table_count(&store, "entries").await, 0);
}

#[tokio::test]
async fn transfer_rejects_non_positive_amount_and_self_transfer() {
    let (store, _dir) = test_store().await;
    let a = seed_account(&store, "alice", 100).await;
    let b = seed_account(&store, "bob", 100).await;

    for amount in [0, -10] {
        let err = store
            .transfer_tx(TransferTxParams::new(a.id, b.id, amount))
            .await
            .expect_err("non-positive amount must fail");
        assert!(matches!(err, StoreError::InvalidTransfer(_)));
    }

    let err = store
        .transfer_tx(TransferTxParams::new(a.id, a.id, 10))
        .await
        .expect_err("self transfer must fail");
    assert!(matches!(err, StoreError::InvalidTransfer(_)));

    assert_eq!(table_count(&store, "transfers").await, 0);
}

/// Force a failure after each prefix of the transfer's internal steps and
/// verify the rollback leaves balances and row counts untouched.
#[tokio::test]
async fn forced_failure_at_every_step_rolls_back_completely() {
    let (store, _dir) = test_store().await;
    let from = seed_account(&store, "alice", 400).await;
    let to = seed_account(&store, "bob", 100).await;
    let amount = 30;

    for completed_steps in 0..5 {
        let from_id = from.id;
        let to_id = to.id;
        let outcome: StoreResult<()> = store
            .run_transaction(move |conn| {
                Box::pin(async move {
                    if completed_steps >= 1 {
                        TransferRepo::insert(
                            conn,
                            &CreateTransferParams {
                                from_account_id: from_id,
                                to_account_id: to_id,
                                amount,
                            },
                        )
                        .await?;
                    }
                    if completed_steps >= 2 {
                        EntryRepo::insert(
                            conn,
                            &CreateEntryParams {
                                account_id: from_id,
                                amount: -amount,
                            },
                        )
                        .await?;
                    }
                    if completed_steps >= 3 {
                        EntryRepo::insert(
                            conn,
                            &CreateEntryParams {
                                account_id: to_id,
                                amount,
                            },
                        )
                        .await?;
                    }
                    if completed_steps >= 4 {
                        AccountRepo::add_balance(conn, from_id, -amount).await?;
                    }
                    Err(StoreError::InvalidTransfer("injected failure".to_string()))
                })
            })
            .await;

        assert!(matches!(outcome, Err(StoreError::InvalidTransfer(_))));
        assert_eq!(store.get_account(from.id).await.unwrap().balance, 400);
        assert_eq!(store.get_account(to.id).await.unwrap().balance, 100);
        assert_eq!(table_count(&store, "transfers").await, 0);
        assert_eq!(table_count(&store, "entries").await, 0);
    }
}

/// A caller deadline that cancels a transaction mid-flight must roll it
/// back on drop: nothing persists and the store stays usable afterwards.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_transaction_rolls_back_and_releases_the_store() {
    let (store, _dir) = test_store().await;
    let from = seed_account(&store, "alice", 200).await;
    let to = seed_account(&store, "bob", 100).await;

    let from_id = from.id;
    let to_id = to.id;
    let outcome: Result<StoreResult<()>, _> = tokio::time::timeout(
        std::time::Duration::from_millis(100),
        store.run_transaction(move |conn| {
            Box::pin(async move {
                TransferRepo::insert(
                    conn,
                    &CreateTransferParams {
                        from_account_id: from_id,
                        to_account_id: to_id,
                        amount: 10,
                    },
                )
                .await?;
                // Hold the uncommitted transaction open past the deadline.
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                Ok(())
            })
        }),
    )
    .await;
    assert!(outcome.is_err(), "deadline must cancel the transaction");

    // The cancelled insert never became visible.
    assert_eq!(table_count(&store, "transfers").await, 0);
    assert_eq!(store.get_account(from.id).await.unwrap().balance, 200);
    assert_eq!(store.get_account(to.id).await.unwrap().balance, 100);

    // The write lock was released: a fresh transfer goes through.
    let result = store
        .transfer_tx(TransferTxParams::new(from.id, to.id, 25))
        .await
        .expect("transfer after a cancelled transaction");
    assert_eq!(result.from_account.balance, 175);
    assert_eq!(result.to_account.balance, 125);
    assert_eq!(table_count(&store, "transfers").await, 1);
}

/// Money is neither created nor destroyed by any sequence of committed
/// transfers, including ones rejected for insufficient funds.
#[tokio::test]
async fn balance_conservation_across_transfer_sequence() {
    let (store, _dir) = test_store().await;
    let a = seed_account(&store, "alice", 500).await;
    let b = seed_account(&store, "bob", 300).await;
    let c = seed_account(&store, "carol", 200).await;
    let total = 1000;

    let plan = [
        (a.id, b.id, 120),
        (b.id, c.id, 75),
        (c.id, a.id, 260), // fails: carol cannot cover this yet
        (c.id, a.id, 200),
        (a.id, c.id, 33),
        (b.id, a.id, 395),
        (b.id, a.id, 1), // fails: bob is empty now
    ];

    let mut committed = 0;
    for (from_id, to_id, amount) in plan {
        match store
            .transfer_tx(TransferTxParams::new(from_id, to_id, amount))
            .await
        {
            Ok(_) => committed += 1,
            Err(err) => assert!(err.is_insufficient_funds()),
        }

        let mut balances = 0;
        for id in [a.id, b.id, c.id] {
            balances += store.get_account(id).await.unwrap().balance;
        }
        assert_eq!(balances, total);
    }
    assert_eq!(committed, 5);
    assert_eq!(table_count(&store, "transfers").await, committed);
}
