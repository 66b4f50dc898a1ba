// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use splitbook::error::ErrorKind;
use splitbook::ledger::transaction::{
    self, SplitPolicy, TransactionChanges, TransactionDraft,
};
use splitbook::ledger::{account, category};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    splitbook::db::init_schema(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn draft(amount: &str) -> TransactionDraft {
    TransactionDraft {
        description: "test".into(),
        amount: dec(amount),
        currency: "USD".into(),
        date: date("2026-08-01"),
        account_splits: vec![],
        category_splits: vec![],
    }
}

fn row_counts(conn: &Connection) -> (i64, i64, i64) {
    let q = |sql: &str| conn.query_row(sql, [], |r| r.get(0)).unwrap();
    (
        q("SELECT COUNT(*) FROM transactions"),
        q("SELECT COUNT(*) FROM account_splits"),
        q("SELECT COUNT(*) FROM category_splits"),
    )
}

#[test]
fn create_persists_transaction_and_splits_atomically() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "Checking", "USD", dec("0")).unwrap();
    let food = category::create(&conn, "alice", "Food", "USD", None).unwrap();

    let mut d = draft("-30");
    d.account_splits = vec![(acct.id, dec("-30"))];
    d.category_splits = vec![(food.id, dec("-30"))];
    let t = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap();

    assert_eq!(t.account_splits.len(), 1);
    assert_eq!(t.category_splits.len(), 1);
    assert_eq!(t.original_description, "test");
    assert_eq!(row_counts(&conn), (1, 1, 1));
}

#[test]
fn failed_validation_rolls_back_everything() {
    let mut conn = setup();
    let alice_acct = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();
    let bob_acct = account::create(&mut conn, "bob", "B", "USD", dec("0")).unwrap();

    let mut d = draft("10");
    d.account_splits = vec![(alice_acct.id, dec("5")), (bob_acct.id, dec("5"))];
    let err = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap_err();
    // Another user's account answers "not found", never "forbidden".
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // No partial rows: neither the transaction nor the valid first split.
    assert_eq!(row_counts(&conn), (0, 0, 0));
}

#[test]
fn unknown_currency_is_not_found_and_nothing_persists() {
    let mut conn = setup();
    let mut d = draft("10");
    d.currency = "ZZZ".into();
    let err = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(row_counts(&conn), (0, 0, 0));
}

#[test]
fn balanced_policy_rejects_mismatched_sums() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();

    let mut d = draft("100");
    d.account_splits = vec![(acct.id, dec("60")), (acct.id + 1000, dec("30"))];
    let err = transaction::create(&mut conn, "alice", &d, SplitPolicy::Balanced).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // The same mismatch is accepted under the permissive policy (the sum
    // invariant was never part of the original behavior).
    let mut d = draft("100");
    d.account_splits = vec![(acct.id, dec("60"))];
    transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap();

    // A balanced draft passes the strict policy.
    let mut d = draft("100");
    d.account_splits = vec![(acct.id, dec("100"))];
    transaction::create(&mut conn, "alice", &d, SplitPolicy::Balanced).unwrap();
}

#[test]
fn update_replaces_split_sets_wholesale() {
    let mut conn = setup();
    let a = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();
    let b = account::create(&mut conn, "alice", "B", "USD", dec("0")).unwrap();

    let mut d = draft("100");
    d.account_splits = vec![(a.id, dec("100"))];
    let t = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap();
    assert_eq!(account::balance(&conn, a.id).unwrap(), dec("100"));

    let changes = TransactionChanges {
        account_splits: Some(vec![(b.id, dec("40")), (a.id, dec("60"))]),
        ..Default::default()
    };
    let t = transaction::update(&mut conn, "alice", t.id, &changes, SplitPolicy::Unchecked).unwrap();
    assert_eq!(t.account_splits.len(), 2);
    // Old set fully replaced: balances reflect only the new splits.
    assert_eq!(account::balance(&conn, a.id).unwrap(), dec("60"));
    assert_eq!(account::balance(&conn, b.id).unwrap(), dec("40"));
}

#[test]
fn failed_update_leaves_the_old_splits_in_place() {
    let mut conn = setup();
    let a = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();
    let bob_acct = account::create(&mut conn, "bob", "B", "USD", dec("0")).unwrap();

    let mut d = draft("100");
    d.account_splits = vec![(a.id, dec("100"))];
    let t = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap();

    let changes = TransactionChanges {
        account_splits: Some(vec![(bob_acct.id, dec("100"))]),
        ..Default::default()
    };
    transaction::update(&mut conn, "alice", t.id, &changes, SplitPolicy::Unchecked).unwrap_err();

    let t = transaction::read(&conn, "alice", t.id).unwrap();
    assert_eq!(t.account_splits.len(), 1);
    assert_eq!(t.account_splits[0].account_id, a.id);
    assert_eq!(account::balance(&conn, a.id).unwrap(), dec("100"));
}

#[test]
fn update_scalars_keeps_original_description_frozen() {
    let mut conn = setup();
    let t = transaction::create(&mut conn, "alice", &draft("10"), SplitPolicy::Unchecked).unwrap();
    let changes = TransactionChanges {
        description: Some("renamed".into()),
        amount: Some(dec("12")),
        date: Some(date("2026-08-15")),
        ..Default::default()
    };
    let t = transaction::update(&mut conn, "alice", t.id, &changes, SplitPolicy::Unchecked).unwrap();
    assert_eq!(t.description, "renamed");
    assert_eq!(t.original_description, "test");
    assert_eq!(t.amount, dec("12"));
    assert_eq!(t.date, date("2026-08-15"));
}

#[test]
fn delete_cascades_splits() {
    let mut conn = setup();
    let a = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();
    let mut d = draft("10");
    d.account_splits = vec![(a.id, dec("10"))];
    let t = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap();

    transaction::delete(&conn, "alice", t.id).unwrap();
    assert_eq!(row_counts(&conn), (0, 0, 0));
    assert!(transaction::read(&conn, "alice", t.id).unwrap_err().is_not_found());
}

#[test]
fn transactions_are_scoped_to_their_owner() {
    let mut conn = setup();
    let t = transaction::create(&mut conn, "alice", &draft("10"), SplitPolicy::Unchecked).unwrap();
    assert!(transaction::read(&conn, "bob", t.id).unwrap_err().is_not_found());
    assert!(transaction::delete(&conn, "bob", t.id).unwrap_err().is_not_found());
    assert_eq!(transaction::list(&conn, "bob").unwrap().len(), 0);
    assert_eq!(transaction::list(&conn, "alice").unwrap().len(), 1);
}

#[test]
fn verified_toggles_independently() {
    let mut conn = setup();
    let a = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();
    let mut d = draft("10");
    d.account_splits = vec![(a.id, dec("10"))];
    let t = transaction::create(&mut conn, "alice", &d, SplitPolicy::Unchecked).unwrap();
    assert!(!t.account_splits[0].verified);

    transaction::set_verified(&conn, "alice", t.id, a.id, true).unwrap();
    let t = transaction::read(&conn, "alice", t.id).unwrap();
    assert!(t.account_splits[0].verified);
    // Balance is unaffected by reconciliation.
    assert_eq!(account::balance(&conn, a.id).unwrap(), dec("10"));

    transaction::set_verified(&conn, "alice", t.id, a.id, false).unwrap();
    let t = transaction::read(&conn, "alice", t.id).unwrap();
    assert!(!t.account_splits[0].verified);
}

#[test]
fn verify_on_a_missing_split_is_not_found() {
    let mut conn = setup();
    let a = account::create(&mut conn, "alice", "A", "USD", dec("0")).unwrap();
    let t = transaction::create(&mut conn, "alice", &draft("10"), SplitPolicy::Unchecked).unwrap();
    let err = transaction::set_verified(&conn, "alice", t.id, a.id, true).unwrap_err();
    assert!(err.is_not_found());
}
