// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use splitbook::error::{ErrorKind, LedgerError};
use splitbook::ledger::transaction::{SplitPolicy, TransactionDraft};
use splitbook::ledger::{account, currency, transaction};
use splitbook::rates::{NoRates, StaticRates};
use splitbook::users;

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

fn record(conn: &mut Connection, user: &str, account_id: i64, amount: &str, day: &str) {
    transaction::create(
        conn,
        user,
        &TransactionDraft {
            description: format!("{} on {}", amount, day),
            amount: dec(amount),
            currency: "USD".into(),
            date: date(day),
            account_splits: vec![(account_id, dec(amount))],
            category_splits: vec![],
        },
        SplitPolicy::Unchecked,
    )
    .unwrap();
}

#[test]
fn balance_is_start_plus_split_sum() {
    let mut conn = setup();
    let checking = account::create(&mut conn, "alice", "Checking", "USD", dec("100.00")).unwrap();
    record(&mut conn, "alice", checking.id, "50.00", "2026-08-01");
    record(&mut conn, "alice", checking.id, "-20.00", "2026-08-02");
    assert_eq!(account::balance(&conn, checking.id).unwrap(), dec("130.00"));
}

#[test]
fn balance_is_insertion_order_independent() {
    let mut conn = setup();
    let a = account::create(&mut conn, "alice", "A", "USD", dec("5")).unwrap();
    let b = account::create(&mut conn, "alice", "B", "USD", dec("5")).unwrap();
    for amt in ["1.25", "-3.5", "100", "-0.001"] {
        record(&mut conn, "alice", a.id, amt, "2026-01-01");
    }
    for amt in ["-0.001", "100", "-3.5", "1.25"] {
        record(&mut conn, "alice", b.id, amt, "2026-01-01");
    }
    assert_eq!(
        account::balance(&conn, a.id).unwrap(),
        account::balance(&conn, b.id).unwrap()
    );
}

#[test]
fn currency_change_is_frozen_once_splits_exist() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "Wallet", "USD", dec("0")).unwrap();
    record(&mut conn, "alice", acct.id, "10", "2026-08-01");

    let changes = account::AccountChanges {
        name: Some("Pocket".into()),
        currency: Some("EUR".into()),
        ..Default::default()
    };
    let outcome = account::update(&conn, "alice", acct.id, &changes).unwrap();
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].field, "currency");
    // The rest of the update still lands.
    assert_eq!(outcome.record.name, "Pocket");
    assert_eq!(outcome.record.currency, "USD");
}

#[test]
fn currency_change_applies_before_any_split() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "Wallet", "USD", dec("0")).unwrap();
    let changes = account::AccountChanges {
        currency: Some("EUR".into()),
        ..Default::default()
    };
    let outcome = account::update(&conn, "alice", acct.id, &changes).unwrap();
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.record.currency, "EUR");
}

#[test]
fn account_delete_is_unconditional_and_cascades() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "Wallet", "USD", dec("0")).unwrap();
    let t = transaction::create(
        &mut conn,
        "alice",
        &TransactionDraft {
            description: "salary".into(),
            amount: dec("100"),
            currency: "USD".into(),
            date: date("2026-08-01"),
            account_splits: vec![(acct.id, dec("100"))],
            category_splits: vec![],
        },
        SplitPolicy::Unchecked,
    )
    .unwrap();

    // No in-use guard, unlike currency deletion.
    account::delete(&conn, "alice", acct.id).unwrap();

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM account_splits", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
    // The transaction itself survives.
    assert!(transaction::read(&conn, "alice", t.id).is_ok());
}

#[test]
fn total_balance_converts_into_the_preferred_currency() {
    let mut conn = setup();
    currency::create(&conn, "alice", "AAA", "Alpha", Some(dec("10"))).unwrap();
    currency::create(&conn, "alice", "BBB", "Beta", Some(dec("11"))).unwrap();
    users::set_preferred_currency(&conn, "alice", "BBB").unwrap();

    // rate(AAA, BBB) = 11/10, so the AAA account contributes 110.
    account::create(&mut conn, "alice", "A", "AAA", dec("100")).unwrap();
    account::create(&mut conn, "alice", "B", "BBB", dec("20")).unwrap();

    let total = account::total_balance(&conn, &NoRates, "alice").unwrap();
    assert_eq!(total.currency, "BBB");
    assert_eq!(total.balance, dec("130"));
}

#[test]
fn total_balance_fails_closed_on_an_unresolvable_pair() {
    let mut conn = setup();
    currency::create(&conn, "alice", "NOP", "No rate", None).unwrap();
    account::create(&mut conn, "alice", "Cash", "USD", dec("10")).unwrap();
    account::create(&mut conn, "alice", "Oddball", "NOP", dec("5")).unwrap();

    let err = account::total_balance(&conn, &NoRates, "alice").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    match err {
        LedgerError::Conversion { from, to } => {
            assert_eq!(from, "NOP");
            assert_eq!(to, "USD");
        }
        other => panic!("expected conversion error, got {other:?}"),
    }

    // With a source that can quote the pair, the aggregate resolves.
    let source = StaticRates::default().with("NOP", "USD", dec("2"));
    let total = account::total_balance(&conn, &source, "alice").unwrap();
    assert_eq!(total.balance, dec("20"));
}

#[test]
fn accounts_are_invisible_across_owners() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "Wallet", "USD", dec("0")).unwrap();
    assert!(account::read(&conn, "bob", acct.id).unwrap_err().is_not_found());
    assert!(account::delete(&conn, "bob", acct.id).unwrap_err().is_not_found());
}

#[test]
fn shared_account_is_visible_to_both_owners() {
    let mut conn = setup();
    let acct = account::create(&mut conn, "alice", "Joint", "USD", dec("0")).unwrap();
    account::share(&conn, "alice", acct.id, "bob").unwrap();
    assert!(account::read(&conn, "bob", acct.id).is_ok());
    assert_eq!(account::list(&conn, "bob").unwrap().len(), 1);
}
