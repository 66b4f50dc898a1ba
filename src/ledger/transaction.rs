// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction engine. A transaction and its account/category splits are one
//! atomic unit: partial application is never observable, and replacing a
//! split set deletes and reinserts inside the same SQL transaction so
//! balances cannot transiently double count.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::ledger::currency;
use crate::models::{AccountSplit, CategorySplit, TransactionRecord};
use crate::utils::stored_decimal;

/// Whether split amounts must balance against the transaction amount.
/// `Unchecked` records splits exactly as given; `Balanced` rejects drafts
/// whose account-split or category-split sum differs from the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    #[default]
    Unchecked,
    Balanced,
}

#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    pub account_splits: Vec<(i64, Decimal)>,
    pub category_splits: Vec<(i64, Decimal)>,
}

#[derive(Debug, Default, Clone)]
pub struct TransactionChanges {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub date: Option<NaiveDate>,
    /// Wholesale replacement of the split set when present.
    pub account_splits: Option<Vec<(i64, Decimal)>>,
    pub category_splits: Option<Vec<(i64, Decimal)>>,
}

fn check_policy(
    policy: SplitPolicy,
    amount: Decimal,
    account_splits: &[(i64, Decimal)],
    category_splits: &[(i64, Decimal)],
) -> Result<()> {
    if policy == SplitPolicy::Unchecked {
        return Ok(());
    }
    for (label, splits) in [("account", account_splits), ("category", category_splits)] {
        if splits.is_empty() {
            continue;
        }
        let sum: Decimal = splits.iter().map(|(_, a)| *a).sum();
        if sum != amount {
            return Err(LedgerError::Validation(format!(
                "{} splits sum to {} but the transaction amount is {}",
                label, sum, amount
            )));
        }
    }
    Ok(())
}

// Ownership checks deliberately answer "not found" so existence of another
// user's rows does not leak across the boundary.
fn own_account(conn: &Connection, user: &str, id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT account_id FROM account_owners WHERE account_id=?1 AND owner=?2",
            params![id, user],
            |r| r.get(0),
        )
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| LedgerError::not_found("account", id.to_string()))
}

fn own_category(conn: &Connection, user: &str, id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE id=?1 AND owner=?2",
            params![id, user],
            |r| r.get(0),
        )
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| LedgerError::not_found("category", id.to_string()))
}

fn insert_splits(
    conn: &Connection,
    user: &str,
    transaction_id: i64,
    account_splits: &[(i64, Decimal)],
    category_splits: &[(i64, Decimal)],
) -> Result<()> {
    let mut acct = conn.prepare(
        "INSERT INTO account_splits(transaction_id, account_id, amount) VALUES (?1, ?2, ?3)",
    )?;
    for (account_id, amount) in account_splits {
        own_account(conn, user, *account_id)?;
        acct.execute(params![transaction_id, account_id, amount.to_string()])?;
    }
    let mut cat = conn.prepare(
        "INSERT INTO category_splits(transaction_id, category_id, amount) VALUES (?1, ?2, ?3)",
    )?;
    for (category_id, amount) in category_splits {
        own_category(conn, user, *category_id)?;
        cat.execute(params![transaction_id, category_id, amount.to_string()])?;
    }
    Ok(())
}

pub fn create(
    conn: &mut Connection,
    user: &str,
    draft: &TransactionDraft,
    policy: SplitPolicy,
) -> Result<TransactionRecord> {
    if draft.description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "transaction description is required".into(),
        ));
    }
    check_policy(
        policy,
        draft.amount,
        &draft.account_splits,
        &draft.category_splits,
    )?;
    let tx = conn.transaction()?;
    let ccy = currency::resolve(&tx, user, &draft.currency)?;
    tx.execute(
        "INSERT INTO transactions(owner, description, original_description, amount, currency_id, date)
         VALUES (?1, ?2, ?2, ?3, ?4, ?5)",
        params![
            user,
            draft.description,
            draft.amount.to_string(),
            ccy.id,
            draft.date.to_string()
        ],
    )?;
    let id = tx.last_insert_rowid();
    insert_splits(&tx, user, id, &draft.account_splits, &draft.category_splits)?;
    tx.commit()?;
    read(conn, user, id)
}

pub fn update(
    conn: &mut Connection,
    user: &str,
    id: i64,
    changes: &TransactionChanges,
    policy: SplitPolicy,
) -> Result<TransactionRecord> {
    let current = read(conn, user, id)?;
    let amount = changes.amount.unwrap_or(current.amount);
    let account_splits = changes.account_splits.clone().unwrap_or_else(|| {
        current
            .account_splits
            .iter()
            .map(|s| (s.account_id, s.amount))
            .collect()
    });
    let category_splits = changes.category_splits.clone().unwrap_or_else(|| {
        current
            .category_splits
            .iter()
            .map(|s| (s.category_id, s.amount))
            .collect()
    });
    check_policy(policy, amount, &account_splits, &category_splits)?;

    let tx = conn.transaction()?;
    let currency_id = match &changes.currency {
        Some(code) => currency::resolve(&tx, user, code)?.id,
        None => tx.query_row(
            "SELECT currency_id FROM transactions WHERE id=?1",
            params![current.id],
            |r| r.get(0),
        )?,
    };
    // original_description is frozen at creation time.
    tx.execute(
        "UPDATE transactions SET description=?1, amount=?2, currency_id=?3, date=?4 WHERE id=?5",
        params![
            changes.description.as_deref().unwrap_or(&current.description),
            amount.to_string(),
            currency_id,
            changes.date.unwrap_or(current.date).to_string(),
            current.id
        ],
    )?;
    if changes.account_splits.is_some() {
        tx.execute(
            "DELETE FROM account_splits WHERE transaction_id=?1",
            params![current.id],
        )?;
        insert_splits(&tx, user, current.id, &account_splits, &[])?;
    }
    if changes.category_splits.is_some() {
        tx.execute(
            "DELETE FROM category_splits WHERE transaction_id=?1",
            params![current.id],
        )?;
        insert_splits(&tx, user, current.id, &[], &category_splits)?;
    }
    tx.commit()?;
    read(conn, user, id)
}

pub fn delete(conn: &Connection, user: &str, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND owner=?2",
        params![id, user],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found("transaction", id.to_string()));
    }
    Ok(())
}

/// Reconciliation flag on one account split. Independent of the rest of the
/// transaction and of balance computation.
pub fn set_verified(
    conn: &Connection,
    user: &str,
    transaction_id: i64,
    account_id: i64,
    verified: bool,
) -> Result<()> {
    own_account(conn, user, account_id)?;
    let n = conn.execute(
        "UPDATE account_splits SET verified=?1
         WHERE transaction_id=?2 AND account_id=?3
           AND transaction_id IN (SELECT id FROM transactions WHERE owner=?4)",
        params![verified, transaction_id, account_id, user],
    )?;
    if n == 0 {
        return Err(LedgerError::not_found(
            "account split",
            format!("{}:{}", transaction_id, account_id),
        ));
    }
    Ok(())
}

fn splits_of(conn: &Connection, id: i64) -> Result<(Vec<AccountSplit>, Vec<CategorySplit>)> {
    let mut stmt = conn.prepare(
        "SELECT account_id, amount, verified FROM account_splits
         WHERE transaction_id=?1 ORDER BY account_id",
    )?;
    let rows = stmt.query_map(params![id], |r| {
        Ok(AccountSplit {
            account_id: r.get(0)?,
            amount: stored_decimal(r.get(1)?, 1)?,
            verified: r.get(2)?,
        })
    })?;
    let mut account_splits = Vec::new();
    for row in rows {
        account_splits.push(row?);
    }
    let mut stmt = conn.prepare(
        "SELECT category_id, amount FROM category_splits
         WHERE transaction_id=?1 ORDER BY category_id",
    )?;
    let rows = stmt.query_map(params![id], |r| {
        Ok(CategorySplit {
            category_id: r.get(0)?,
            amount: stored_decimal(r.get(1)?, 1)?,
        })
    })?;
    let mut category_splits = Vec::new();
    for row in rows {
        category_splits.push(row?);
    }
    Ok((account_splits, category_splits))
}

const SELECT: &str = "SELECT t.id, t.description, t.original_description, t.amount,
    cur.isocode, t.date FROM transactions t JOIN currencies cur ON t.currency_id=cur.id";

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let date: String = row.get(5)?;
    Ok(TransactionRecord {
        id: row.get(0)?,
        description: row.get(1)?,
        original_description: row.get(2)?,
        amount: stored_decimal(row.get(3)?, 3)?,
        currency: row.get(4)?,
        date: date.parse().map_err(|e: chrono::ParseError| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        account_splits: Vec::new(),
        category_splits: Vec::new(),
    })
}

pub fn read(conn: &Connection, user: &str, id: i64) -> Result<TransactionRecord> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE t.id=?1 AND t.owner=?2"))?;
    let mut record = stmt
        .query_row(params![id, user], from_row)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("transaction", id.to_string()))?;
    let (account_splits, category_splits) = splits_of(conn, record.id)?;
    record.account_splits = account_splits;
    record.category_splits = category_splits;
    Ok(record)
}

pub fn list(conn: &Connection, user: &str) -> Result<Vec<TransactionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE t.owner=?1 ORDER BY t.date DESC, t.id DESC"
    ))?;
    let rows = stmt.query_map(params![user], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    for record in &mut out {
        let (account_splits, category_splits) = splits_of(conn, record.id)?;
        record.account_splits = account_splits;
        record.category_splits = category_splits;
    }
    Ok(out)
}
