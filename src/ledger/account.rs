// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Accounts and derived balances. A balance is always an aggregate over the
//! persisted splits, never a cached running total, so it cannot drift from
//! the split set.

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::ledger::currency;
use crate::models::{Account, SkippedField, Total, UpdateOutcome};
use crate::rates::RateSource;
use crate::users;
use crate::utils::stored_decimal;

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        currency: row.get(2)?,
        start_balance: stored_decimal(row.get(3)?, 3)?,
    })
}

const SELECT: &str = "SELECT a.id, a.name, cur.isocode, a.start_balance
    FROM accounts a JOIN currencies cur ON a.currency_id=cur.id";

/// Accounts are reachable only through an ownership row; absence and
/// non-ownership are indistinguishable to the caller.
pub fn read(conn: &Connection, user: &str, id: i64) -> Result<Account> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} JOIN account_owners ao ON ao.account_id=a.id
         WHERE a.id=?1 AND ao.owner=?2"
    ))?;
    stmt.query_row(params![id, user], from_row)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("account", id.to_string()))
}

pub fn list(conn: &Connection, user: &str) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} JOIN account_owners ao ON ao.account_id=a.id
         WHERE ao.owner=?1 ORDER BY a.name"
    ))?;
    let rows = stmt.query_map(params![user], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Insert the account and its ownership row as one unit.
pub fn create(
    conn: &mut Connection,
    user: &str,
    name: &str,
    currency_code: &str,
    start_balance: Decimal,
) -> Result<Account> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("account name is required".into()));
    }
    let ccy = currency::resolve(conn, user, currency_code)?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO accounts(name, currency_id, start_balance) VALUES (?1, ?2, ?3)",
        params![name, ccy.id, start_balance.to_string()],
    )?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO account_owners(account_id, owner) VALUES (?1, ?2)",
        params![id, user],
    )?;
    tx.commit()?;
    read(conn, user, id)
}

/// Add another owner to an existing account (shared accounts).
pub fn share(conn: &Connection, user: &str, id: i64, with_user: &str) -> Result<()> {
    read(conn, user, id)?;
    conn.execute(
        "INSERT OR IGNORE INTO account_owners(account_id, owner) VALUES (?1, ?2)",
        params![id, with_user],
    )?;
    Ok(())
}

pub(crate) fn split_count(conn: &Connection, account_id: i64) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM account_splits WHERE account_id=?1",
        params![account_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

#[derive(Debug, Default, Clone)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub start_balance: Option<Decimal>,
}

/// Update an account. A currency change is refused once any split references
/// the account (historical balances would silently change meaning); the
/// refusal is reported in the outcome instead of failing the whole update.
pub fn update(
    conn: &Connection,
    user: &str,
    id: i64,
    changes: &AccountChanges,
) -> Result<UpdateOutcome<Account>> {
    let account = read(conn, user, id)?;
    let mut skipped = Vec::new();
    if let Some(name) = &changes.name {
        conn.execute(
            "UPDATE accounts SET name=?1 WHERE id=?2",
            params![name, account.id],
        )?;
    }
    if let Some(code) = &changes.currency {
        let ccy = currency::resolve(conn, user, code)?;
        if split_count(conn, account.id)? > 0 {
            skipped.push(SkippedField {
                field: "currency",
                reason: "account has recorded splits; currency is frozen".into(),
            });
        } else {
            conn.execute(
                "UPDATE accounts SET currency_id=?1 WHERE id=?2",
                params![ccy.id, account.id],
            )?;
        }
    }
    if let Some(start) = changes.start_balance {
        conn.execute(
            "UPDATE accounts SET start_balance=?1 WHERE id=?2",
            params![start.to_string(), account.id],
        )?;
    }
    Ok(UpdateOutcome {
        record: read(conn, user, id)?,
        skipped,
    })
}

/// Deleting an account is unconditional: ownership rows and splits cascade.
/// Unlike currencies there is no in-use guard; nothing else shares the rows.
pub fn delete(conn: &Connection, user: &str, id: i64) -> Result<()> {
    read(conn, user, id)?;
    conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    Ok(())
}

/// `start_balance + Σ split amounts`, summed as decimals over the persisted
/// rows. Summation order is irrelevant.
pub fn balance(conn: &Connection, account_id: i64) -> Result<Decimal> {
    let start: Decimal = conn
        .query_row(
            "SELECT start_balance FROM accounts WHERE id=?1",
            params![account_id],
            |r| stored_decimal(r.get(0)?, 0),
        )
        .optional()?
        .ok_or_else(|| LedgerError::not_found("account", account_id.to_string()))?;
    let mut stmt = conn.prepare("SELECT amount FROM account_splits WHERE account_id=?1")?;
    let rows = stmt.query_map(params![account_id], |r| stored_decimal(r.get(0)?, 0))?;
    let mut total = start;
    for row in rows {
        total += row?;
    }
    Ok(total)
}

/// Every owned account's balance converted to the user's preferred currency
/// and summed. One unresolvable rate aborts the whole aggregation; partial
/// totals are never reported.
pub fn total_balance(conn: &Connection, source: &dyn RateSource, user: &str) -> Result<Total> {
    let preferred = users::preferred_currency(conn, user)?;
    let mut total = Decimal::ZERO;
    for account in list(conn, user)? {
        let factor = currency::rate(conn, source, user, &account.currency, &preferred)?;
        total += balance(conn, account.id)? * factor;
    }
    Ok(Total {
        balance: total,
        currency: preferred,
    })
}
