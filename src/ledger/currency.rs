// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Two-tier currency namespace: globally visible currencies (no owner) plus
//! each user's own definitions. A user's code shadows a global code with the
//! same spelling; resolution always prefers the user-owned row.

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::models::{Currency, SkippedField, UpdateOutcome};
use crate::rates::RateSource;

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Currency> {
    let rate: Option<String> = row.get(4)?;
    Ok(Currency {
        id: row.get(0)?,
        isocode: row.get(1)?,
        symbol: row.get(2)?,
        name: row.get(3)?,
        rate: rate.and_then(|s| s.parse().ok()),
        owner: row.get(5)?,
    })
}

/// All currencies visible to `user`: the global set union the user's own.
pub fn list(conn: &Connection, user: &str) -> Result<Vec<Currency>> {
    let mut stmt = conn.prepare(
        "SELECT id, isocode, symbol, name, rate, owner FROM currencies
         WHERE owner IS NULL OR owner=?1 ORDER BY isocode, owner IS NULL",
    )?;
    let rows = stmt.query_map(params![user], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(crate) fn try_resolve(conn: &Connection, user: &str, isocode: &str) -> Result<Option<Currency>> {
    // owner IS NULL sorts user-owned rows first: private codes shadow global.
    let mut stmt = conn.prepare(
        "SELECT id, isocode, symbol, name, rate, owner FROM currencies
         WHERE isocode=?1 AND (owner IS NULL OR owner=?2)
         ORDER BY owner IS NULL LIMIT 1",
    )?;
    Ok(stmt.query_row(params![isocode, user], from_row).optional()?)
}

pub fn resolve(conn: &Connection, user: &str, isocode: &str) -> Result<Currency> {
    try_resolve(conn, user, isocode)?
        .ok_or_else(|| LedgerError::not_found("currency", isocode))
}

/// Create a user-owned currency. User-defined codes double as the symbol.
pub fn create(
    conn: &Connection,
    user: &str,
    isocode: &str,
    name: &str,
    rate: Option<Decimal>,
) -> Result<Currency> {
    if isocode.trim().is_empty() || name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "currency code and name are required".into(),
        ));
    }
    if try_resolve(conn, user, isocode)?.is_some() {
        return Err(LedgerError::Conflict(format!(
            "a currency with code '{}' already exists",
            isocode
        )));
    }
    conn.execute(
        "INSERT INTO currencies(isocode, symbol, name, rate, owner) VALUES (?1, ?1, ?2, ?3, ?4)",
        params![isocode, name, rate.map(|r| r.to_string()), user],
    )?;
    resolve(conn, user, isocode)
}

#[derive(Debug, Default, Clone)]
pub struct CurrencyChanges {
    /// New code; sets both isocode and symbol.
    pub code: Option<String>,
    pub name: Option<String>,
    pub rate: Option<Decimal>,
}

/// Update a user-owned currency. A rename that collides with a visible code
/// is skipped and reported; the other fields still apply.
pub fn update(
    conn: &Connection,
    user: &str,
    isocode: &str,
    changes: &CurrencyChanges,
) -> Result<UpdateOutcome<Currency>> {
    let currency = resolve(conn, user, isocode)?;
    if currency.is_global() {
        return Err(LedgerError::Forbidden(
            "globally defined currencies cannot be modified".into(),
        ));
    }
    let mut skipped = Vec::new();
    let mut code = currency.isocode.clone();
    if let Some(new_code) = &changes.code {
        if *new_code != currency.isocode {
            match try_resolve(conn, user, new_code)? {
                Some(_) => skipped.push(SkippedField {
                    field: "code",
                    reason: format!("code '{}' is already taken", new_code),
                }),
                None => code = new_code.clone(),
            }
        }
    }
    conn.execute(
        "UPDATE currencies SET isocode=?1, symbol=?1, name=?2, rate=?3 WHERE id=?4",
        params![
            code,
            changes.name.as_deref().unwrap_or(&currency.name),
            changes.rate.or(currency.rate).map(|r| r.to_string()),
            currency.id
        ],
    )?;
    let record = resolve(conn, user, &code)?;
    Ok(UpdateOutcome { record, skipped })
}

pub(crate) fn reference_count(conn: &Connection, currency_id: i64) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM accounts WHERE currency_id=?1)
              + (SELECT COUNT(*) FROM categories WHERE currency_id=?1)
              + (SELECT COUNT(*) FROM transactions WHERE currency_id=?1)",
        params![currency_id],
        |r| r.get(0),
    )?;
    Ok(count)
}

pub fn delete(conn: &Connection, user: &str, isocode: &str) -> Result<()> {
    let currency = resolve(conn, user, isocode)?;
    if currency.is_global() {
        return Err(LedgerError::Forbidden(
            "globally defined currencies cannot be deleted".into(),
        ));
    }
    if reference_count(conn, currency.id)? > 0 {
        return Err(LedgerError::Conflict(format!(
            "currency '{}' is still in use",
            isocode
        )));
    }
    conn.execute("DELETE FROM currencies WHERE id=?1", params![currency.id])?;
    Ok(())
}

/// Multiplicative factor converting an amount in `from` to `to` for `user`.
///
/// Stored rates are relative to the common reference, so the factor is
/// `to.rate / from.rate`; private rates shadow global ones through the
/// resolution scope. Pairs missing a stored rate fall back to the external
/// source. No transitivity across independently maintained rates is assumed.
pub fn rate(
    conn: &Connection,
    source: &dyn RateSource,
    user: &str,
    from: &str,
    to: &str,
) -> Result<Decimal> {
    if from == to {
        return Ok(Decimal::ONE);
    }
    let from_ccy = resolve(conn, user, from)?;
    let to_ccy = resolve(conn, user, to)?;
    if let (Some(fr), Some(tr)) = (from_ccy.rate, to_ccy.rate) {
        if !fr.is_zero() {
            return Ok(tr / fr);
        }
    }
    match source.fetch_rate(&from_ccy.isocode, &to_ccy.isocode)? {
        Some(r) => Ok(r),
        None => Err(LedgerError::Conversion {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}
