// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user settings. Identity itself comes from the caller; the core only
//! keeps the currency aggregate balances are reported in.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::ledger::currency;

pub fn preferred_currency(conn: &Connection, user: &str) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT preferred_currency FROM users WHERE username=?1",
            params![user],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| "USD".to_string()))
}

pub fn set_preferred_currency(conn: &Connection, user: &str, code: &str) -> Result<()> {
    let ccy = currency::resolve(conn, user, code)?;
    conn.execute(
        "INSERT INTO users(username, preferred_currency) VALUES(?1, ?2)
         ON CONFLICT(username) DO UPDATE SET preferred_currency=excluded.preferred_currency",
        params![user, ccy.isocode],
    )?;
    Ok(())
}
