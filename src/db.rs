// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Splitbook", "splitbook"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("splitbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        username TEXT PRIMARY KEY,
        preferred_currency TEXT NOT NULL DEFAULT 'USD'
    );

    -- owner NULL marks a globally visible currency; rate is units of this
    -- currency per one unit of the common reference, NULL = not convertible
    CREATE TABLE IF NOT EXISTS currencies(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        isocode TEXT NOT NULL,
        symbol TEXT NOT NULL,
        name TEXT NOT NULL,
        rate TEXT,
        owner TEXT,
        UNIQUE(isocode, owner)
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        currency_id INTEGER NOT NULL,
        start_balance TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(currency_id) REFERENCES currencies(id)
    );

    CREATE TABLE IF NOT EXISTS account_owners(
        account_id INTEGER NOT NULL,
        owner TEXT NOT NULL,
        PRIMARY KEY(account_id, owner),
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_account_owners_owner ON account_owners(owner);

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        parent_id INTEGER,
        currency_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        FOREIGN KEY(parent_id) REFERENCES categories(id),
        FOREIGN KEY(currency_id) REFERENCES currencies(id)
    );
    CREATE INDEX IF NOT EXISTS idx_categories_owner ON categories(owner);
    CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        description TEXT NOT NULL,
        original_description TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(currency_id) REFERENCES currencies(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_owner ON transactions(owner);
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS account_splits(
        transaction_id INTEGER NOT NULL,
        account_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        verified INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY(transaction_id, account_id),
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_account_splits_account ON account_splits(account_id);

    CREATE TABLE IF NOT EXISTS category_splits(
        transaction_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        PRIMARY KEY(transaction_id, category_id),
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_category_splits_category ON category_splits(category_id);
    "#,
    )?;
    seed_global_currencies(conn)?;
    Ok(())
}

// USD is the implicit common reference for seeded rates.
fn seed_global_currencies(conn: &Connection) -> Result<()> {
    let seed = [
        ("USD", "$", "US Dollar", "1"),
        ("EUR", "\u{20ac}", "Euro", "0.92"),
        ("GBP", "\u{a3}", "Pound Sterling", "0.79"),
        ("JPY", "\u{a5}", "Japanese Yen", "147"),
    ];
    let mut stmt = conn.prepare(
        "INSERT INTO currencies(isocode, symbol, name, rate, owner)
         SELECT ?1, ?2, ?3, ?4, NULL
         WHERE NOT EXISTS(SELECT 1 FROM currencies WHERE isocode=?1 AND owner IS NULL)",
    )?;
    for (iso, symbol, name, rate) in seed {
        stmt.execute(rusqlite::params![iso, symbol, name, rate])?;
    }
    Ok(())
}
