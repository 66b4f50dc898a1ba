// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::{print_skipped, require_user};
use crate::ledger::account::{self, AccountChanges};
use crate::rates::Frankfurter;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let name = sub.get_one::<String>("name").unwrap();
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            let start = parse_decimal(sub.get_one::<String>("start-balance").unwrap())?;
            let a = account::create(conn, &user, name, &ccy, start)?;
            println!("Added account '{}' (#{}, {})", a.name, a.id, a.currency);
        }
        Some(("list", sub)) => {
            let user = require_user(sub)?;
            let data = account::list(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let mut rows = Vec::new();
                for a in &data {
                    let bal = account::balance(conn, a.id)?;
                    rows.push(vec![
                        a.id.to_string(),
                        a.name.clone(),
                        a.currency.clone(),
                        a.start_balance.round_dp(2).to_string(),
                        bal.round_dp(2).to_string(),
                    ]);
                }
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "CCY", "Start", "Balance"], rows)
                );
            }
        }
        Some(("set", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let changes = AccountChanges {
                name: sub.get_one::<String>("name").cloned(),
                currency: sub.get_one::<String>("currency").map(|s| s.to_uppercase()),
                start_balance: sub
                    .get_one::<String>("start-balance")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
            };
            let outcome = account::update(conn, &user, id, &changes)?;
            print_skipped(&outcome.skipped);
            println!("Updated account '{}'", outcome.record.name);
        }
        Some(("share", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let with_user = sub.get_one::<String>("with").unwrap();
            account::share(conn, &user, id, with_user)?;
            println!("Account #{} shared with '{}'", id, with_user);
        }
        Some(("rm", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            account::delete(conn, &user, id)?;
            println!("Removed account #{}", id);
        }
        Some(("balance", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let a = account::read(conn, &user, id)?;
            let bal = account::balance(conn, a.id)?;
            println!("{}: {}", a.name, fmt_money(&bal, &a.currency));
        }
        Some(("total", sub)) => {
            let user = require_user(sub)?;
            let source = Frankfurter::new()?;
            let total = account::total_balance(conn, &source, &user)?;
            println!("Total: {}", fmt_money(&total.balance, &total.currency));
        }
        _ => {}
    }
    Ok(())
}
