// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::commands::require_user;
use crate::ledger::transaction::{self, SplitPolicy, TransactionChanges, TransactionDraft};
use crate::models::TransactionRecord;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_split, pretty_table};

fn splits_arg(sub: &clap::ArgMatches, name: &str) -> Result<Vec<(i64, Decimal)>> {
    let mut out = Vec::new();
    if let Some(values) = sub.get_many::<String>(name) {
        for v in values {
            out.push(parse_split(v)?);
        }
    }
    Ok(out)
}

fn policy(sub: &clap::ArgMatches) -> SplitPolicy {
    if sub.get_flag("balanced") {
        SplitPolicy::Balanced
    } else {
        SplitPolicy::Unchecked
    }
}

fn print_record(t: &TransactionRecord) {
    println!(
        "#{} {} {} {} ({})",
        t.id,
        t.date,
        t.amount.round_dp(2),
        t.currency,
        t.description
    );
    for s in &t.account_splits {
        let mark = if s.verified { " [verified]" } else { "" };
        println!("  account #{}: {}{}", s.account_id, s.amount.round_dp(2), mark);
    }
    for s in &t.category_splits {
        println!("  category #{}: {}", s.category_id, s.amount.round_dp(2));
    }
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let draft = TransactionDraft {
                description: sub.get_one::<String>("description").unwrap().clone(),
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                currency: sub.get_one::<String>("currency").unwrap().to_uppercase(),
                date: parse_date(sub.get_one::<String>("date").unwrap())?,
                account_splits: splits_arg(sub, "account-split")?,
                category_splits: splits_arg(sub, "category-split")?,
            };
            let t = transaction::create(conn, &user, &draft, policy(sub))?;
            println!("Recorded transaction #{}", t.id);
        }
        Some(("list", sub)) => {
            let user = require_user(sub)?;
            let data = transaction::list(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            t.date.to_string(),
                            t.description.clone(),
                            t.amount.round_dp(2).to_string(),
                            t.currency.clone(),
                            t.account_splits.len().to_string(),
                            t.category_splits.len().to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Date", "Description", "Amount", "CCY", "Accts", "Cats"],
                        rows,
                    )
                );
            }
        }
        Some(("show", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            print_record(&transaction::read(conn, &user, id)?);
        }
        Some(("edit", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let account_splits = if sub.get_flag("clear-account-splits") {
                Some(Vec::new())
            } else if sub.contains_id("account-split") {
                Some(splits_arg(sub, "account-split")?)
            } else {
                None
            };
            let category_splits = if sub.get_flag("clear-category-splits") {
                Some(Vec::new())
            } else if sub.contains_id("category-split") {
                Some(splits_arg(sub, "category-split")?)
            } else {
                None
            };
            let changes = TransactionChanges {
                description: sub.get_one::<String>("description").cloned(),
                amount: sub
                    .get_one::<String>("amount")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                currency: sub.get_one::<String>("currency").map(|s| s.to_uppercase()),
                date: sub
                    .get_one::<String>("date")
                    .map(|s| parse_date(s))
                    .transpose()?,
                account_splits,
                category_splits,
            };
            let t = transaction::update(conn, &user, id, &changes, policy(sub))?;
            print_record(&t);
        }
        Some(("rm", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            transaction::delete(conn, &user, id)?;
            println!("Removed transaction #{}", id);
        }
        Some(("verify", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let account = *sub.get_one::<i64>("account").unwrap();
            let flag = !sub.get_flag("clear");
            transaction::set_verified(conn, &user, id, account, flag)?;
            println!(
                "Split {}:{} {}",
                id,
                account,
                if flag { "verified" } else { "unverified" }
            );
        }
        _ => {}
    }
    Ok(())
}
