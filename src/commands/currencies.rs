// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::{print_skipped, require_user};
use crate::ledger::currency::{self, CurrencyChanges};
use crate::rates::Frankfurter;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("code").unwrap().to_uppercase();
            let name = sub.get_one::<String>("name").unwrap();
            let rate = sub
                .get_one::<String>("rate")
                .map(|s| parse_decimal(s))
                .transpose()?;
            let c = currency::create(conn, &user, &code, name, rate)?;
            println!("Added currency '{}' ({})", c.isocode, c.name);
        }
        Some(("list", sub)) => {
            let user = require_user(sub)?;
            let data = currency::list(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.isocode.clone(),
                            c.symbol.clone(),
                            c.name.clone(),
                            c.rate.map(|r| r.to_string()).unwrap_or_default(),
                            c.owner.clone().unwrap_or_else(|| "(global)".into()),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Code", "Symbol", "Name", "Rate", "Owner"], rows)
                );
            }
        }
        Some(("set", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("code").unwrap().to_uppercase();
            let changes = CurrencyChanges {
                code: sub.get_one::<String>("new-code").map(|s| s.to_uppercase()),
                name: sub.get_one::<String>("name").cloned(),
                rate: sub
                    .get_one::<String>("rate")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
            };
            let outcome = currency::update(conn, &user, &code, &changes)?;
            print_skipped(&outcome.skipped);
            println!("Updated currency '{}'", outcome.record.isocode);
        }
        Some(("rm", sub)) => {
            let user = require_user(sub)?;
            let code = sub.get_one::<String>("code").unwrap().to_uppercase();
            currency::delete(conn, &user, &code)?;
            println!("Removed currency '{}'", code);
        }
        Some(("rate", sub)) => {
            let user = require_user(sub)?;
            let from = sub.get_one::<String>("from").unwrap().to_uppercase();
            let to = sub.get_one::<String>("to").unwrap().to_uppercase();
            let source = Frankfurter::new()?;
            let r = currency::rate(conn, &source, &user, &from, &to)?;
            println!("1 {} = {} {}", from, r, to);
        }
        Some(("convert", sub)) => {
            let user = require_user(sub)?;
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let from = sub.get_one::<String>("from").unwrap().to_uppercase();
            let to = sub.get_one::<String>("to").unwrap().to_uppercase();
            let source = Frankfurter::new()?;
            let r = currency::rate(conn, &source, &user, &from, &to)?;
            println!("{} {} -> {} {}", amount, from, (amount * r).round_dp(4), to);
        }
        _ => {}
    }
    Ok(())
}
