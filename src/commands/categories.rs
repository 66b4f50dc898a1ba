// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::require_user;
use crate::ledger::category::{self, CategoryChanges};
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = require_user(sub)?;
            let name = sub.get_one::<String>("name").unwrap();
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            let parent = sub.get_one::<i64>("parent").copied();
            let c = category::create(conn, &user, name, &ccy, parent)?;
            println!("Added category '{}' (#{})", c.name, c.id);
        }
        Some(("list", sub)) => {
            let user = require_user(sub)?;
            let data = category::list(conn, &user)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let mut rows = Vec::new();
                for node in &data {
                    rows.push(vec![
                        node.category.id.to_string(),
                        node.category.name.clone(),
                        node.category.currency.clone(),
                    ]);
                    for child in &node.children {
                        rows.push(vec![
                            child.id.to_string(),
                            format!("  {}", child.name),
                            child.currency.clone(),
                        ]);
                    }
                }
                println!("{}", pretty_table(&["ID", "Name", "CCY"], rows));
            }
        }
        Some(("set", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let changes = CategoryChanges {
                name: sub.get_one::<String>("name").cloned(),
                currency: sub.get_one::<String>("currency").map(|s| s.to_uppercase()),
            };
            let c = category::update(conn, &user, id, &changes)?;
            println!("Updated category '{}'", c.name);
        }
        Some(("move", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let parent = sub.get_one::<i64>("parent").copied();
            let c = category::move_category(conn, &user, id, parent)?;
            match c.parent {
                Some(p) => println!("Moved '{}' under #{}", c.name, p),
                None => println!("Moved '{}' to the root", c.name),
            }
        }
        Some(("rm", sub)) => {
            let user = require_user(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            category::delete(conn, &user, id)?;
            println!("Removed category #{}", id);
        }
        _ => {}
    }
    Ok(())
}
