// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::commands::require_user;
use crate::users;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-currency", sub)) => {
            let user = require_user(sub)?;
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            users::set_preferred_currency(conn, &user, &ccy)?;
            println!("Preferred currency for '{}' set to {}", user, ccy);
        }
        Some(("show", sub)) => {
            let user = require_user(sub)?;
            let ccy = users::preferred_currency(conn, &user)?;
            println!("{}: preferred currency {}", user, ccy);
        }
        _ => {}
    }
    Ok(())
}
