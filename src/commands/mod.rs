// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

pub mod accounts;
pub mod categories;
pub mod currencies;
pub mod transactions;
pub mod user;

pub(crate) fn require_user(m: &clap::ArgMatches) -> Result<String> {
    m.get_one::<String>("user")
        .cloned()
        .context("--user is required")
}

pub(crate) fn print_skipped(skipped: &[crate::models::SkippedField]) {
    for s in skipped {
        println!("note: '{}' not applied: {}", s.field, s.reason);
    }
}
