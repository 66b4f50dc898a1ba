// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("splitbook")
        .about("Multi-user, multi-currency ledger with split transactions")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .help("Acting username (supplied by the caller, not authenticated)"),
        )
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("user")
                .about("Per-user settings")
                .subcommand(
                    Command::new("set-currency")
                        .about("Set the preferred currency for aggregate balances")
                        .arg(Arg::new("currency").required(true)),
                )
                .subcommand(Command::new("show").about("Show user settings")),
        )
        .subcommand(
            Command::new("currency")
                .about("Manage currencies (global and user-owned)")
                .subcommand(
                    Command::new("add")
                        .about("Create a user-owned currency")
                        .arg(Arg::new("code").required(true))
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("rate").long("rate").help(
                            "Units of this currency per one unit of the common reference",
                        )),
                )
                .subcommand(Command::new("list").about("List visible currencies").arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .about("Update a user-owned currency")
                        .arg(Arg::new("code").required(true))
                        .arg(Arg::new("new-code").long("code"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("rate").long("rate")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an unused user-owned currency")
                        .arg(Arg::new("code").required(true)),
                )
                .subcommand(
                    Command::new("rate")
                        .about("Show the conversion factor between two codes")
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true)),
                )
                .subcommand(
                    Command::new("convert")
                        .about("Convert an amount between two codes")
                        .arg(Arg::new("amount").required(true))
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts and balances")
                .subcommand(
                    Command::new("add")
                        .about("Create an account")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(
                            Arg::new("start-balance")
                                .long("start-balance")
                                .default_value("0"),
                        ),
                )
                .subcommand(Command::new("list").about("List owned accounts").arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .about("Update an account")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("start-balance").long("start-balance")),
                )
                .subcommand(
                    Command::new("share")
                        .about("Grant another user ownership of an account")
                        .arg(id_arg())
                        .arg(Arg::new("with").long("with").required(true)),
                )
                .subcommand(Command::new("rm").about("Delete an account").arg(id_arg()))
                .subcommand(
                    Command::new("balance")
                        .about("Derived balance of one account")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("total")
                        .about("Sum of all balances in the preferred currency"),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the category tree")
                .subcommand(
                    Command::new("add")
                        .about("Create a category")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .about("List root categories with their children")
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("set")
                        .about("Rename or re-denominate a category")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("currency").long("currency")),
                )
                .subcommand(
                    Command::new("move")
                        .about("Re-parent a category (cycle-checked)")
                        .arg(id_arg())
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a category; children are reparented")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit split transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction with splits")
                        .arg(Arg::new("description").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("account-split")
                                .long("account-split")
                                .action(ArgAction::Append)
                                .help("ACCOUNT_ID:AMOUNT, repeatable"),
                        )
                        .arg(
                            Arg::new("category-split")
                                .long("category-split")
                                .action(ArgAction::Append)
                                .help("CATEGORY_ID:AMOUNT, repeatable"),
                        )
                        .arg(
                            Arg::new("balanced")
                                .long("balanced")
                                .action(ArgAction::SetTrue)
                                .help("Require split sums to equal the amount"),
                        ),
                )
                .subcommand(Command::new("list").about("List transactions").arg(json_flag()))
                .subcommand(Command::new("show").about("Show one transaction").arg(id_arg()))
                .subcommand(
                    Command::new("edit")
                        .about("Edit fields and/or replace split sets")
                        .arg(id_arg())
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("date").long("date"))
                        .arg(
                            Arg::new("account-split")
                                .long("account-split")
                                .action(ArgAction::Append),
                        )
                        .arg(
                            Arg::new("category-split")
                                .long("category-split")
                                .action(ArgAction::Append),
                        )
                        .arg(
                            Arg::new("clear-account-splits")
                                .long("clear-account-splits")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("clear-category-splits")
                                .long("clear-category-splits")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("balanced")
                                .long("balanced")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("rm").about("Delete a transaction").arg(id_arg()))
                .subcommand(
                    Command::new("verify")
                        .about("Toggle the reconciliation flag on one account split")
                        .arg(id_arg())
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .help("Clear instead of set"),
                        ),
                ),
        )
}
