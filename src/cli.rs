// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{arg, command, value_parser, ArgAction, Command};

pub fn build_cli() -> Command {
    command!()
        .about("Debt and daily-expense tracker with an Uzbek conversational front end")
        .arg(arg!(--db <PATH> "Database path override").global(true))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("init").about("Create the database and schema"))
        .subcommand(
            Command::new("chat")
                .about("Interactive console session against the flow engine")
                .arg(
                    arg!(--user <ID> "Numeric chat id to act as")
                        .value_parser(value_parser!(i64))
                        .default_value("1"),
                )
                .arg(arg!(--name <NAME> "Display name").default_value("Konsol"))
                .arg(arg!(--username <USERNAME> "Optional handle")),
        )
        .subcommand(
            Command::new("remind")
                .about("Send one round of due-date reminders (run daily from cron)")
                .arg(arg!(--date <DATE> "Sweep date, defaults to today")),
        )
        .subcommand(
            Command::new("overdue")
                .about("Notify owners of overdue debts (run every few days from cron)")
                .arg(arg!(--date <DATE> "Sweep date, defaults to today")),
        )
        .subcommand(
            Command::new("stats")
                .about("Per-currency totals for one user")
                .arg(arg!(--user <ID> "Chat id").value_parser(value_parser!(i64)).required(true))
                .arg(arg!(--json "Emit JSON instead of text").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("debts")
                .about("List a user's debts")
                .arg(arg!(--user <ID> "Chat id").value_parser(value_parser!(i64)).required(true))
                .arg(arg!(--direction <DIR> "given or taken").default_value("given"))
                .arg(arg!(--all "Include settled debts").action(ArgAction::SetTrue))
                .arg(arg!(--json "Emit JSON instead of a table").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("export")
                .about("Write a user's records to CSV or JSON")
                .arg(arg!(--user <ID> "Chat id").value_parser(value_parser!(i64)).required(true))
                .arg(arg!(--what <WHAT> "debts or expenses").default_value("debts"))
                .arg(arg!(--format <FORMAT> "csv or json").default_value("csv"))
                .arg(arg!(--month <MONTH> "Limit expenses to YYYY-MM"))
                .arg(arg!(--out <PATH> "Output file").required(true)),
        )
}
