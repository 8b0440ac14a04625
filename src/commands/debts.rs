// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;
use rusqlite::Connection;

use crate::models::Direction;
use crate::store;
use crate::utils::{fmt_date, fmt_money, maybe_print_json, pretty_table, status_line, today};

pub fn handle(conn: &Connection, matches: &ArgMatches) -> Result<()> {
    let telegram_id = *matches.get_one::<i64>("user").context("--user is required")?;
    let direction = matches
        .get_one::<String>("direction")
        .and_then(|raw| Direction::parse(raw))
        .context("--direction must be 'given' or 'taken'")?;
    let include_paid = matches.get_flag("all");
    let as_json = matches.get_flag("json");

    let Some(user) = store::find_user(conn, telegram_id)? else {
        println!("No records for user {telegram_id}");
        return Ok(());
    };
    let debts = store::debts_by_direction(conn, user.id, direction, include_paid)?;
    if maybe_print_json(as_json, &debts)? {
        return Ok(());
    }
    if debts.is_empty() {
        println!("No debts found");
        return Ok(());
    }
    let mut table = pretty_table(&["ID", "Person", "Phone", "Amount", "Due", "Status"]);
    for debt in &debts {
        table.add_row(vec![
            debt.id.to_string(),
            debt.person_name.clone(),
            debt.phone_number.clone().unwrap_or_default(),
            fmt_money(debt.amount, debt.currency),
            fmt_date(debt.due_date),
            status_line(debt, today()),
        ]);
    }
    println!("{table}");
    Ok(())
}
