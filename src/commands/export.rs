// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use rusqlite::Connection;
use std::fs::File;

use crate::models::{Debt, Expense};
use crate::store;

pub fn handle(conn: &Connection, matches: &ArgMatches) -> Result<()> {
    let telegram_id = *matches.get_one::<i64>("user").context("--user is required")?;
    let what = matches.get_one::<String>("what").map(String::as_str).unwrap_or("debts");
    let format = matches.get_one::<String>("format").map(String::as_str).unwrap_or("csv");
    let out = matches.get_one::<String>("out").context("--out is required")?;
    let month = matches.get_one::<String>("month");

    let Some(user) = store::find_user(conn, telegram_id)? else {
        println!("No records for user {telegram_id}");
        return Ok(());
    };

    let rows = match what {
        "debts" => {
            let debts = store::all_debts(conn, user.id)?;
            let count = debts.len();
            match format {
                "csv" => write_debts_csv(out, &debts)?,
                "json" => write_json(out, &debts)?,
                other => bail!("unknown format '{other}', expected csv or json"),
            }
            count
        }
        "expenses" => {
            let expenses = match month {
                Some(month) => store::expenses_in_month(conn, user.id, month)?,
                None => store::all_expenses(conn, user.id)?,
            };
            let count = expenses.len();
            match format {
                "csv" => write_expenses_csv(out, &expenses)?,
                "json" => write_json(out, &expenses)?,
                other => bail!("unknown format '{other}', expected csv or json"),
            }
            count
        }
        other => bail!("unknown export target '{other}', expected debts or expenses"),
    };
    println!("Wrote {rows} row(s) to {out}");
    Ok(())
}

fn write_debts_csv(path: &str, debts: &[Debt]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("create {path}"))?;
    writer.write_record([
        "id",
        "person_name",
        "phone_number",
        "amount",
        "currency",
        "direction",
        "payment_type",
        "given_date",
        "due_date",
        "is_paid",
        "notes",
    ])?;
    for debt in debts {
        writer.write_record([
            debt.id.to_string(),
            debt.person_name.clone(),
            debt.phone_number.clone().unwrap_or_default(),
            debt.amount.to_string(),
            debt.currency.as_str().to_string(),
            debt.direction.as_str().to_string(),
            debt.payment_type.as_str().to_string(),
            debt.given_date.to_string(),
            debt.due_date.to_string(),
            (debt.is_paid as u8).to_string(),
            debt.notes.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush().context("flush CSV")?;
    Ok(())
}

fn write_expenses_csv(path: &str, expenses: &[Expense]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("create {path}"))?;
    writer.write_record(["id", "description", "amount", "currency", "category", "expense_date"])?;
    for expense in expenses {
        writer.write_record([
            expense.id.to_string(),
            expense.description.clone(),
            expense.amount.to_string(),
            expense.currency.as_str().to_string(),
            expense.category.as_str().to_string(),
            expense.expense_date.to_string(),
        ])?;
    }
    writer.flush().context("flush CSV")?;
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &str, rows: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {path}"))?;
    serde_json::to_writer_pretty(file, rows).context("write JSON")?;
    Ok(())
}
