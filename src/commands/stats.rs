// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;
use rusqlite::Connection;

use crate::store;
use crate::utils::{maybe_print_json, statistics_text, today};

pub fn handle(conn: &Connection, matches: &ArgMatches) -> Result<()> {
    let telegram_id = *matches.get_one::<i64>("user").context("--user is required")?;
    let as_json = matches.get_flag("json");
    let Some(user) = store::find_user(conn, telegram_id)? else {
        println!("No records for user {telegram_id}");
        return Ok(());
    };
    let stats = store::statistics(conn, user.id, today())?;
    if maybe_print_json(as_json, &stats)? {
        return Ok(());
    }
    println!("{}", statistics_text(&stats));
    Ok(())
}
