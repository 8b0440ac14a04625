// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use clap::ArgMatches;
use rusqlite::Connection;
use tracing::info;

use crate::notify::{ConsoleNotifier, Notifier, TelegramNotifier};
use crate::reminders;
use crate::utils::{parse_date, today};

pub fn handle(conn: &Connection, matches: &ArgMatches) -> Result<()> {
    let date = sweep_date(matches)?;
    let notifier = notifier_from_env()?;
    let stats = reminders::run_due_sweep(conn, notifier.as_ref(), date)?;
    println!("Sent {} reminder(s), {} failed", stats.sent, stats.failed);
    Ok(())
}

pub fn handle_overdue(conn: &Connection, matches: &ArgMatches) -> Result<()> {
    let date = sweep_date(matches)?;
    let notifier = notifier_from_env()?;
    let stats = reminders::run_overdue_sweep(conn, notifier.as_ref(), date)?;
    println!("Sent {} overdue notice(s), {} failed", stats.sent, stats.failed);
    Ok(())
}

fn sweep_date(matches: &ArgMatches) -> Result<chrono::NaiveDate> {
    match matches.get_one::<String>("date") {
        Some(raw) => Ok(parse_date(raw)?),
        None => Ok(today()),
    }
}

fn notifier_from_env() -> Result<Box<dyn Notifier>> {
    match std::env::var("BOT_TOKEN") {
        Ok(token) if !token.is_empty() => {
            info!("sending through the Telegram API");
            Ok(Box::new(TelegramNotifier::new(token)?))
        }
        _ => {
            info!("BOT_TOKEN not set, printing to the console");
            Ok(Box::new(ConsoleNotifier))
        }
    }
}
