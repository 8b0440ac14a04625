// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com", "alphavelocity", "hisobchi"));

pub fn db_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("cannot resolve platform data directory")?;
    fs::create_dir_all(dirs.data_dir())
        .with_context(|| format!("create data dir {}", dirs.data_dir().display()))?;
    Ok(dirs.data_dir().join("hisobchi.db"))
}

pub fn resolve_path(override_path: Option<&str>) -> Result<PathBuf> {
    match override_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => db_path(),
    }
}

pub fn open_or_init(override_path: Option<&str>) -> Result<Connection> {
    let path = resolve_path(override_path)?;
    let conn = Connection::open(&path)
        .with_context(|| format!("open database at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            telegram_id INTEGER NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            username TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS debts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            person_name TEXT NOT NULL,
            phone_number TEXT,
            amount TEXT NOT NULL,
            currency TEXT NOT NULL DEFAULT 'UZS',
            debt_type TEXT NOT NULL CHECK (debt_type IN ('given','taken')),
            payment_type TEXT NOT NULL DEFAULT 'one_time',
            given_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            is_paid INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_debts_user ON debts(user_id, is_paid);
        CREATE INDEX IF NOT EXISTS idx_debts_due ON debts(due_date, is_paid);

        CREATE TABLE IF NOT EXISTS installments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            debt_id INTEGER NOT NULL REFERENCES debts(id) ON DELETE CASCADE,
            amount TEXT NOT NULL,
            due_date TEXT NOT NULL,
            is_paid INTEGER NOT NULL DEFAULT 0,
            paid_date TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_installments_debt ON installments(debt_id);

        CREATE TABLE IF NOT EXISTS reminders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            debt_id INTEGER NOT NULL REFERENCES debts(id) ON DELETE CASCADE,
            remind_date TEXT NOT NULL,
            is_sent INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_reminders_date ON reminders(remind_date, is_sent);

        CREATE TABLE IF NOT EXISTS daily_expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            amount TEXT NOT NULL,
            currency TEXT NOT NULL DEFAULT 'UZS',
            category TEXT NOT NULL DEFAULT 'other',
            expense_date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON daily_expenses(user_id, expense_date);
        "#,
    )
    .context("initialize schema")?;
    Ok(())
}
