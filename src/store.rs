// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::flows::debt_entry::DebtCommit;
use crate::flows::expense_entry::ExpenseCommit;
use crate::models::{
    Currency, Debt, Direction, EditValue, Expense, Installment, PaymentPlan, Reminder, Statistics,
    User, UserRef,
};
use crate::utils::{installment_schedule, reminder_dates};

const DEBT_COLS: &str = "id, user_id, person_name, phone_number, amount, currency, debt_type, \
                         payment_type, given_date, due_date, is_paid, notes";

pub fn get_or_create_user(conn: &Connection, who: &UserRef) -> Result<User> {
    let existing = conn
        .query_row(
            "SELECT id, telegram_id, full_name, username FROM users WHERE telegram_id = ?1",
            params![who.telegram_id],
            user_from_row,
        )
        .optional()
        .context("look up user")?;
    if let Some(user) = existing {
        if user.full_name != who.full_name || user.username != who.username {
            conn.execute(
                "UPDATE users SET full_name = ?1, username = ?2 WHERE id = ?3",
                params![who.full_name, who.username, user.id],
            )
            .context("refresh user profile")?;
            return Ok(User {
                full_name: who.full_name.clone(),
                username: who.username.clone(),
                ..user
            });
        }
        return Ok(user);
    }
    conn.execute(
        "INSERT INTO users (telegram_id, full_name, username) VALUES (?1, ?2, ?3)",
        params![who.telegram_id, who.full_name, who.username],
    )
    .context("insert user")?;
    Ok(User {
        id: conn.last_insert_rowid(),
        telegram_id: who.telegram_id,
        full_name: who.full_name.clone(),
        username: who.username.clone(),
    })
}

pub fn find_user(conn: &Connection, telegram_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, telegram_id, full_name, username FROM users WHERE telegram_id = ?1",
        params![telegram_id],
        user_from_row,
    )
    .optional()
    .context("look up user")
}

// Debt plus its installment plan and reminders land in one transaction.
pub fn commit_debt(
    conn: &mut Connection,
    user_id: i64,
    commit: &DebtCommit,
    today: NaiveDate,
) -> Result<i64> {
    let tx = conn.transaction().context("begin debt transaction")?;
    tx.execute(
        "INSERT INTO debts (user_id, person_name, phone_number, amount, currency, debt_type, \
         payment_type, given_date, due_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user_id,
            commit.person_name,
            commit.phone_number,
            commit.amount.to_string(),
            commit.currency,
            commit.direction,
            commit.plan.kind(),
            commit.given_date,
            commit.due_date,
        ],
    )
    .context("insert debt")?;
    let debt_id = tx.last_insert_rowid();
    if let PaymentPlan::Installment { months } = commit.plan {
        for (amount, due) in installment_schedule(commit.amount, months, commit.due_date)? {
            tx.execute(
                "INSERT INTO installments (debt_id, amount, due_date) VALUES (?1, ?2, ?3)",
                params![debt_id, amount.to_string(), due],
            )
            .context("insert installment")?;
        }
    }
    for date in reminder_dates(commit.due_date, today) {
        tx.execute(
            "INSERT INTO reminders (debt_id, remind_date) VALUES (?1, ?2)",
            params![debt_id, date],
        )
        .context("insert reminder")?;
    }
    tx.commit().context("commit debt transaction")?;
    Ok(debt_id)
}

pub fn get_debt(conn: &Connection, debt_id: i64) -> Result<Option<Debt>> {
    conn.query_row(
        &format!("SELECT {DEBT_COLS} FROM debts WHERE id = ?1"),
        params![debt_id],
        debt_from_row,
    )
    .optional()
    .context("look up debt")
}

pub fn debts_by_direction(
    conn: &Connection,
    user_id: i64,
    direction: Direction,
    include_paid: bool,
) -> Result<Vec<Debt>> {
    let sql = if include_paid {
        format!(
            "SELECT {DEBT_COLS} FROM debts WHERE user_id = ?1 AND debt_type = ?2 \
             ORDER BY is_paid, due_date"
        )
    } else {
        format!(
            "SELECT {DEBT_COLS} FROM debts WHERE user_id = ?1 AND debt_type = ?2 \
             AND is_paid = 0 ORDER BY due_date"
        )
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, direction], debt_from_row)?;
    let mut debts = Vec::new();
    for row in rows {
        debts.push(row.context("read debt row")?);
    }
    Ok(debts)
}

pub fn all_debts(conn: &Connection, user_id: i64) -> Result<Vec<Debt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEBT_COLS} FROM debts WHERE user_id = ?1 ORDER BY created_at, id"
    ))?;
    let rows = stmt.query_map(params![user_id], debt_from_row)?;
    let mut debts = Vec::new();
    for row in rows {
        debts.push(row.context("read debt row")?);
    }
    Ok(debts)
}

// Newest-first distinct counterparties, capped for keyboard size.
pub fn previous_contacts(conn: &Connection, user_id: i64) -> Result<Vec<(String, Option<String>)>> {
    let mut stmt = conn.prepare(
        "SELECT person_name, phone_number FROM debts WHERE user_id = ?1 \
         GROUP BY person_name, phone_number ORDER BY MAX(created_at) DESC, MAX(id) DESC LIMIT 10",
    )?;
    let rows = stmt.query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let mut contacts = Vec::new();
    for row in rows {
        contacts.push(row.context("read contact row")?);
    }
    Ok(contacts)
}

#[derive(Debug)]
pub enum RepayApplied {
    NotFound,
    CurrencyMismatch { expected: Currency },
    Settled(Debt),
    Partial(Debt),
}

// Re-reads the balance inside the transaction, so concurrent payments
// against the same debt subtract from fresh state instead of a stale read.
pub fn apply_repayment(
    conn: &mut Connection,
    debt_id: i64,
    paid: Decimal,
    currency: Currency,
) -> Result<RepayApplied> {
    let tx = conn.transaction().context("begin repayment transaction")?;
    let debt = match tx
        .query_row(
            &format!("SELECT {DEBT_COLS} FROM debts WHERE id = ?1"),
            params![debt_id],
            debt_from_row,
        )
        .optional()
        .context("look up debt")?
    {
        Some(debt) => debt,
        None => return Ok(RepayApplied::NotFound),
    };
    if debt.is_paid {
        return Ok(RepayApplied::Settled(debt));
    }
    if currency != debt.currency {
        return Ok(RepayApplied::CurrencyMismatch { expected: debt.currency });
    }
    let remaining = debt.amount - paid;
    if remaining <= Decimal::ZERO {
        tx.execute("UPDATE debts SET is_paid = 1 WHERE id = ?1", params![debt_id])
            .context("settle debt")?;
        tx.commit().context("commit repayment")?;
        Ok(RepayApplied::Settled(Debt { is_paid: true, ..debt }))
    } else {
        tx.execute(
            "UPDATE debts SET amount = ?1 WHERE id = ?2",
            params![remaining.to_string(), debt_id],
        )
        .context("reduce debt")?;
        tx.commit().context("commit repayment")?;
        Ok(RepayApplied::Partial(Debt { amount: remaining, ..debt }))
    }
}

pub fn settle_debt(conn: &mut Connection, debt_id: i64) -> Result<Option<Debt>> {
    let tx = conn.transaction().context("begin settle transaction")?;
    let debt = match tx
        .query_row(
            &format!("SELECT {DEBT_COLS} FROM debts WHERE id = ?1"),
            params![debt_id],
            debt_from_row,
        )
        .optional()
        .context("look up debt")?
    {
        Some(debt) => debt,
        None => return Ok(None),
    };
    tx.execute("UPDATE debts SET is_paid = 1 WHERE id = ?1", params![debt_id])
        .context("settle debt")?;
    tx.commit().context("commit settle")?;
    Ok(Some(Debt { is_paid: true, ..debt }))
}

pub fn update_debt_field(conn: &Connection, debt_id: i64, value: &EditValue) -> Result<bool> {
    let changed = match value {
        EditValue::Name(name) => conn.execute(
            "UPDATE debts SET person_name = ?1 WHERE id = ?2",
            params![name, debt_id],
        ),
        EditValue::Phone(phone) => conn.execute(
            "UPDATE debts SET phone_number = ?1 WHERE id = ?2",
            params![phone, debt_id],
        ),
        EditValue::Amount(amount) => conn.execute(
            "UPDATE debts SET amount = ?1 WHERE id = ?2",
            params![amount.to_string(), debt_id],
        ),
        EditValue::DueDate(date) => conn.execute(
            "UPDATE debts SET due_date = ?1 WHERE id = ?2",
            params![date, debt_id],
        ),
    }
    .context("update debt field")?;
    Ok(changed > 0)
}

// Installments and reminders go with it via ON DELETE CASCADE.
pub fn delete_debt(conn: &Connection, debt_id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM debts WHERE id = ?1", params![debt_id])
        .context("delete debt")?;
    Ok(deleted > 0)
}

pub fn installments_for(conn: &Connection, debt_id: i64) -> Result<Vec<Installment>> {
    let mut stmt = conn.prepare(
        "SELECT id, debt_id, amount, due_date, is_paid, paid_date FROM installments \
         WHERE debt_id = ?1 ORDER BY due_date",
    )?;
    let rows = stmt.query_map(params![debt_id], installment_from_row)?;
    let mut installments = Vec::new();
    for row in rows {
        installments.push(row.context("read installment row")?);
    }
    Ok(installments)
}

pub fn mark_installment_paid(
    conn: &Connection,
    installment_id: i64,
    paid_on: NaiveDate,
) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE installments SET is_paid = 1, paid_date = ?1 WHERE id = ?2",
            params![paid_on, installment_id],
        )
        .context("mark installment paid")?;
    Ok(changed > 0)
}

pub fn add_expense(
    conn: &Connection,
    user_id: i64,
    commit: &ExpenseCommit,
    spent_on: NaiveDate,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO daily_expenses (user_id, description, amount, currency, category, expense_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            commit.description,
            commit.amount.to_string(),
            commit.currency,
            commit.category,
            spent_on,
        ],
    )
    .context("insert expense")?;
    Ok(conn.last_insert_rowid())
}

pub fn expenses_on(conn: &Connection, user_id: i64, date: NaiveDate) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, description, amount, currency, category, expense_date \
         FROM daily_expenses WHERE user_id = ?1 AND expense_date = ?2 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id, date], expense_from_row)?;
    let mut expenses = Vec::new();
    for row in rows {
        expenses.push(row.context("read expense row")?);
    }
    Ok(expenses)
}

pub fn expenses_in_month(conn: &Connection, user_id: i64, month: &str) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, description, amount, currency, category, expense_date \
         FROM daily_expenses WHERE user_id = ?1 AND strftime('%Y-%m', expense_date) = ?2 \
         ORDER BY expense_date, id",
    )?;
    let rows = stmt.query_map(params![user_id, month], expense_from_row)?;
    let mut expenses = Vec::new();
    for row in rows {
        expenses.push(row.context("read expense row")?);
    }
    Ok(expenses)
}

pub fn all_expenses(conn: &Connection, user_id: i64) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, description, amount, currency, category, expense_date \
         FROM daily_expenses WHERE user_id = ?1 ORDER BY expense_date, id",
    )?;
    let rows = stmt.query_map(params![user_id], expense_from_row)?;
    let mut expenses = Vec::new();
    for row in rows {
        expenses.push(row.context("read expense row")?);
    }
    Ok(expenses)
}

pub fn delete_expense(conn: &Connection, expense_id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM daily_expenses WHERE id = ?1", params![expense_id])
        .context("delete expense")?;
    Ok(deleted > 0)
}

// Sums stay per-currency; nothing here converts between UZS and USD.
pub fn statistics(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Statistics> {
    let month = today.format("%Y-%m").to_string();
    Ok(Statistics {
        given_active: debt_sums(conn, user_id, Direction::Given)?,
        given_count: unpaid_count(conn, user_id, Direction::Given)?,
        taken_active: debt_sums(conn, user_id, Direction::Taken)?,
        taken_count: unpaid_count(conn, user_id, Direction::Taken)?,
        today_spent: expense_sums(
            conn,
            "SELECT currency, amount FROM daily_expenses WHERE user_id = ?1 AND expense_date = ?2",
            params![user_id, today],
        )?,
        month_spent: expense_sums(
            conn,
            "SELECT currency, amount FROM daily_expenses WHERE user_id = ?1 \
             AND strftime('%Y-%m', expense_date) = ?2",
            params![user_id, month],
        )?,
    })
}

fn debt_sums(
    conn: &Connection,
    user_id: i64,
    direction: Direction,
) -> Result<HashMap<Currency, Decimal>> {
    let mut stmt = conn.prepare(
        "SELECT currency, amount FROM debts WHERE user_id = ?1 AND debt_type = ?2 AND is_paid = 0",
    )?;
    let mut rows = stmt.query(params![user_id, direction])?;
    let mut sums: HashMap<Currency, Decimal> = HashMap::new();
    while let Some(row) = rows.next()? {
        let currency: Currency = row.get(0)?;
        let amount = decimal_col(row, 1)?;
        *sums.entry(currency).or_insert(Decimal::ZERO) += amount;
    }
    Ok(sums)
}

fn unpaid_count(conn: &Connection, user_id: i64, direction: Direction) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM debts WHERE user_id = ?1 AND debt_type = ?2 AND is_paid = 0",
        params![user_id, direction],
        |row| row.get(0),
    )
    .context("count debts")
}

fn expense_sums(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<HashMap<Currency, Decimal>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(args)?;
    let mut sums: HashMap<Currency, Decimal> = HashMap::new();
    while let Some(row) = rows.next()? {
        let currency: Currency = row.get(0)?;
        let amount = decimal_col(row, 1)?;
        *sums.entry(currency).or_insert(Decimal::ZERO) += amount;
    }
    Ok(sums)
}

#[derive(Debug, Clone)]
pub struct DueReminder {
    pub reminder_id: i64,
    pub chat_id: i64,
    pub person_name: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub direction: Direction,
    pub due_date: NaiveDate,
}

pub fn pending_reminders(conn: &Connection, date: NaiveDate) -> Result<Vec<DueReminder>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, u.telegram_id, d.person_name, d.amount, d.currency, d.debt_type, d.due_date \
         FROM reminders r \
         JOIN debts d ON d.id = r.debt_id \
         JOIN users u ON u.id = d.user_id \
         WHERE r.remind_date = ?1 AND r.is_sent = 0 AND d.is_paid = 0 \
         ORDER BY r.id",
    )?;
    let rows = stmt.query_map(params![date], |row| {
        Ok(DueReminder {
            reminder_id: row.get(0)?,
            chat_id: row.get(1)?,
            person_name: row.get(2)?,
            amount: decimal_col(row, 3)?,
            currency: row.get(4)?,
            direction: row.get(5)?,
            due_date: row.get(6)?,
        })
    })?;
    let mut reminders = Vec::new();
    for row in rows {
        reminders.push(row.context("read reminder row")?);
    }
    Ok(reminders)
}

pub fn mark_reminder_sent(conn: &Connection, reminder_id: i64) -> Result<()> {
    conn.execute("UPDATE reminders SET is_sent = 1 WHERE id = ?1", params![reminder_id])
        .context("mark reminder sent")?;
    Ok(())
}

pub fn reminders_for(conn: &Connection, debt_id: i64) -> Result<Vec<Reminder>> {
    let mut stmt = conn.prepare(
        "SELECT id, debt_id, remind_date, is_sent FROM reminders WHERE debt_id = ?1 \
         ORDER BY remind_date",
    )?;
    let rows = stmt.query_map(params![debt_id], |row| {
        Ok(Reminder {
            id: row.get(0)?,
            debt_id: row.get(1)?,
            remind_date: row.get(2)?,
            is_sent: row.get(3)?,
        })
    })?;
    let mut reminders = Vec::new();
    for row in rows {
        reminders.push(row.context("read reminder row")?);
    }
    Ok(reminders)
}

#[derive(Debug, Clone)]
pub struct OverdueDebt {
    pub chat_id: i64,
    pub debt: Debt,
}

pub fn overdue_debts(conn: &Connection, today: NaiveDate) -> Result<Vec<OverdueDebt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT u.telegram_id, {} FROM debts d \
         JOIN users u ON u.id = d.user_id \
         WHERE d.due_date < ?1 AND d.is_paid = 0 \
         ORDER BY d.due_date, d.id",
        debt_cols_prefixed("d")
    ))?;
    let rows = stmt.query_map(params![today], |row| {
        Ok(OverdueDebt { chat_id: row.get(0)?, debt: debt_from_row_offset(row, 1)? })
    })?;
    let mut overdue = Vec::new();
    for row in rows {
        overdue.push(row.context("read overdue row")?);
    }
    Ok(overdue)
}

fn debt_cols_prefixed(alias: &str) -> String {
    DEBT_COLS
        .split(',')
        .map(|col| format!("{alias}.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        full_name: row.get(2)?,
        username: row.get(3)?,
    })
}

fn debt_from_row(row: &Row<'_>) -> rusqlite::Result<Debt> {
    debt_from_row_offset(row, 0)
}

fn debt_from_row_offset(row: &Row<'_>, at: usize) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: row.get(at)?,
        user_id: row.get(at + 1)?,
        person_name: row.get(at + 2)?,
        phone_number: row.get(at + 3)?,
        amount: decimal_col(row, at + 4)?,
        currency: row.get(at + 5)?,
        direction: row.get(at + 6)?,
        payment_type: row.get(at + 7)?,
        given_date: row.get(at + 8)?,
        due_date: row.get(at + 9)?,
        is_paid: row.get(at + 10)?,
        notes: row.get(at + 11)?,
    })
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        amount: decimal_col(row, 3)?,
        currency: row.get(4)?,
        category: row.get(5)?,
        expense_date: row.get(6)?,
    })
}

fn installment_from_row(row: &Row<'_>) -> rusqlite::Result<Installment> {
    Ok(Installment {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        amount: decimal_col(row, 2)?,
        due_date: row.get(3)?,
        is_paid: row.get(4)?,
        paid_date: row.get(5)?,
    })
}

fn decimal_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse::<Decimal>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    })
}
