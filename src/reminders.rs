// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{error, info};

use crate::models::Direction;
use crate::notify::Notifier;
use crate::store::{self, DueReminder, OverdueDebt};
use crate::utils::{days_until, fmt_date, fmt_money};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub sent: usize,
    pub failed: usize,
}

// One pass over today's unsent reminders. A failed send stays unsent and is
// retried on the next sweep; a sent one is marked immediately so a crash
// between sends never double-delivers the earlier ones.
pub fn run_due_sweep(
    conn: &Connection,
    notifier: &dyn Notifier,
    date: NaiveDate,
) -> Result<SweepStats> {
    let pending = store::pending_reminders(conn, date)?;
    let mut stats = SweepStats::default();
    for reminder in pending {
        let text = reminder_text(&reminder, date);
        match notifier.send(reminder.chat_id, &text) {
            Ok(()) => {
                store::mark_reminder_sent(conn, reminder.reminder_id)?;
                stats.sent += 1;
            }
            Err(err) => {
                error!(reminder = reminder.reminder_id, "send failed: {err:#}");
                stats.failed += 1;
            }
        }
    }
    info!(sent = stats.sent, failed = stats.failed, "reminder sweep finished");
    Ok(stats)
}

// Overdue nags are stateless: every sweep renotifies whatever is still unpaid.
pub fn run_overdue_sweep(
    conn: &Connection,
    notifier: &dyn Notifier,
    today: NaiveDate,
) -> Result<SweepStats> {
    let overdue = store::overdue_debts(conn, today)?;
    let mut stats = SweepStats::default();
    for item in overdue {
        let text = overdue_text(&item, today);
        match notifier.send(item.chat_id, &text) {
            Ok(()) => stats.sent += 1,
            Err(err) => {
                error!(debt = item.debt.id, "send failed: {err:#}");
                stats.failed += 1;
            }
        }
    }
    info!(sent = stats.sent, failed = stats.failed, "overdue sweep finished");
    Ok(stats)
}

fn reminder_text(reminder: &DueReminder, date: NaiveDate) -> String {
    let money = fmt_money(reminder.amount, reminder.currency);
    let deadline = match days_until(reminder.due_date, date) {
        0 => "Bugun oxirgi kun!".to_string(),
        days => format!("{days} kun qoldi ({}).", fmt_date(reminder.due_date)),
    };
    match reminder.direction {
        Direction::Given => format!(
            "🔔 Eslatma!\n\n👤 {} sizga {} qaytarishi kerak.\n⏰ {deadline}",
            reminder.person_name, money,
        ),
        Direction::Taken => format!(
            "🔔 Eslatma!\n\n💸 Siz {} ga {} qaytarishingiz kerak.\n⏰ {deadline}",
            reminder.person_name, money,
        ),
    }
}

fn overdue_text(item: &OverdueDebt, today: NaiveDate) -> String {
    let debt = &item.debt;
    let days = -days_until(debt.due_date, today);
    let money = fmt_money(debt.amount, debt.currency);
    match debt.direction {
        Direction::Given => format!(
            "🔴 Muddati o'tgan qarz!\n\n👤 {}\n💰 {money}\n⏰ {days} kun kechikdi",
            debt.person_name,
        ),
        Direction::Taken => format!(
            "🔴 Muddati o'tgan qarz!\n\n💸 Siz {} ga {money} qaytarishingiz kerak edi.\n⏰ {days} kun kechikdi",
            debt.person_name,
        ),
    }
}
