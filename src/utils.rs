// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{Currency, Debt, Statistics};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("not a positive amount: '{0}'")]
    Amount(String),
    #[error("unrecognized date: '{0}'")]
    Date(String),
}

static NON_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").unwrap());

const UZS_MARKERS: [&str; 4] = ["UZS", "SO'M", "SOM", "SUM"];

// "100 USD" / "$100" -> USD, "500000 so'm" / bare digits -> UZS.
// Anything that is not a digit or a dot is stripped before the numeric parse,
// so "1,5" reads as 15 and a stray minus sign disappears.
pub fn parse_amount(text: &str) -> Result<(Decimal, Currency), ParseError> {
    let original = text.trim();
    let upper = original.to_uppercase();
    let (candidate, currency) = if upper.contains('$') || upper.contains("USD") {
        (upper.replace("USD", ""), Currency::Usd)
    } else if UZS_MARKERS.iter().any(|m| upper.contains(m)) {
        let mut stripped = upper.clone();
        for marker in UZS_MARKERS {
            stripped = stripped.replace(marker, "");
        }
        (stripped, Currency::Uzs)
    } else {
        (upper, Currency::Uzs)
    };
    let digits = NON_AMOUNT.replace_all(&candidate, "");
    let value: Decimal = digits
        .parse()
        .map_err(|_| ParseError::Amount(original.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(ParseError::Amount(original.to_string()));
    }
    Ok((value, currency))
}

const DATE_FORMATS: [&str; 5] = ["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d.%m.%y"];

pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = text.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    Err(ParseError::Date(trimmed.to_string()))
}

// Keeps digits plus a leading '+'; anything shorter than 9 digits is noise.
pub fn clean_phone(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 9 {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

pub fn strip_phone(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

pub fn fmt_money(amount: Decimal, currency: Currency) -> String {
    match currency {
        Currency::Uzs => {
            format!("{} so'm", with_thousands(&amount.round_dp(0).to_string()))
        }
        Currency::Usd => {
            let rendered = format!("{:.2}", amount.round_dp(2));
            match rendered.split_once('.') {
                Some((int_part, frac)) => format!("${}.{}", with_thousands(int_part), frac),
                None => format!("${}", with_thousands(&rendered)),
            }
        }
    }
}

fn with_thousands(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        out.push(*c);
        let rest = chars.len() - 1 - i;
        if rest > 0 && rest % 3 == 0 && c.is_ascii_digit() {
            out.push(',');
        }
    }
    out
}

pub fn fmt_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn days_until(target: NaiveDate, today: NaiveDate) -> i64 {
    (target - today).num_days()
}

// Equal monthly slices, rounded to 2 dp; the schedule walks forward one
// calendar month at a time with the day clamped to 28 so every month works.
pub fn installment_schedule(
    total: Decimal,
    months: u32,
    start: NaiveDate,
) -> Result<Vec<(Decimal, NaiveDate)>> {
    if months == 0 {
        bail!("installment plan needs at least one month");
    }
    let per_month = (total / Decimal::from(months)).round_dp(2);
    let mut schedule = Vec::with_capacity(months as usize);
    let mut current = start;
    for n in 0..months {
        if n > 0 {
            let (mut year, mut month) = (current.year(), current.month() + 1);
            if month > 12 {
                month = 1;
                year += 1;
            }
            let day = current.day().min(28);
            current = NaiveDate::from_ymd_opt(year, month, day)
                .with_context(|| format!("invalid schedule date {year}-{month}-{day}"))?;
        }
        schedule.push((per_month, current));
    }
    Ok(schedule)
}

pub const REMINDER_OFFSETS: [i64; 3] = [3, 1, 0];

// Dates already in the past are dropped so short-dated debts get fewer pings.
pub fn reminder_dates(due: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    REMINDER_OFFSETS
        .iter()
        .map(|days| due - Duration::days(*days))
        .filter(|date| *date >= today)
        .collect()
}

pub fn status_line(debt: &Debt, today: NaiveDate) -> String {
    if debt.is_paid {
        return "✅ To'langan".to_string();
    }
    let days = days_until(debt.due_date, today);
    if days < 0 {
        format!("🔴 Muddati {} kun o'tib ketgan", -days)
    } else if days == 0 {
        "⚠️ Bugun oxirgi kun!".to_string()
    } else {
        format!("📆 {days} kun qoldi")
    }
}

pub fn debt_details_text(debt: &Debt, today: NaiveDate) -> String {
    let phone = debt.phone_number.as_deref().unwrap_or("Kiritilmagan");
    let mut text = format!(
        "{}\n\n👤 {}\n📱 Telefon: {}\n💵 Summa: {}\n📅 Berilgan: {}\n⏰ Muddat: {}\n{}",
        debt.direction.label(),
        debt.person_name,
        phone,
        fmt_money(debt.amount, debt.currency),
        fmt_date(debt.given_date),
        fmt_date(debt.due_date),
        status_line(debt, today),
    );
    if let Some(notes) = &debt.notes {
        text.push_str(&format!("\n📝 Izoh: {notes}"));
    }
    text
}

pub fn statistics_text(stats: &Statistics) -> String {
    let mut text = String::from("📊 UMUMIY STATISTIKA\n\n");
    text.push_str("💰 Bergan qarzlarim:\n");
    push_money_lines(&mut text, &stats.given_active);
    if !stats.given_active.is_empty() {
        text.push_str(&format!("   📌 Jami: {} ta\n", stats.given_count));
    }
    text.push_str("\n💸 Olgan qarzlarim:\n");
    push_money_lines(&mut text, &stats.taken_active);
    if !stats.taken_active.is_empty() {
        text.push_str(&format!("   📌 Jami: {} ta\n", stats.taken_count));
    }
    text.push_str("\n📝 Bugungi harajatlar:\n");
    push_money_lines(&mut text, &stats.today_spent);
    text.push_str("\n🗓 Oylik harajatlar:\n");
    push_money_lines(&mut text, &stats.month_spent);
    text
}

fn push_money_lines(out: &mut String, sums: &HashMap<Currency, Decimal>) {
    if sums.is_empty() {
        out.push_str("   Hozircha yo'q\n");
        return;
    }
    let mut entries: Vec<_> = sums.iter().collect();
    entries.sort_by_key(|(currency, _)| currency.as_str());
    for (currency, amount) in entries {
        out.push_str(&format!("   • {}\n", fmt_money(*amount, *currency)));
    }
}

pub fn pretty_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
    table
}

pub fn maybe_print_json<T: Serialize>(as_json: bool, value: &T) -> Result<bool> {
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("serialize to JSON")?
        );
        return Ok(true);
    }
    Ok(false)
}
