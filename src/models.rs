// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Uzs,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Uzs => "UZS",
        }
    }

    pub fn parse(token: &str) -> Option<Currency> {
        match token {
            "USD" => Some(Currency::Usd),
            "UZS" => Some(Currency::Uzs),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        Currency::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown currency '{raw}'").into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Given,
    Taken,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Given => "given",
            Direction::Taken => "taken",
        }
    }

    pub fn parse(token: &str) -> Option<Direction> {
        match token {
            "given" => Some(Direction::Given),
            "taken" => Some(Direction::Taken),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Given => "💰 Bergan qarz",
            Direction::Taken => "💸 Olgan qarz",
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        Direction::parse(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown debt type '{raw}'").into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    OneTime,
    Installment,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::OneTime => "one_time",
            PaymentType::Installment => "installment",
        }
    }
}

impl ToSql for PaymentType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "one_time" => Ok(PaymentType::OneTime),
            "installment" => Ok(PaymentType::Installment),
            other => Err(FromSqlError::Other(format!("unknown payment type '{other}'").into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPlan {
    OneTime,
    Installment { months: u32 },
}

impl PaymentPlan {
    pub fn kind(&self) -> PaymentType {
        match self {
            PaymentPlan::OneTime => PaymentType::OneTime,
            PaymentPlan::Installment { .. } => PaymentType::Installment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Home,
    Clothes,
    Health,
    Education,
    Entertainment,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Home => "home",
            ExpenseCategory::Clothes => "clothes",
            ExpenseCategory::Health => "health",
            ExpenseCategory::Education => "education",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::Other => "other",
        }
    }

    // Unknown tokens collapse to Other so stale buttons never fail.
    pub fn from_token(token: &str) -> ExpenseCategory {
        match token {
            "food" => ExpenseCategory::Food,
            "transport" => ExpenseCategory::Transport,
            "home" => ExpenseCategory::Home,
            "clothes" => ExpenseCategory::Clothes,
            "health" => ExpenseCategory::Health,
            "education" => ExpenseCategory::Education,
            "entertainment" => ExpenseCategory::Entertainment,
            _ => ExpenseCategory::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "🍔 Oziq-ovqat",
            ExpenseCategory::Transport => "🚕 Transport",
            ExpenseCategory::Home => "🏠 Uy-joy",
            ExpenseCategory::Clothes => "👕 Kiyim",
            ExpenseCategory::Health => "💊 Salomatlik",
            ExpenseCategory::Education => "📚 Ta'lim",
            ExpenseCategory::Entertainment => "🎮 O'yin-kulgi",
            ExpenseCategory::Other => "📦 Boshqa",
        }
    }
}

impl ToSql for ExpenseCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for ExpenseCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(ExpenseCategory::from_token(value.as_str()?))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub full_name: String,
    pub username: Option<String>,
}

// Transport-side identity, before the row upsert assigns an internal id.
#[derive(Debug, Clone)]
pub struct UserRef {
    pub telegram_id: i64,
    pub full_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Debt {
    pub id: i64,
    pub user_id: i64,
    pub person_name: String,
    pub phone_number: Option<String>,
    pub amount: Decimal,
    pub currency: Currency,
    pub direction: Direction,
    pub payment_type: PaymentType,
    pub given_date: NaiveDate,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub category: ExpenseCategory,
    pub expense_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Installment {
    pub id: i64,
    pub debt_id: i64,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub id: i64,
    pub debt_id: i64,
    pub remind_date: NaiveDate,
    pub is_sent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    Name(String),
    Phone(Option<String>),
    Amount(Decimal),
    DueDate(NaiveDate),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub given_active: HashMap<Currency, Decimal>,
    pub given_count: i64,
    pub taken_active: HashMap<Currency, Decimal>,
    pub taken_count: i64,
    pub today_spent: HashMap<Currency, Decimal>,
    pub month_spent: HashMap<Currency, Decimal>,
}
