// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::flows::{Choice, Reply, UserInput, USE_BUTTONS};
use crate::models::{Currency, ExpenseCategory};
use crate::utils::{fmt_money, parse_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseStep {
    Description,
    Amount,
    Category,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone)]
pub struct ExpenseCommit {
    pub description: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub category: ExpenseCategory,
}

#[derive(Debug)]
pub enum ExpenseOutcome {
    Stay(Reply),
    Next { step: ExpenseStep, draft: ExpenseDraft, reply: Reply },
    Commit(ExpenseCommit),
}

const CATEGORY_CHOICES: [ExpenseCategory; 6] = [
    ExpenseCategory::Food,
    ExpenseCategory::Transport,
    ExpenseCategory::Home,
    ExpenseCategory::Clothes,
    ExpenseCategory::Health,
    ExpenseCategory::Other,
];

pub fn handle(step: ExpenseStep, draft: &ExpenseDraft, input: &UserInput) -> ExpenseOutcome {
    match step {
        ExpenseStep::Description => description(draft, input),
        ExpenseStep::Amount => amount(draft, input),
        ExpenseStep::Category => category(draft, input),
    }
}

fn description(draft: &ExpenseDraft, input: &UserInput) -> ExpenseOutcome {
    let UserInput::Text(text) = input else {
        return ExpenseOutcome::Stay(Reply::text("❌ Harajat tavsifini yozib yuboring!"));
    };
    let mut next = draft.clone();
    next.description = Some(text.trim().to_string());
    ExpenseOutcome::Next {
        step: ExpenseStep::Amount,
        draft: next,
        reply: Reply::text("💵 Summani kiriting:\nMasalan: 50000 yoki 10 USD"),
    }
}

fn amount(draft: &ExpenseDraft, input: &UserInput) -> ExpenseOutcome {
    let UserInput::Text(text) = input else {
        return ExpenseOutcome::Stay(Reply::text("❌ Summani yozib yuboring!"));
    };
    match parse_amount(text) {
        Ok((value, currency)) => {
            let mut next = draft.clone();
            next.amount = Some(value);
            next.currency = Some(currency);
            ExpenseOutcome::Next {
                step: ExpenseStep::Category,
                draft: next,
                reply: category_prompt(value, currency),
            }
        }
        Err(_) => ExpenseOutcome::Stay(Reply::text(
            "❌ Summani to'g'ri kiriting!\nMasalan: 50000 yoki 10 USD",
        )),
    }
}

// No confirmation step: picking a category is the commit.
fn category(draft: &ExpenseDraft, input: &UserInput) -> ExpenseOutcome {
    let UserInput::Select(token) = input else {
        return ExpenseOutcome::Stay(Reply::text(USE_BUTTONS));
    };
    let category = ExpenseCategory::from_token(token.strip_prefix("cat_").unwrap_or(token));
    match (&draft.description, draft.amount, draft.currency) {
        (Some(description), Some(amount), Some(currency)) => {
            ExpenseOutcome::Commit(ExpenseCommit {
                description: description.clone(),
                amount,
                currency,
                category,
            })
        }
        _ => ExpenseOutcome::Stay(Reply::text("❌ Xatolik yuz berdi.")),
    }
}

pub fn description_prompt() -> Reply {
    Reply::text("📝 Kunlik harajat\n\nNimaga pul sarfladingiz?")
}

fn category_prompt(amount: Decimal, currency: Currency) -> Reply {
    let choices: Vec<Choice> = CATEGORY_CHOICES
        .iter()
        .map(|c| Choice::new(c.label(), &format!("cat_{}", c.as_str())))
        .collect();
    Reply::with_choices(
        format!("💵 {}\n\n📂 Kategoriyani tanlang:", fmt_money(amount, currency)),
        choices,
    )
}
