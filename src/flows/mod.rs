// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod debt_entry;
pub mod edit;
pub mod expense_entry;
pub mod repayment;

use debt_entry::{DebtDraft, DebtStep};
use expense_entry::{ExpenseDraft, ExpenseStep};

#[derive(Debug, Clone)]
pub enum FlowState {
    DebtEntry { step: DebtStep, draft: DebtDraft },
    ExpenseEntry { step: ExpenseStep, draft: ExpenseDraft },
    Repayment { debt_id: i64 },
    FieldEdit { debt_id: i64, field: edit::EditField },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Text(String),
    Select(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub token: String,
}

impl Choice {
    pub fn new(label: &str, token: &str) -> Choice {
        Choice { label: label.to_string(), token: token.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Reply {
        Reply { text: text.into(), choices: Vec::new() }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<Choice>) -> Reply {
        Reply { text: text.into(), choices }
    }
}

pub(crate) const USE_BUTTONS: &str = "❌ Tugmalardan birini tanlang!";
