// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::flows::{Reply, UserInput};
use crate::models::EditValue;
use crate::utils::{parse_amount, parse_date, strip_phone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Name,
    Phone,
    Amount,
    DueDate,
}

impl EditField {
    pub fn parse(token: &str) -> Option<EditField> {
        match token {
            "name" => Some(EditField::Name),
            "phone" => Some(EditField::Phone),
            "amount" => Some(EditField::Amount),
            "due_date" => Some(EditField::DueDate),
            _ => None,
        }
    }

    pub fn prompt(&self) -> Reply {
        match self {
            EditField::Name => Reply::text("👤 Yangi ismni kiriting:"),
            EditField::Phone => {
                Reply::text("📱 Yangi telefon raqamini kiriting:\nO'chirish uchun \"yo'q\" deb yozing")
            }
            EditField::Amount => Reply::text("💵 Yangi summani kiriting:"),
            EditField::DueDate => Reply::text("⏰ Yangi muddatni kiriting (kun.oy.yil):"),
        }
    }
}

#[derive(Debug)]
pub enum EditOutcome {
    Stay(Reply),
    Apply(EditValue),
}

// Looser than the entry flow on purpose: the phone keeps no minimum length
// and the amount keeps the debt's stored currency.
const PHONE_CLEAR: [&str; 3] = ["yo'q", "yoq", "-"];

pub fn handle(field: EditField, input: &UserInput) -> EditOutcome {
    let UserInput::Text(text) = input else {
        return EditOutcome::Stay(Reply::text("❌ Yangi qiymatni yozib yuboring!"));
    };
    match field {
        EditField::Name => EditOutcome::Apply(EditValue::Name(text.trim().to_string())),
        EditField::Phone => {
            let lowered = text.trim().to_lowercase();
            if PHONE_CLEAR.contains(&lowered.as_str()) {
                EditOutcome::Apply(EditValue::Phone(None))
            } else {
                EditOutcome::Apply(EditValue::Phone(strip_phone(text)))
            }
        }
        EditField::Amount => match parse_amount(text) {
            Ok((amount, _)) => EditOutcome::Apply(EditValue::Amount(amount)),
            Err(_) => EditOutcome::Stay(Reply::text("❌ Summani to'g'ri kiriting!")),
        },
        EditField::DueDate => match parse_date(text) {
            Ok(date) => EditOutcome::Apply(EditValue::DueDate(date)),
            Err(_) => EditOutcome::Stay(Reply::text("❌ Sanani to'g'ri kiriting! (kun.oy.yil)")),
        },
    }
}
