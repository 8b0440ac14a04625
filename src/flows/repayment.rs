// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::flows::{Reply, UserInput};
use crate::models::{Currency, Debt};
use crate::utils::{fmt_money, parse_amount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepayRequest {
    SettleAll,
    Pay { amount: Decimal, currency: Currency },
}

#[derive(Debug)]
pub enum RepayOutcome {
    Stay(Reply),
    Request(RepayRequest),
}

const SETTLE_TOKENS: [&str; 5] = ["hammasi", "hamma", "to'liq", "toliq", "all"];

// Currency agreement is checked at apply time, against the row as it then is.
pub fn handle(input: &UserInput) -> RepayOutcome {
    let UserInput::Text(text) = input else {
        return RepayOutcome::Stay(Reply::text("❌ Summani yozib yuboring!"));
    };
    let lowered = text.trim().to_lowercase();
    if SETTLE_TOKENS.contains(&lowered.as_str()) {
        return RepayOutcome::Request(RepayRequest::SettleAll);
    }
    match parse_amount(text) {
        Ok((amount, currency)) => RepayOutcome::Request(RepayRequest::Pay { amount, currency }),
        Err(_) => RepayOutcome::Stay(Reply::text(
            "❌ Summani to'g'ri kiriting!\nMasalan: 50000 yoki \"hammasi\"",
        )),
    }
}

pub fn prompt(debt: &Debt) -> Reply {
    Reply::text(format!(
        "💵 Qarzni so'ndirish\n\n👤 {}\n💰 Qolgan qarz: {}\n\nQancha to'landi?\nTo'liq yopish uchun \"hammasi\" deb yozing",
        debt.person_name,
        fmt_money(debt.amount, debt.currency),
    ))
}
