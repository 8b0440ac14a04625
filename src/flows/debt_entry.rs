// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::flows::{Choice, Reply, UserInput, USE_BUTTONS};
use crate::models::{Currency, Direction, PaymentPlan, PaymentType};
use crate::utils::{clean_phone, fmt_date, fmt_money, parse_amount, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtStep {
    SelectContact,
    Name,
    Phone,
    Amount,
    PaymentType,
    GivenDate,
    DueDate,
    Installments,
    Confirm,
}

#[derive(Debug, Clone)]
pub struct DebtDraft {
    pub direction: Direction,
    pub person_name: Option<String>,
    pub phone_number: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub payment: Option<PaymentType>,
    pub given_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub months: Option<u32>,
}

impl DebtDraft {
    pub fn new(direction: Direction) -> DebtDraft {
        DebtDraft {
            direction,
            person_name: None,
            phone_number: None,
            amount: None,
            currency: None,
            payment: None,
            given_date: None,
            due_date: None,
            months: None,
        }
    }

    pub fn into_commit(self) -> Option<DebtCommit> {
        let plan = match self.payment? {
            PaymentType::OneTime => PaymentPlan::OneTime,
            PaymentType::Installment => PaymentPlan::Installment { months: self.months? },
        };
        Some(DebtCommit {
            direction: self.direction,
            person_name: self.person_name?,
            phone_number: self.phone_number,
            amount: self.amount?,
            currency: self.currency?,
            plan,
            given_date: self.given_date?,
            due_date: self.due_date?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DebtCommit {
    pub direction: Direction,
    pub person_name: String,
    pub phone_number: Option<String>,
    pub amount: Decimal,
    pub currency: Currency,
    pub plan: PaymentPlan,
    pub given_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug)]
pub enum DebtOutcome {
    Stay(Reply),
    Next { step: DebtStep, draft: DebtDraft, reply: Reply },
    Commit(DebtCommit),
    Cancelled,
}

const PHONE_SKIP: [&str; 5] = ["yo'q", "yoq", "yo`q", "-", "0"];
const INSTALLMENT_CHOICES: [u32; 5] = [2, 3, 4, 6, 12];

pub fn handle(step: DebtStep, draft: &DebtDraft, input: &UserInput, today: NaiveDate) -> DebtOutcome {
    match step {
        DebtStep::SelectContact => select_contact(draft, input),
        DebtStep::Name => name(draft, input),
        DebtStep::Phone => phone(draft, input),
        DebtStep::Amount => amount(draft, input),
        DebtStep::PaymentType => payment_type(draft, input),
        DebtStep::GivenDate => given_date(draft, input, today),
        DebtStep::DueDate => due_date(draft, input),
        DebtStep::Installments => installments(draft, input),
        DebtStep::Confirm => confirm(draft, input),
    }
}

fn select_contact(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Select(token) = input else {
        return DebtOutcome::Stay(Reply::text(USE_BUTTONS));
    };
    if token == "contact_new" {
        return DebtOutcome::Next {
            step: DebtStep::Name,
            draft: draft.clone(),
            reply: name_prompt(draft.direction),
        };
    }
    let Some(packed) = token.strip_prefix("contact_") else {
        return DebtOutcome::Stay(Reply::text(USE_BUTTONS));
    };
    let (name, phone) = match packed.split_once('|') {
        Some((name, "")) => (name.to_string(), None),
        Some((name, phone)) => (name.to_string(), Some(phone.to_string())),
        None => (packed.to_string(), None),
    };
    let mut next = draft.clone();
    next.person_name = Some(name.clone());
    next.phone_number = phone;
    DebtOutcome::Next {
        step: DebtStep::Amount,
        draft: next,
        reply: amount_prompt(&name),
    }
}

fn name(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Text(text) = input else {
        return DebtOutcome::Stay(Reply::text("❌ Ismni yozib yuboring!"));
    };
    let name = text.trim();
    if name.chars().count() < 2 {
        return DebtOutcome::Stay(Reply::text("❌ Ism juda qisqa! Qaytadan kiriting:"));
    }
    let mut next = draft.clone();
    next.person_name = Some(name.to_string());
    DebtOutcome::Next {
        step: DebtStep::Phone,
        draft: next,
        reply: phone_prompt(name),
    }
}

fn phone(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Text(text) = input else {
        return DebtOutcome::Stay(Reply::text("❌ Telefon raqamini yozib yuboring!"));
    };
    let lowered = text.trim().to_lowercase();
    let mut next = draft.clone();
    if PHONE_SKIP.contains(&lowered.as_str()) {
        next.phone_number = None;
    } else {
        match clean_phone(text) {
            Some(cleaned) => next.phone_number = Some(cleaned),
            None => {
                return DebtOutcome::Stay(Reply::text(
                    "❌ Telefon raqami noto'g'ri!\nMasalan: +998901234567\nYoki \"yo'q\" deb yozing",
                ));
            }
        }
    }
    let name = next.person_name.clone().unwrap_or_default();
    DebtOutcome::Next {
        step: DebtStep::Amount,
        draft: next,
        reply: amount_prompt(&name),
    }
}

fn amount(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Text(text) = input else {
        return DebtOutcome::Stay(Reply::text("❌ Summani yozib yuboring!"));
    };
    match parse_amount(text) {
        Ok((value, currency)) => {
            let mut next = draft.clone();
            next.amount = Some(value);
            next.currency = Some(currency);
            DebtOutcome::Next {
                step: DebtStep::PaymentType,
                draft: next,
                reply: payment_type_prompt(value, currency),
            }
        }
        Err(_) => DebtOutcome::Stay(Reply::text(
            "❌ Summani to'g'ri kiriting!\nMasalan: 100 USD yoki 500000",
        )),
    }
}

fn payment_type(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Select(token) = input else {
        return DebtOutcome::Stay(Reply::text(USE_BUTTONS));
    };
    let payment = match token.as_str() {
        "payment_one_time" => PaymentType::OneTime,
        "payment_installment" => PaymentType::Installment,
        _ => return DebtOutcome::Stay(Reply::text(USE_BUTTONS)),
    };
    let mut next = draft.clone();
    next.payment = Some(payment);
    DebtOutcome::Next {
        step: DebtStep::GivenDate,
        draft: next,
        reply: given_date_prompt(),
    }
}

fn given_date(draft: &DebtDraft, input: &UserInput, today: NaiveDate) -> DebtOutcome {
    match input {
        UserInput::Select(token) if token == "date_today" => {
            let mut next = draft.clone();
            next.given_date = Some(today);
            DebtOutcome::Next {
                step: DebtStep::DueDate,
                draft: next,
                reply: due_date_prompt(today),
            }
        }
        UserInput::Select(token) if token == "date_custom" => DebtOutcome::Next {
            step: DebtStep::GivenDate,
            draft: draft.clone(),
            reply: Reply::text("✏️ Sanani kiriting:\nMasalan: 17.08.2026"),
        },
        UserInput::Select(_) => DebtOutcome::Stay(Reply::text(USE_BUTTONS)),
        UserInput::Text(text) => match parse_date(text) {
            Ok(date) => {
                let mut next = draft.clone();
                next.given_date = Some(date);
                DebtOutcome::Next {
                    step: DebtStep::DueDate,
                    draft: next,
                    reply: due_date_prompt(date),
                }
            }
            Err(_) => DebtOutcome::Stay(Reply::text(
                "❌ Sanani to'g'ri kiriting!\nMasalan: 25.12.2026",
            )),
        },
    }
}

fn due_date(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Text(text) = input else {
        return DebtOutcome::Stay(Reply::text("❌ Sanani yozib yuboring!"));
    };
    let date = match parse_date(text) {
        Ok(date) => date,
        Err(_) => {
            return DebtOutcome::Stay(Reply::text(
                "❌ Sanani to'g'ri kiriting!\nMasalan: 25.12.2026",
            ));
        }
    };
    let mut next = draft.clone();
    next.due_date = Some(date);
    if next.payment == Some(PaymentType::Installment) {
        DebtOutcome::Next {
            step: DebtStep::Installments,
            draft: next,
            reply: installments_prompt(),
        }
    } else {
        let reply = confirm_prompt(&next);
        DebtOutcome::Next { step: DebtStep::Confirm, draft: next, reply }
    }
}

fn installments(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let months = match input {
        UserInput::Select(token) => match token.strip_prefix("inst_").map(str::parse::<u32>) {
            Some(Ok(n)) if n >= 2 => n,
            _ => return DebtOutcome::Stay(Reply::text(USE_BUTTONS)),
        },
        UserInput::Text(text) => match text.trim().parse::<u32>() {
            Ok(n) if n >= 2 => n,
            _ => {
                return DebtOutcome::Stay(Reply::text(
                    "❌ Oylar sonini to'g'ri kiriting! Kamida 2 oy.",
                ));
            }
        },
    };
    let mut next = draft.clone();
    next.months = Some(months);
    let reply = confirm_prompt(&next);
    DebtOutcome::Next { step: DebtStep::Confirm, draft: next, reply }
}

fn confirm(draft: &DebtDraft, input: &UserInput) -> DebtOutcome {
    let UserInput::Select(token) = input else {
        return DebtOutcome::Stay(Reply::text(USE_BUTTONS));
    };
    match token.as_str() {
        "confirm_yes" => match draft.clone().into_commit() {
            Some(commit) => DebtOutcome::Commit(commit),
            None => DebtOutcome::Stay(Reply::text("❌ Xatolik yuz berdi.")),
        },
        "confirm_no" => DebtOutcome::Cancelled,
        _ => DebtOutcome::Stay(Reply::text(USE_BUTTONS)),
    }
}

pub fn contact_prompt(direction: Direction, contacts: &[(String, Option<String>)]) -> Reply {
    let header = match direction {
        Direction::Given => "💰 Qarz berdim\n\nKimga berdingiz? Avvalgi kontaktlardan tanlang:",
        Direction::Taken => "💸 Qarz oldim\n\nKimdan oldingiz? Avvalgi kontaktlardan tanlang:",
    };
    let mut choices: Vec<Choice> = contacts
        .iter()
        .map(|(name, phone)| {
            let label = match phone {
                Some(phone) => format!("👤 {name} ({phone})"),
                None => format!("👤 {name}"),
            };
            let token = format!("contact_{name}|{}", phone.as_deref().unwrap_or(""));
            Choice { label, token }
        })
        .collect();
    choices.push(Choice::new("➕ Yangi kontakt", "contact_new"));
    Reply::with_choices(header, choices)
}

pub fn name_prompt(direction: Direction) -> Reply {
    match direction {
        Direction::Given => Reply::text("💰 Qarz berdim\n\n👤 Qarz oluvchining ismini kiriting:"),
        Direction::Taken => Reply::text("💸 Qarz oldim\n\n👤 Qarz beruvchining ismini kiriting:"),
    }
}

fn phone_prompt(name: &str) -> Reply {
    Reply::text(format!(
        "👤 {name}\n\n📱 Telefon raqamini kiriting:\nMasalan: +998901234567\n\nO'tkazib yuborish uchun \"yo'q\" deb yozing"
    ))
}

fn amount_prompt(name: &str) -> Reply {
    Reply::text(format!(
        "👤 {name}\n\n💵 Summani kiriting:\nMasalan: 100 USD yoki 500000"
    ))
}

fn payment_type_prompt(amount: Decimal, currency: Currency) -> Reply {
    Reply::with_choices(
        format!("💵 {}\n\nTo'lov turini tanlang:", fmt_money(amount, currency)),
        vec![
            Choice::new("💵 Bir marta to'lash", "payment_one_time"),
            Choice::new("📅 Bo'lib to'lash", "payment_installment"),
        ],
    )
}

fn given_date_prompt() -> Reply {
    Reply::with_choices(
        "📅 Qarz berilgan sanani tanlang:".to_string(),
        vec![
            Choice::new("📅 Bugun", "date_today"),
            Choice::new("✏️ Boshqa sana", "date_custom"),
        ],
    )
}

fn due_date_prompt(given: NaiveDate) -> Reply {
    Reply::text(format!(
        "📅 Berilgan: {}\n\n⏰ Qaytarish muddatini kiriting:\nMasalan: 25.12.2026",
        fmt_date(given)
    ))
}

fn installments_prompt() -> Reply {
    let choices: Vec<Choice> = INSTALLMENT_CHOICES
        .iter()
        .map(|n| Choice::new(&format!("{n} oy"), &format!("inst_{n}")))
        .collect();
    Reply::with_choices(
        "📅 Necha oyga bo'lib to'lanadi?\nYoki oylar sonini yozib yuboring:".to_string(),
        choices,
    )
}

fn confirm_prompt(draft: &DebtDraft) -> Reply {
    let money = match (draft.amount, draft.currency) {
        (Some(amount), Some(currency)) => fmt_money(amount, currency),
        _ => "—".to_string(),
    };
    let phone = draft.phone_number.as_deref().unwrap_or("Kiritilmadi");
    let mut text = format!(
        "{}\n\n👤 {}\n📱 {}\n💵 {}\n📅 Berilgan: {}\n⏰ Muddat: {}",
        draft.direction.label(),
        draft.person_name.as_deref().unwrap_or("—"),
        phone,
        money,
        draft.given_date.map(fmt_date).unwrap_or_else(|| "—".to_string()),
        draft.due_date.map(fmt_date).unwrap_or_else(|| "—".to_string()),
    );
    if let Some(months) = draft.months {
        text.push_str(&format!("\n📅 Bo'lib to'lash: {months} oy"));
    }
    text.push_str("\n\nTasdiqlaysizmi?");
    Reply::with_choices(
        text,
        vec![
            Choice::new("✅ Tasdiqlash", "confirm_yes"),
            Choice::new("❌ Bekor qilish", "confirm_no"),
        ],
    )
}
