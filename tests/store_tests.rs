// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use hisobchi::db;
use hisobchi::flows::debt_entry::DebtCommit;
use hisobchi::flows::expense_entry::ExpenseCommit;
use hisobchi::models::{
    Currency, Direction, EditValue, ExpenseCategory, PaymentPlan, UserRef,
};
use hisobchi::store;

fn mem() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    db::init_schema(&conn).expect("schema");
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn who(telegram_id: i64) -> UserRef {
    UserRef { telegram_id, full_name: "Test".to_string(), username: None }
}

fn commit(name: &str, amount: &str, currency: Currency, plan: PaymentPlan) -> DebtCommit {
    DebtCommit {
        direction: Direction::Given,
        person_name: name.to_string(),
        phone_number: None,
        amount: dec(amount),
        currency,
        plan,
        given_date: date(2030, 1, 1),
        due_date: date(2030, 2, 1),
    }
}

#[test]
fn user_upsert_is_idempotent() {
    let conn = mem();
    let first = store::get_or_create_user(&conn, &who(7)).expect("create");
    let second = store::get_or_create_user(&conn, &who(7)).expect("fetch");
    assert_eq!(first.id, second.id);
}

#[test]
fn user_profile_refreshes_on_change() {
    let conn = mem();
    let created = store::get_or_create_user(&conn, &who(7)).expect("create");

    let renamed = UserRef {
        telegram_id: 7,
        full_name: "Yangi Ism".to_string(),
        username: Some("yangi".to_string()),
    };
    let updated = store::get_or_create_user(&conn, &renamed).expect("update");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.full_name, "Yangi Ism");
    assert_eq!(updated.username.as_deref(), Some("yangi"));

    let fetched = store::find_user(&conn, 7).expect("query").expect("exists");
    assert_eq!(fetched.full_name, "Yangi Ism");
}

#[test]
fn one_time_commit_writes_no_installments() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let debt_id = store::commit_debt(
        &mut conn,
        user.id,
        &commit("Alisher", "100", Currency::Usd, PaymentPlan::OneTime),
        date(2030, 1, 1),
    )
    .expect("commit");

    let debt = store::get_debt(&conn, debt_id).expect("query").expect("exists");
    assert_eq!(debt.amount, dec("100"));
    assert!(store::installments_for(&conn, debt_id).expect("installments").is_empty());
}

#[test]
fn installment_commit_writes_the_schedule() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let debt_id = store::commit_debt(
        &mut conn,
        user.id,
        &commit("Karim", "1200", Currency::Usd, PaymentPlan::Installment { months: 3 }),
        date(2030, 1, 1),
    )
    .expect("commit");

    let installments = store::installments_for(&conn, debt_id).expect("installments");
    assert_eq!(installments.len(), 3);
    assert!(installments.iter().all(|i| i.amount == dec("400")));
    assert_eq!(installments[0].due_date, date(2030, 2, 1));
    assert_eq!(installments[1].due_date, date(2030, 3, 1));
    assert_eq!(installments[2].due_date, date(2030, 4, 1));
    assert!(installments.iter().all(|i| !i.is_paid && i.paid_date.is_none()));
}

#[test]
fn commit_writes_future_reminders_only() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");

    // Far-off due date: all three offsets are in the future.
    let debt_id = store::commit_debt(
        &mut conn,
        user.id,
        &commit("A", "100", Currency::Uzs, PaymentPlan::OneTime),
        date(2030, 1, 1),
    )
    .expect("commit");
    let reminders = store::reminders_for(&conn, debt_id).expect("reminders");
    let dates: Vec<NaiveDate> = reminders.iter().map(|r| r.remind_date).collect();
    assert_eq!(dates, vec![date(2030, 1, 29), date(2030, 1, 31), date(2030, 2, 1)]);
    assert!(reminders.iter().all(|r| !r.is_sent));

    // Due tomorrow: the 3-day offset already passed.
    let mut near = commit("B", "100", Currency::Uzs, PaymentPlan::OneTime);
    near.due_date = date(2030, 1, 2);
    let debt_id = store::commit_debt(&mut conn, user.id, &near, date(2030, 1, 1)).expect("commit");
    let dates: Vec<NaiveDate> = store::reminders_for(&conn, debt_id)
        .expect("reminders")
        .iter()
        .map(|r| r.remind_date)
        .collect();
    assert_eq!(dates, vec![date(2030, 1, 1), date(2030, 1, 2)]);
}

#[test]
fn delete_debt_cascades() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let debt_id = store::commit_debt(
        &mut conn,
        user.id,
        &commit("Karim", "1200", Currency::Usd, PaymentPlan::Installment { months: 3 }),
        date(2030, 1, 1),
    )
    .expect("commit");

    assert!(store::delete_debt(&conn, debt_id).expect("delete"));
    assert!(store::get_debt(&conn, debt_id).expect("query").is_none());
    assert!(store::installments_for(&conn, debt_id).expect("installments").is_empty());
    assert!(store::reminders_for(&conn, debt_id).expect("reminders").is_empty());

    assert!(!store::delete_debt(&conn, debt_id).expect("second delete"));
}

#[test]
fn update_debt_field_variants() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let debt_id = store::commit_debt(
        &mut conn,
        user.id,
        &commit("Alisher", "100", Currency::Usd, PaymentPlan::OneTime),
        date(2030, 1, 1),
    )
    .expect("commit");

    assert!(store::update_debt_field(&conn, debt_id, &EditValue::Name("Bobur".into()))
        .expect("name"));
    assert!(store::update_debt_field(
        &conn,
        debt_id,
        &EditValue::Phone(Some("+998901112233".into()))
    )
    .expect("phone"));
    assert!(store::update_debt_field(&conn, debt_id, &EditValue::Amount(dec("55"))).expect("amt"));
    assert!(store::update_debt_field(&conn, debt_id, &EditValue::DueDate(date(2031, 5, 5)))
        .expect("due"));

    let debt = store::get_debt(&conn, debt_id).expect("query").expect("exists");
    assert_eq!(debt.person_name, "Bobur");
    assert_eq!(debt.phone_number.as_deref(), Some("+998901112233"));
    assert_eq!(debt.amount, dec("55"));
    assert_eq!(debt.due_date, date(2031, 5, 5));

    assert!(!store::update_debt_field(&conn, 999, &EditValue::Name("X".into())).expect("missing"));
}

#[test]
fn apply_repayment_against_missing_debt() {
    let mut conn = mem();
    store::get_or_create_user(&conn, &who(1)).expect("user");
    match store::apply_repayment(&mut conn, 42, dec("10"), Currency::Usd).expect("apply") {
        store::RepayApplied::NotFound => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn previous_contacts_are_distinct_newest_first_capped() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    for i in 0..12 {
        let mut c = commit(&format!("Shaxs {i}"), "100", Currency::Uzs, PaymentPlan::OneTime);
        c.phone_number = Some(format!("+99890000000{i}"));
        store::commit_debt(&mut conn, user.id, &c, date(2030, 1, 1)).expect("commit");
    }
    // A repeat of the latest counterparty must not duplicate.
    let mut repeat = commit("Shaxs 11", "200", Currency::Uzs, PaymentPlan::OneTime);
    repeat.phone_number = Some("+9989000000011".to_string());
    store::commit_debt(&mut conn, user.id, &repeat, date(2030, 1, 1)).expect("commit");

    let contacts = store::previous_contacts(&conn, user.id).expect("contacts");
    assert_eq!(contacts.len(), 10);
    assert_eq!(contacts[0].0, "Shaxs 11");
    let names: Vec<&str> = contacts.iter().map(|(n, _)| n.as_str()).collect();
    let unique: std::collections::HashSet<&&str> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
}

#[test]
fn statistics_sums_per_currency_and_skips_paid() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let today = date(2030, 6, 15);

    store::commit_debt(
        &mut conn,
        user.id,
        &commit("A", "100", Currency::Usd, PaymentPlan::OneTime),
        today,
    )
    .expect("commit");
    store::commit_debt(
        &mut conn,
        user.id,
        &commit("B", "50", Currency::Usd, PaymentPlan::OneTime),
        today,
    )
    .expect("commit");
    store::commit_debt(
        &mut conn,
        user.id,
        &commit("C", "500000", Currency::Uzs, PaymentPlan::OneTime),
        today,
    )
    .expect("commit");
    let mut taken = commit("D", "75", Currency::Usd, PaymentPlan::OneTime);
    taken.direction = Direction::Taken;
    store::commit_debt(&mut conn, user.id, &taken, today).expect("commit");

    let settled = store::commit_debt(
        &mut conn,
        user.id,
        &commit("E", "999", Currency::Usd, PaymentPlan::OneTime),
        today,
    )
    .expect("commit");
    store::settle_debt(&mut conn, settled).expect("settle");

    let stats = store::statistics(&conn, user.id, today).expect("stats");
    assert_eq!(stats.given_active.get(&Currency::Usd), Some(&dec("150")));
    assert_eq!(stats.given_active.get(&Currency::Uzs), Some(&dec("500000")));
    assert_eq!(stats.given_count, 3);
    assert_eq!(stats.taken_active.get(&Currency::Usd), Some(&dec("75")));
    assert_eq!(stats.taken_count, 1);
}

#[test]
fn statistics_split_today_and_month_expenses() {
    let conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let today = date(2030, 6, 15);

    let lunch = ExpenseCommit {
        description: "Tushlik".to_string(),
        amount: dec("25000"),
        currency: Currency::Uzs,
        category: ExpenseCategory::Food,
    };
    store::add_expense(&conn, user.id, &lunch, today).expect("today expense");

    let taxi = ExpenseCommit {
        description: "Taksi".to_string(),
        amount: dec("30000"),
        currency: Currency::Uzs,
        category: ExpenseCategory::Transport,
    };
    store::add_expense(&conn, user.id, &taxi, date(2030, 6, 1)).expect("month expense");

    let old = ExpenseCommit {
        description: "Eski".to_string(),
        amount: dec("99999"),
        currency: Currency::Uzs,
        category: ExpenseCategory::Other,
    };
    store::add_expense(&conn, user.id, &old, date(2030, 5, 20)).expect("old expense");

    let stats = store::statistics(&conn, user.id, today).expect("stats");
    assert_eq!(stats.today_spent.get(&Currency::Uzs), Some(&dec("25000")));
    assert_eq!(stats.month_spent.get(&Currency::Uzs), Some(&dec("55000")));
}

#[test]
fn expense_queries_by_day_and_month() {
    let conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let spend = |desc: &str, day: NaiveDate| {
        let item = ExpenseCommit {
            description: desc.to_string(),
            amount: dec("1000"),
            currency: Currency::Uzs,
            category: ExpenseCategory::Other,
        };
        store::add_expense(&conn, user.id, &item, day).expect("expense")
    };
    spend("birinchi", date(2030, 5, 1));
    spend("ikkinchi", date(2030, 5, 20));
    let third = spend("uchinchi", date(2030, 6, 1));

    assert_eq!(store::expenses_on(&conn, user.id, date(2030, 5, 20)).expect("day").len(), 1);
    assert_eq!(store::expenses_in_month(&conn, user.id, "2030-05").expect("month").len(), 2);
    assert_eq!(store::all_expenses(&conn, user.id).expect("all").len(), 3);

    assert!(store::delete_expense(&conn, third).expect("delete"));
    assert_eq!(store::all_expenses(&conn, user.id).expect("all").len(), 2);
    assert!(!store::delete_expense(&conn, third).expect("second delete"));
}

#[test]
fn mark_installment_paid_sets_the_date() {
    let mut conn = mem();
    let user = store::get_or_create_user(&conn, &who(1)).expect("user");
    let debt_id = store::commit_debt(
        &mut conn,
        user.id,
        &commit("Karim", "600", Currency::Usd, PaymentPlan::Installment { months: 2 }),
        date(2030, 1, 1),
    )
    .expect("commit");

    let installments = store::installments_for(&conn, debt_id).expect("installments");
    let paid_on = date(2030, 2, 3);
    assert!(store::mark_installment_paid(&conn, installments[0].id, paid_on).expect("mark"));

    let refreshed = store::installments_for(&conn, debt_id).expect("installments");
    assert!(refreshed[0].is_paid);
    assert_eq!(refreshed[0].paid_date, Some(paid_on));
    assert!(!refreshed[1].is_paid);
}
