// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;

use hisobchi::db;
use hisobchi::engine::Engine;
use hisobchi::flows::expense_entry::ExpenseStep;
use hisobchi::flows::{FlowState, Reply};
use hisobchi::models::{Currency, ExpenseCategory, UserRef};

fn engine() -> Engine {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    db::init_schema(&conn).expect("schema");
    Engine::new(conn)
}

fn who() -> UserRef {
    UserRef { telegram_id: 55, full_name: "Test".to_string(), username: Some("tester".into()) }
}

fn text(engine: &Engine, who: &UserRef, input: &str) -> Reply {
    engine.handle_text(who, input).expect("handle text")
}

fn select(engine: &Engine, who: &UserRef, token: &str) -> Reply {
    engine.handle_select(who, token).expect("handle select")
}

fn step(engine: &Engine, who: &UserRef) -> ExpenseStep {
    match engine.current_state(who).expect("state") {
        Some(FlowState::ExpenseEntry { step, .. }) => step,
        other => panic!("not in an expense flow: {other:?}"),
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

#[test]
fn expense_commits_on_category_pick_without_confirmation() {
    let engine = engine();
    let who = who();

    let reply = engine.start_expense_entry(&who).expect("start");
    assert!(reply.text.contains("pul sarfladingiz"));

    let reply = text(&engine, &who, "Tushlik");
    assert!(reply.text.contains("Summani"));

    let reply = text(&engine, &who, "25000");
    assert_eq!(reply.choices.len(), 6);
    assert!(reply.choices.iter().any(|c| c.token == "cat_food"));

    let reply = select(&engine, &who, "cat_food");
    assert!(reply.text.contains("Harajat saqlandi"));
    assert!(!engine.has_session(&who).expect("session check"));

    let items = engine.today_expenses(&who).expect("today");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].description, "Tushlik");
    assert_eq!(items[0].amount, dec("25000"));
    assert_eq!(items[0].currency, Currency::Uzs);
    assert_eq!(items[0].category, ExpenseCategory::Food);
}

#[test]
fn usd_expense_keeps_its_currency() {
    let engine = engine();
    let who = who();
    engine.start_expense_entry(&who).expect("start");
    text(&engine, &who, "Obed");
    text(&engine, &who, "10 USD");
    select(&engine, &who, "cat_transport");

    let items = engine.today_expenses(&who).expect("today");
    assert_eq!(items[0].currency, Currency::Usd);
    assert_eq!(items[0].category, ExpenseCategory::Transport);
}

#[test]
fn bad_amount_keeps_the_step() {
    let engine = engine();
    let who = who();
    engine.start_expense_entry(&who).expect("start");
    text(&engine, &who, "Kofe");

    let reply = text(&engine, &who, "bepul");
    assert!(reply.text.contains("Summani to'g'ri"));
    assert_eq!(step(&engine, &who), ExpenseStep::Amount);

    text(&engine, &who, "15000");
    assert_eq!(step(&engine, &who), ExpenseStep::Category);
}

#[test]
fn unknown_category_token_falls_back_to_other() {
    let engine = engine();
    let who = who();
    engine.start_expense_entry(&who).expect("start");
    text(&engine, &who, "Sovg'a");
    text(&engine, &who, "80000");
    select(&engine, &who, "cat_gifts");

    let items = engine.today_expenses(&who).expect("today");
    assert_eq!(items[0].category, ExpenseCategory::Other);
}

#[test]
fn typed_text_at_category_step_is_rejected() {
    let engine = engine();
    let who = who();
    engine.start_expense_entry(&who).expect("start");
    text(&engine, &who, "Kitob");
    text(&engine, &who, "120000");

    let reply = text(&engine, &who, "kitoblar");
    assert!(reply.text.contains("Tugmalardan"));
    assert_eq!(step(&engine, &who), ExpenseStep::Category);

    select(&engine, &who, "cat_education");
    let items = engine.today_expenses(&who).expect("today");
    assert_eq!(items[0].category, ExpenseCategory::Education);
}

#[test]
fn empty_description_is_allowed() {
    let engine = engine();
    let who = who();
    engine.start_expense_entry(&who).expect("start");
    text(&engine, &who, "   ");
    assert_eq!(step(&engine, &who), ExpenseStep::Amount);
}
