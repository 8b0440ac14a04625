// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use clap::ArgMatches;
use rusqlite::Connection;
use std::io::{self, BufRead, Write};

use crate::engine::Engine;
use crate::flows::edit::EditField;
use crate::flows::{Choice, Reply};
use crate::models::{Direction, UserRef};
use crate::utils::{debt_details_text, fmt_date, fmt_money, statistics_text, status_line, today};

const MENU: &str = "\
Asosiy menyu:
  1) 💰 Qarz berdim
  2) 💸 Qarz oldim
  3) 📝 Kunlik harajat
  4) 📊 Statistika
  5) 📋 Mening qarzlarim

Qarz amallari: debt <id>, repay <id>, paid <id>, delete <id>,
               edit <id> <name|phone|amount|due_date>, payinst <id>, delexp <id>
Buyruqlar: /cancel, /start, /exit";

pub fn handle(conn: Connection, matches: &ArgMatches) -> Result<()> {
    let engine = Engine::new(conn);
    let who = UserRef {
        telegram_id: matches.get_one::<i64>("user").copied().unwrap_or(1),
        full_name: matches
            .get_one::<String>("name")
            .cloned()
            .unwrap_or_else(|| "Konsol".to_string()),
        username: matches.get_one::<String>("username").cloned(),
    };

    println!("🤖 Hisobchi\n\n{MENU}\n");
    let stdin = io::stdin();
    let mut pending: Vec<Choice> = Vec::new();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().context("flush prompt")?;
        line.clear();
        if stdin.lock().read_line(&mut line).context("read input")? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "/exit" | "/quit" => break,
            "/start" => {
                engine.cancel(&who)?;
                pending.clear();
                println!("{MENU}\n");
                continue;
            }
            "/cancel" => {
                let reply = engine.cancel(&who)?;
                pending.clear();
                println!("{}\n\n{MENU}\n", reply.text);
                continue;
            }
            _ => {}
        }

        // A bare number picks from the last keyboard when one is showing.
        if !pending.is_empty() {
            if let Ok(n) = input.parse::<usize>() {
                if (1..=pending.len()).contains(&n) {
                    let token = pending[n - 1].token.clone();
                    let reply = engine.handle_select(&who, &token)?;
                    render(&reply, &mut pending);
                    continue;
                }
            }
        }

        if engine.has_session(&who)? {
            let reply = engine.handle_text(&who, input)?;
            render(&reply, &mut pending);
            continue;
        }

        menu_action(&engine, &who, input, &mut pending)?;
    }
    Ok(())
}

fn menu_action(
    engine: &Engine,
    who: &UserRef,
    input: &str,
    pending: &mut Vec<Choice>,
) -> Result<()> {
    let mut words = input.split_whitespace();
    let head = words.next().unwrap_or_default();
    match head {
        "1" => {
            let reply = engine.start_debt_entry(who, Direction::Given)?;
            render(&reply, pending);
        }
        "2" => {
            let reply = engine.start_debt_entry(who, Direction::Taken)?;
            render(&reply, pending);
        }
        "3" => {
            let reply = engine.start_expense_entry(who)?;
            render(&reply, pending);
        }
        "4" => {
            let stats = engine.statistics(who)?;
            println!("{}", statistics_text(&stats));
            let items = engine.today_expenses(who)?;
            if !items.is_empty() {
                println!("Bugungi ro'yxat:");
                for item in items {
                    println!(
                        "  [{}] {} — {} ({})",
                        item.id,
                        item.description,
                        fmt_money(item.amount, item.currency),
                        item.category.label(),
                    );
                }
                println!();
            }
        }
        "5" => {
            list_debts(engine, who)?;
        }
        "debt" => match parse_id(words.next()) {
            Some(id) => show_debt(engine, id)?,
            None => println!("Foydalanish: debt <id>\n"),
        },
        "repay" => match parse_id(words.next()) {
            Some(id) => {
                let reply = engine.start_repayment(who, id)?;
                render(&reply, pending);
            }
            None => println!("Foydalanish: repay <id>\n"),
        },
        "paid" => match parse_id(words.next()) {
            Some(id) => {
                let reply = engine.mark_paid(id)?;
                render(&reply, pending);
            }
            None => println!("Foydalanish: paid <id>\n"),
        },
        "edit" => {
            let id = parse_id(words.next());
            let field = words.next().and_then(EditField::parse);
            match (id, field) {
                (Some(id), Some(field)) => {
                    let reply = engine.start_field_edit(who, id, field)?;
                    render(&reply, pending);
                }
                _ => println!("Foydalanish: edit <id> <name|phone|amount|due_date>\n"),
            }
        }
        "delete" => match parse_id(words.next()) {
            Some(id) => {
                let reply = engine.delete_debt(id)?;
                render(&reply, pending);
            }
            None => println!("Foydalanish: delete <id>\n"),
        },
        "payinst" => match parse_id(words.next()) {
            Some(id) => {
                let reply = engine.mark_installment_paid(id)?;
                render(&reply, pending);
            }
            None => println!("Foydalanish: payinst <id>\n"),
        },
        "delexp" => match parse_id(words.next()) {
            Some(id) => {
                let reply = engine.delete_expense(id)?;
                render(&reply, pending);
            }
            None => println!("Foydalanish: delexp <id>\n"),
        },
        _ => println!("🤔 Tushunmadim.\n\n{MENU}\n"),
    }
    Ok(())
}

fn list_debts(engine: &Engine, who: &UserRef) -> Result<()> {
    for direction in [Direction::Given, Direction::Taken] {
        let debts = engine.debts_overview(who, direction)?;
        println!("{}:", direction.label());
        if debts.is_empty() {
            println!("  Hozircha yo'q");
        }
        for debt in debts {
            println!(
                "  [{}] {} — {} — {}",
                debt.id,
                debt.person_name,
                fmt_money(debt.amount, debt.currency),
                status_line(&debt, today()),
            );
        }
        println!();
    }
    Ok(())
}

fn show_debt(engine: &Engine, debt_id: i64) -> Result<()> {
    match engine.debt_details(debt_id)? {
        None => println!("❌ Qarz topilmadi.\n"),
        Some((debt, installments)) => {
            println!("{}\n", debt_details_text(&debt, today()));
            if !installments.is_empty() {
                println!("Bo'lib to'lash jadvali:");
                for inst in installments {
                    let mark = if inst.is_paid { "✅" } else { "⬜" };
                    println!(
                        "  {mark} [{}] {} — {}",
                        inst.id,
                        fmt_date(inst.due_date),
                        fmt_money(inst.amount, debt.currency),
                    );
                }
                println!();
            }
        }
    }
    Ok(())
}

fn parse_id(word: Option<&str>) -> Option<i64> {
    word.and_then(|w| w.parse::<i64>().ok())
}

fn render(reply: &Reply, pending: &mut Vec<Choice>) {
    println!("{}", reply.text);
    if reply.choices.is_empty() {
        pending.clear();
    } else {
        for (i, choice) in reply.choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice.label);
        }
        *pending = reply.choices.clone();
    }
    println!();
}
