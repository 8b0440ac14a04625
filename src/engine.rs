// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use crate::flows::debt_entry::{self, DebtDraft, DebtOutcome, DebtStep};
use crate::flows::edit::{self, EditField, EditOutcome};
use crate::flows::expense_entry::{self, ExpenseDraft, ExpenseOutcome, ExpenseStep};
use crate::flows::repayment::{self, RepayOutcome, RepayRequest};
use crate::flows::{FlowState, Reply, UserInput};
use crate::models::{Debt, Direction, Expense, Installment, PaymentPlan, Statistics, User, UserRef};
use crate::session::{SessionError, SessionStore};
use crate::store::{self, RepayApplied};
use crate::utils::{fmt_date, fmt_money, today};

const NOT_FOUND: &str = "❌ Qarz topilmadi.";
const CANCELLED: &str = "❌ Bekor qilindi.";
const LOST_SESSION: &str = "❌ Xatolik yuz berdi. Asosiy menyudan qaytadan boshlang.";

// One engine per process: flows and the database serialize behind it, so a
// transport may call in from as many threads as it likes.
pub struct Engine {
    conn: Mutex<Connection>,
    sessions: SessionStore,
}

impl Engine {
    pub fn new(conn: Connection) -> Engine {
        Engine { conn: Mutex::new(conn), sessions: SessionStore::new() }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, who: &UserRef) -> Result<User> {
        let conn = self.conn();
        store::get_or_create_user(&conn, who)
    }

    pub fn start_debt_entry(&self, who: &UserRef, direction: Direction) -> Result<Reply> {
        let (user, contacts) = {
            let conn = self.conn();
            let user = store::get_or_create_user(&conn, who)?;
            let contacts = store::previous_contacts(&conn, user.id)?;
            (user, contacts)
        };
        let draft = DebtDraft::new(direction);
        if contacts.is_empty() {
            self.sessions.begin(user.id, FlowState::DebtEntry { step: DebtStep::Name, draft });
            Ok(debt_entry::name_prompt(direction))
        } else {
            let reply = debt_entry::contact_prompt(direction, &contacts);
            self.sessions
                .begin(user.id, FlowState::DebtEntry { step: DebtStep::SelectContact, draft });
            Ok(reply)
        }
    }

    pub fn start_expense_entry(&self, who: &UserRef) -> Result<Reply> {
        let user = self.resolve(who)?;
        self.sessions.begin(
            user.id,
            FlowState::ExpenseEntry {
                step: ExpenseStep::Description,
                draft: ExpenseDraft::default(),
            },
        );
        Ok(expense_entry::description_prompt())
    }

    pub fn start_repayment(&self, who: &UserRef, debt_id: i64) -> Result<Reply> {
        let user = self.resolve(who)?;
        let debt = {
            let conn = self.conn();
            store::get_debt(&conn, debt_id)?
        };
        match debt {
            None => Ok(Reply::text(NOT_FOUND)),
            Some(debt) if debt.is_paid => Ok(Reply::text("✅ Bu qarz allaqachon yopilgan.")),
            Some(debt) => {
                self.sessions.begin(user.id, FlowState::Repayment { debt_id });
                Ok(repayment::prompt(&debt))
            }
        }
    }

    pub fn start_field_edit(&self, who: &UserRef, debt_id: i64, field: EditField) -> Result<Reply> {
        let user = self.resolve(who)?;
        let exists = {
            let conn = self.conn();
            store::get_debt(&conn, debt_id)?.is_some()
        };
        if !exists {
            return Ok(Reply::text(NOT_FOUND));
        }
        self.sessions.begin(user.id, FlowState::FieldEdit { debt_id, field });
        Ok(field.prompt())
    }

    pub fn cancel(&self, who: &UserRef) -> Result<Reply> {
        let user = self.resolve(who)?;
        self.sessions.end(user.id);
        Ok(Reply::text(CANCELLED))
    }

    pub fn has_session(&self, who: &UserRef) -> Result<bool> {
        let user = self.resolve(who)?;
        Ok(self.sessions.get(user.id).is_some())
    }

    pub fn current_state(&self, who: &UserRef) -> Result<Option<FlowState>> {
        let user = self.resolve(who)?;
        Ok(self.sessions.get(user.id).map(|s| s.state))
    }

    pub fn handle_text(&self, who: &UserRef, text: &str) -> Result<Reply> {
        self.dispatch(who, UserInput::Text(text.to_string()))
    }

    pub fn handle_select(&self, who: &UserRef, token: &str) -> Result<Reply> {
        self.dispatch(who, UserInput::Select(token.to_string()))
    }

    fn dispatch(&self, who: &UserRef, input: UserInput) -> Result<Reply> {
        let user = self.resolve(who)?;
        let Some(session) = self.sessions.get(user.id) else {
            warn!(user = user.id, "input without an active flow");
            return Ok(Reply::text("🤔 Tushunmadim. Asosiy menyudan tanlang."));
        };
        match session.state {
            FlowState::DebtEntry { step, draft } => {
                self.drive_debt(user.id, step, &draft, &input)
            }
            FlowState::ExpenseEntry { step, draft } => {
                self.drive_expense(user.id, step, &draft, &input)
            }
            FlowState::Repayment { debt_id } => self.drive_repayment(user.id, debt_id, &input),
            FlowState::FieldEdit { debt_id, field } => {
                self.drive_edit(user.id, debt_id, field, &input)
            }
        }
    }

    fn drive_debt(
        &self,
        user_id: i64,
        step: DebtStep,
        draft: &DebtDraft,
        input: &UserInput,
    ) -> Result<Reply> {
        match debt_entry::handle(step, draft, input, today()) {
            DebtOutcome::Stay(reply) => Ok(reply),
            DebtOutcome::Next { step, draft, reply } => {
                match self.sessions.advance(user_id, FlowState::DebtEntry { step, draft }) {
                    Ok(()) => Ok(reply),
                    Err(SessionError::NoSession(_)) => Ok(Reply::text(LOST_SESSION)),
                }
            }
            DebtOutcome::Commit(commit) => {
                // The session dies before the write: a duplicate confirm tap
                // must not insert twice, and a failed write must not strand
                // the user mid-flow.
                self.sessions.end(user_id);
                let debt_id = {
                    let mut conn = self.conn();
                    store::commit_debt(&mut conn, user_id, &commit, today())?
                };
                info!(user = user_id, debt = debt_id, "debt recorded");
                let mut text = format!(
                    "✅ Qarz saqlandi!\n\n👤 {}\n💵 {}\n⏰ Muddat: {}",
                    commit.person_name,
                    fmt_money(commit.amount, commit.currency),
                    fmt_date(commit.due_date),
                );
                if let PaymentPlan::Installment { months } = commit.plan {
                    text.push_str(&format!("\n📅 Bo'lib to'lash: {months} oy"));
                }
                Ok(Reply::text(text))
            }
            DebtOutcome::Cancelled => {
                self.sessions.end(user_id);
                Ok(Reply::text(CANCELLED))
            }
        }
    }

    fn drive_expense(
        &self,
        user_id: i64,
        step: ExpenseStep,
        draft: &ExpenseDraft,
        input: &UserInput,
    ) -> Result<Reply> {
        match expense_entry::handle(step, draft, input) {
            ExpenseOutcome::Stay(reply) => Ok(reply),
            ExpenseOutcome::Next { step, draft, reply } => {
                match self.sessions.advance(user_id, FlowState::ExpenseEntry { step, draft }) {
                    Ok(()) => Ok(reply),
                    Err(SessionError::NoSession(_)) => Ok(Reply::text(LOST_SESSION)),
                }
            }
            ExpenseOutcome::Commit(commit) => {
                self.sessions.end(user_id);
                let expense_id = {
                    let conn = self.conn();
                    store::add_expense(&conn, user_id, &commit, today())?
                };
                info!(user = user_id, expense = expense_id, "expense recorded");
                Ok(Reply::text(format!(
                    "✅ Harajat saqlandi!\n\n📝 {}\n💵 {}\n📂 {}",
                    commit.description,
                    fmt_money(commit.amount, commit.currency),
                    commit.category.label(),
                )))
            }
        }
    }

    fn drive_repayment(&self, user_id: i64, debt_id: i64, input: &UserInput) -> Result<Reply> {
        match repayment::handle(input) {
            RepayOutcome::Stay(reply) => Ok(reply),
            RepayOutcome::Request(RepayRequest::SettleAll) => {
                self.sessions.end(user_id);
                let settled = {
                    let mut conn = self.conn();
                    store::settle_debt(&mut conn, debt_id)?
                };
                match settled {
                    Some(debt) => {
                        info!(user = user_id, debt = debt_id, "debt settled");
                        Ok(Reply::text(format!(
                            "✅ Qarz to'liq yopildi!\n\n👤 {}\n💰 {}",
                            debt.person_name,
                            fmt_money(debt.amount, debt.currency),
                        )))
                    }
                    None => Ok(Reply::text(NOT_FOUND)),
                }
            }
            RepayOutcome::Request(RepayRequest::Pay { amount, currency }) => {
                let applied = {
                    let mut conn = self.conn();
                    store::apply_repayment(&mut conn, debt_id, amount, currency)?
                };
                match applied {
                    RepayApplied::NotFound => {
                        self.sessions.end(user_id);
                        Ok(Reply::text(NOT_FOUND))
                    }
                    // Session stays alive so the user can retype in the
                    // debt's own currency.
                    RepayApplied::CurrencyMismatch { expected } => Ok(Reply::text(format!(
                        "❌ Valyuta mos emas! Bu qarz {expected} da yuritiladi.\nQaytadan kiriting:"
                    ))),
                    RepayApplied::Settled(debt) => {
                        self.sessions.end(user_id);
                        info!(user = user_id, debt = debt_id, "debt settled");
                        Ok(Reply::text(format!(
                            "✅ Qarz to'liq yopildi!\n\n👤 {}\n💰 {}",
                            debt.person_name,
                            fmt_money(debt.amount, debt.currency),
                        )))
                    }
                    RepayApplied::Partial(debt) => {
                        self.sessions.end(user_id);
                        info!(user = user_id, debt = debt_id, "partial repayment");
                        Ok(Reply::text(format!(
                            "✅ To'lov qabul qilindi!\n\n👤 {}\n💵 To'landi: {}\n💰 Qolgan: {}",
                            debt.person_name,
                            fmt_money(amount, currency),
                            fmt_money(debt.amount, debt.currency),
                        )))
                    }
                }
            }
        }
    }

    fn drive_edit(
        &self,
        user_id: i64,
        debt_id: i64,
        field: EditField,
        input: &UserInput,
    ) -> Result<Reply> {
        match edit::handle(field, input) {
            EditOutcome::Stay(reply) => Ok(reply),
            EditOutcome::Apply(value) => {
                self.sessions.end(user_id);
                let changed = {
                    let conn = self.conn();
                    store::update_debt_field(&conn, debt_id, &value)?
                };
                if changed {
                    info!(user = user_id, debt = debt_id, "debt field updated");
                    Ok(Reply::text("✅ O'zgartirildi!"))
                } else {
                    Ok(Reply::text(NOT_FOUND))
                }
            }
        }
    }

    pub fn statistics(&self, who: &UserRef) -> Result<Statistics> {
        let conn = self.conn();
        let user = store::get_or_create_user(&conn, who)?;
        store::statistics(&conn, user.id, today())
    }

    pub fn debts_overview(&self, who: &UserRef, direction: Direction) -> Result<Vec<Debt>> {
        let conn = self.conn();
        let user = store::get_or_create_user(&conn, who)?;
        store::debts_by_direction(&conn, user.id, direction, false)
    }

    pub fn today_expenses(&self, who: &UserRef) -> Result<Vec<Expense>> {
        let conn = self.conn();
        let user = store::get_or_create_user(&conn, who)?;
        store::expenses_on(&conn, user.id, today())
    }

    pub fn debt_details(&self, debt_id: i64) -> Result<Option<(Debt, Vec<Installment>)>> {
        let conn = self.conn();
        match store::get_debt(&conn, debt_id)? {
            Some(debt) => {
                let installments = store::installments_for(&conn, debt_id)?;
                Ok(Some((debt, installments)))
            }
            None => Ok(None),
        }
    }

    pub fn mark_paid(&self, debt_id: i64) -> Result<Reply> {
        let settled = {
            let mut conn = self.conn();
            store::settle_debt(&mut conn, debt_id)?
        };
        match settled {
            Some(debt) => Ok(Reply::text(format!(
                "✅ To'langan deb belgilandi!\n\n👤 {}\n💰 {}",
                debt.person_name,
                fmt_money(debt.amount, debt.currency),
            ))),
            None => Ok(Reply::text(NOT_FOUND)),
        }
    }

    pub fn mark_installment_paid(&self, installment_id: i64) -> Result<Reply> {
        let conn = self.conn();
        if store::mark_installment_paid(&conn, installment_id, today())? {
            Ok(Reply::text("✅ Bo'lib to'lash qismi to'landi!"))
        } else {
            Ok(Reply::text("❌ Bo'lib to'lash qismi topilmadi."))
        }
    }

    pub fn delete_debt(&self, debt_id: i64) -> Result<Reply> {
        let conn = self.conn();
        if store::delete_debt(&conn, debt_id)? {
            Ok(Reply::text("🗑 Qarz o'chirildi!"))
        } else {
            Ok(Reply::text(NOT_FOUND))
        }
    }

    pub fn delete_expense(&self, expense_id: i64) -> Result<Reply> {
        let conn = self.conn();
        if store::delete_expense(&conn, expense_id)? {
            Ok(Reply::text("🗑 Harajat o'chirildi!"))
        } else {
            Ok(Reply::text("❌ Harajat topilmadi."))
        }
    }
}
