// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use hisobchi::models::Currency;
use hisobchi::utils::{
    clean_phone, days_until, fmt_money, installment_schedule, parse_amount, parse_date,
    reminder_dates, strip_phone,
};

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn amount_with_usd_marker() {
    assert_eq!(parse_amount("100 USD").unwrap(), (dec("100"), Currency::Usd));
    assert_eq!(parse_amount("$250.50").unwrap(), (dec("250.50"), Currency::Usd));
    assert_eq!(parse_amount("usd 40").unwrap(), (dec("40"), Currency::Usd));
}

#[test]
fn amount_with_uzs_marker() {
    assert_eq!(parse_amount("500000 so'm").unwrap(), (dec("500000"), Currency::Uzs));
    assert_eq!(parse_amount("500 000 som").unwrap(), (dec("500000"), Currency::Uzs));
    assert_eq!(parse_amount("1000 UZS").unwrap(), (dec("1000"), Currency::Uzs));
}

#[test]
fn bare_number_defaults_to_uzs() {
    assert_eq!(parse_amount("750000").unwrap(), (dec("750000"), Currency::Uzs));
    assert_eq!(parse_amount("  12.5  ").unwrap(), (dec("12.5"), Currency::Uzs));
}

#[test]
fn dollar_sign_wins_over_som_words() {
    // Both markers present: USD is checked first.
    assert_eq!(parse_amount("$100 som").unwrap().1, Currency::Usd);
}

#[test]
fn amount_strips_garbage_characters() {
    assert_eq!(parse_amount("5,000").unwrap().0, dec("5000"));
    assert_eq!(parse_amount("qarz 100").unwrap().0, dec("100"));
}

#[test]
fn amount_rejects_non_positive_and_empty() {
    assert!(parse_amount("salom").is_err());
    assert!(parse_amount("").is_err());
    assert!(parse_amount("0").is_err());
    assert!(parse_amount("0.00 USD").is_err());
}

#[test]
fn date_accepts_all_listed_formats() {
    let expected = date(2026, 2, 25);
    assert_eq!(parse_date("25.02.2026").unwrap(), expected);
    assert_eq!(parse_date("25/02/2026").unwrap(), expected);
    assert_eq!(parse_date("25-02-2026").unwrap(), expected);
    assert_eq!(parse_date("2026-02-25").unwrap(), expected);
    assert_eq!(parse_date(" 25.02.2026 ").unwrap(), expected);
}

#[test]
fn date_rejects_nonsense() {
    assert!(parse_date("32.13.2026").is_err());
    assert!(parse_date("ertaga").is_err());
    assert!(parse_date("").is_err());
}

#[test]
fn phone_cleans_separators_and_keeps_plus() {
    assert_eq!(clean_phone("+998 90 123-45-67").unwrap(), "+998901234567");
    assert_eq!(clean_phone("90 123 45 67").unwrap(), "901234567");
}

#[test]
fn phone_needs_nine_digits() {
    assert!(clean_phone("12345678").is_none());
    assert!(clean_phone("salom").is_none());
    assert!(clean_phone("123456789").is_some());
}

#[test]
fn strip_phone_has_no_length_floor() {
    assert_eq!(strip_phone("12").unwrap(), "12");
    assert!(strip_phone("yomon").is_none());
}

#[test]
fn money_formatting() {
    assert_eq!(fmt_money(dec("500000"), Currency::Uzs), "500,000 so'm");
    assert_eq!(fmt_money(dec("1234567"), Currency::Uzs), "1,234,567 so'm");
    assert_eq!(fmt_money(dec("100"), Currency::Usd), "$100.00");
    assert_eq!(fmt_money(dec("1234.5"), Currency::Usd), "$1,234.50");
    assert_eq!(fmt_money(dec("999"), Currency::Uzs), "999 so'm");
}

#[test]
fn days_until_signs() {
    let base = date(2026, 8, 25);
    assert_eq!(days_until(date(2026, 8, 30), base), 5);
    assert_eq!(days_until(base, base), 0);
    assert_eq!(days_until(date(2026, 8, 20), base), -5);
}

#[test]
fn installment_schedule_divides_evenly() {
    let schedule = installment_schedule(dec("1200"), 3, date(2026, 1, 15)).unwrap();
    assert_eq!(schedule.len(), 3);
    assert!(schedule.iter().all(|(amount, _)| *amount == dec("400")));
    assert_eq!(schedule[0].1, date(2026, 1, 15));
    assert_eq!(schedule[1].1, date(2026, 2, 15));
    assert_eq!(schedule[2].1, date(2026, 3, 15));
}

#[test]
fn installment_schedule_rounds_to_cents() {
    let schedule = installment_schedule(dec("100"), 3, date(2026, 1, 1)).unwrap();
    // The remainder is deliberately not reconciled into the last slice.
    assert!(schedule.iter().all(|(amount, _)| *amount == dec("33.33")));
}

#[test]
fn installment_schedule_clamps_to_day_28() {
    let schedule = installment_schedule(dec("900"), 3, date(2026, 1, 31)).unwrap();
    assert_eq!(schedule[0].1, date(2026, 1, 31));
    assert_eq!(schedule[1].1, date(2026, 2, 28));
    assert_eq!(schedule[2].1, date(2026, 3, 28));
}

#[test]
fn installment_schedule_wraps_december() {
    let schedule = installment_schedule(dec("200"), 2, date(2026, 12, 10)).unwrap();
    assert_eq!(schedule[1].1, date(2027, 1, 10));
}

#[test]
fn reminder_dates_standard_offsets() {
    let today = date(2026, 8, 1);
    let due = date(2026, 8, 10);
    assert_eq!(
        reminder_dates(due, today),
        vec![date(2026, 8, 7), date(2026, 8, 9), date(2026, 8, 10)]
    );
}

#[test]
fn reminder_dates_drop_past_offsets() {
    let today = date(2026, 8, 1);
    assert_eq!(
        reminder_dates(date(2026, 8, 2), today),
        vec![date(2026, 8, 1), date(2026, 8, 2)]
    );
    assert_eq!(reminder_dates(date(2026, 8, 1), today), vec![date(2026, 8, 1)]);
    assert_eq!(reminder_dates(date(2026, 7, 20), today), Vec::<NaiveDate>::new());
}
