// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hisobchi::cli::build_cli;

#[test]
fn cli_definition_is_consistent() {
    build_cli().debug_assert();
}

#[test]
fn chat_defaults() {
    let matches = build_cli().get_matches_from(["hisobchi", "chat"]);
    let sub = matches.subcommand_matches("chat").expect("chat");
    assert_eq!(sub.get_one::<i64>("user"), Some(&1));
    assert_eq!(sub.get_one::<String>("name").map(String::as_str), Some("Konsol"));
    assert_eq!(sub.get_one::<String>("username"), None);
}

#[test]
fn stats_requires_a_user() {
    let result = build_cli().try_get_matches_from(["hisobchi", "stats"]);
    assert!(result.is_err());

    let matches = build_cli().get_matches_from(["hisobchi", "stats", "--user", "42", "--json"]);
    let sub = matches.subcommand_matches("stats").expect("stats");
    assert_eq!(sub.get_one::<i64>("user"), Some(&42));
    assert!(sub.get_flag("json"));
}

#[test]
fn debts_direction_defaults_to_given() {
    let matches = build_cli().get_matches_from(["hisobchi", "debts", "--user", "42"]);
    let sub = matches.subcommand_matches("debts").expect("debts");
    assert_eq!(sub.get_one::<String>("direction").map(String::as_str), Some("given"));
    assert!(!sub.get_flag("all"));
}

#[test]
fn export_defaults_and_flags() {
    let matches =
        build_cli().get_matches_from(["hisobchi", "export", "--user", "1", "--out", "x.csv"]);
    let sub = matches.subcommand_matches("export").expect("export");
    assert_eq!(sub.get_one::<String>("what").map(String::as_str), Some("debts"));
    assert_eq!(sub.get_one::<String>("format").map(String::as_str), Some("csv"));
    assert_eq!(sub.get_one::<String>("month"), None);
}

#[test]
fn db_override_is_global() {
    let matches =
        build_cli().get_matches_from(["hisobchi", "--db", "/tmp/x.db", "remind"]);
    assert_eq!(matches.get_one::<String>("db").map(String::as_str), Some("/tmp/x.db"));

    let matches =
        build_cli().get_matches_from(["hisobchi", "remind", "--db", "/tmp/y.db"]);
    assert_eq!(matches.get_one::<String>("db").map(String::as_str), Some("/tmp/y.db"));
}

#[test]
fn remind_accepts_a_date() {
    let matches =
        build_cli().get_matches_from(["hisobchi", "remind", "--date", "2030-01-01"]);
    let sub = matches.subcommand_matches("remind").expect("remind");
    assert_eq!(sub.get_one::<String>("date").map(String::as_str), Some("2030-01-01"));
}
