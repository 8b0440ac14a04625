// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use hisobchi::{cli, commands, db};

fn main() -> Result<()> {
    init_logging();
    let matches = cli::build_cli().get_matches();
    let db_override = matches.get_one::<String>("db").map(String::as_str);
    match matches.subcommand() {
        Some(("init", _)) => {
            let path = db::resolve_path(db_override)?;
            db::open_or_init(db_override)?;
            println!("Database ready at {}", path.display());
        }
        Some(("chat", sub)) => {
            let conn = db::open_or_init(db_override)?;
            commands::chat::handle(conn, sub)?;
        }
        Some(("remind", sub)) => {
            let conn = db::open_or_init(db_override)?;
            commands::remind::handle(&conn, sub)?;
        }
        Some(("overdue", sub)) => {
            let conn = db::open_or_init(db_override)?;
            commands::remind::handle_overdue(&conn, sub)?;
        }
        Some(("stats", sub)) => {
            let conn = db::open_or_init(db_override)?;
            commands::stats::handle(&conn, sub)?;
        }
        Some(("debts", sub)) => {
            let conn = db::open_or_init(db_override)?;
            commands::debts::handle(&conn, sub)?;
        }
        Some(("export", sub)) => {
            let conn = db::open_or_init(db_override)?;
            commands::export::handle(&conn, sub)?;
        }
        _ => {}
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
