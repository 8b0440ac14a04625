// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const UA: &str = concat!("hisobchi/", env!("CARGO_PKG_VERSION"));

pub trait Notifier {
    fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

// Stand-in transport for local runs and cron dry-runs.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        println!("[chat {chat_id}]\n{text}\n");
        Ok(())
    }
}

pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: String) -> Result<TelegramNotifier> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(UA)
            .timeout(Duration::from_secs(15))
            .build()
            .context("build HTTP client")?;
        Ok(TelegramNotifier { client, token })
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let url = format!("{API_BASE}/bot{}/sendMessage", self.token);
        let response: ApiResponse = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .context("send Telegram message")?
            .error_for_status()
            .context("Telegram API status")?
            .json()
            .context("decode Telegram response")?;
        if !response.ok {
            bail!(
                "Telegram rejected sendMessage: {}",
                response.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        Ok(())
    }
}
