// src/services/notify.rs

//! Notification delivery to Discord channels.
//!
//! Every channel-directed call goes through the per-channel gates, so
//! operations on one channel never interleave.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{BotConfig, SchoolConfig, Section};
use crate::utils::ChannelGates;

const API_BASE: &str = "https://discord.com/api/v10";

/// Delivery of substitution and lucky-number updates.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an update. `sections` is `None` when only the extra info
    /// changed and the substitution entries are unchanged.
    async fn send_update(
        &self,
        channel_id: &str,
        server_id: &str,
        extra: &str,
        sections: Option<&[Section]>,
    ) -> Result<()>;

    /// Send the school's lucky numbers for the day named in the extra
    /// info, or a "none published" notice.
    async fn send_lucky_numbers(
        &self,
        channel_id: &str,
        server_id: &str,
        extra: &str,
        school: &SchoolConfig,
    ) -> Result<()>;
}

/// Notifier backed by the Discord REST API.
pub struct DiscordNotifier {
    client: Client,
    token: String,
    gates: Arc<ChannelGates>,
}

impl DiscordNotifier {
    pub fn new(
        token: impl Into<String>,
        config: &BotConfig,
        gates: Arc<ChannelGates>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
            gates,
        })
    }

    /// Post a message, serialized per channel.
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let gate = self.gates.gate(channel_id).await;
        let _held = gate.lock().await;

        let url = format!("{API_BASE}/channels/{channel_id}/messages");
        self.client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({ "content": content }))
            .send()
            .await
            .map_err(|e| AppError::transport(format!("send to {channel_id}"), e))?
            .error_for_status()
            .map_err(|e| AppError::transport(format!("send to {channel_id}"), e))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send_update(
        &self,
        channel_id: &str,
        server_id: &str,
        extra: &str,
        sections: Option<&[Section]>,
    ) -> Result<()> {
        log::debug!("Sending update to server {server_id} on channel {channel_id}");
        self.post_message(channel_id, &render_update(extra, sections))
            .await
    }

    async fn send_lucky_numbers(
        &self,
        channel_id: &str,
        server_id: &str,
        extra: &str,
        school: &SchoolConfig,
    ) -> Result<()> {
        let Some(day) = extract_day(extra) else {
            log::warn!(
                "No day found in extra info for server {server_id}; lucky numbers not sent"
            );
            return Ok(());
        };

        let numbers = school.lucky_numbers_for(&day);
        let content = render_lucky_numbers(&day, &numbers);
        self.post_message(channel_id, &content).await
    }
}

/// Extract the first "DD.MM" day reference from the extra-info text,
/// zero-padding both components.
pub fn extract_day(text: &str) -> Option<String> {
    static DAY: OnceLock<Regex> = OnceLock::new();
    let day = DAY.get_or_init(|| {
        Regex::new(r"\b(\d{1,2})\.(\d{1,2})\b").expect("day pattern is valid")
    });

    let caps = day.captures(text)?;
    Some(format!("{:0>2}.{:0>2}", &caps[1], &caps[2]))
}

/// Inflect "zastępstwo" for a count, following Polish plural rules.
pub fn substitution_word(count: i64) -> &'static str {
    let count = count.abs();
    if count == 1 {
        return "zastępstwo";
    }
    if (11..=14).contains(&(count % 100)) {
        return "zastępstw";
    }
    if matches!(count % 10, 2..=4) {
        return "zastępstwa";
    }
    "zastępstw"
}

fn render_update(extra: &str, sections: Option<&[Section]>) -> String {
    let mut out = String::new();

    match sections {
        None => {
            out.push_str("**Zaktualizowane informacje dodatkowe**\n");
            out.push_str(extra);
        }
        Some(sections) => {
            let count: i64 = sections.iter().map(|s| s.entries.len() as i64).sum();
            out.push_str(&format!(
                "**Nowe zastępstwa!** ({count} {})\n",
                substitution_word(count)
            ));
            if !extra.is_empty() {
                out.push_str(extra);
                out.push('\n');
            }
            for section in sections {
                out.push_str(&format!("\n**{}**\n", section.title));
                for entry in &section.entries {
                    out.push_str(entry);
                    out.push('\n');
                }
            }
        }
    }

    out
}

fn render_lucky_numbers(day: &str, numbers: &[u32]) -> String {
    if numbers.is_empty() {
        format!("**Brak szczęśliwych numerków** na dzień {day}.")
    } else {
        let joined = numbers
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("**Szczęśliwe numerki!** ({day}): {joined}")
    }
}
