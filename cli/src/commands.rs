//! Chat commands: `/pause`, `/resume`, `/stats`.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::logger::task_span;
use common::{Counters, PauseGate};
use notify::TelegramChannel;
use notify::format::format_elapsed;
use tracing::{Instrument, info, warn};

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);
const STATS_TOP_PAIRS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Stats,
}

impl Command {
    /// `/pause`, `/pause@xyrabot` and `/pause now` all parse; anything else
    /// is not a command this bot answers.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "pause" => Some(Command::Pause),
            "resume" => Some(Command::Resume),
            "stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

/// Answers commands from the admin chat.
#[derive(Clone)]
pub struct CommandHandler {
    admin_chat: Option<i64>,
    pause: PauseGate,
    counters: Counters,
}

impl CommandHandler {
    pub fn new(admin_chat: Option<i64>, pause: PauseGate, counters: Counters) -> Self {
        Self {
            admin_chat,
            pause,
            counters,
        }
    }

    /// Reply for `text` sent from `chat_id`, if any.
    pub fn handle(&self, chat_id: i64, text: &str, now: DateTime<Utc>) -> Option<String> {
        let command = Command::parse(text)?;

        if self.admin_chat != Some(chat_id) {
            warn!(chat_id, ?command, "command from unauthorized chat");
            return Some("You are not authorized to use this command.".to_string());
        }

        let reply = match command {
            Command::Pause => {
                if self.pause.pause() {
                    info!("pausing bot monitoring");
                    "Xyrabot is paused".to_string()
                } else {
                    "Bot is already paused.".to_string()
                }
            }
            Command::Resume => {
                if self.pause.resume() {
                    info!("resuming bot monitoring");
                    "Xyrabot back for monitoring".to_string()
                } else {
                    "Bot is already running.".to_string()
                }
            }
            Command::Stats => format_stats(&self.counters, now),
        };
        Some(reply)
    }
}

pub fn format_stats(counters: &Counters, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "📊 Xyrabot Stats\n\
         Uptime : {}\n\
         Notifications sent : {}\n\
         Errors : {}\n\
         Top pairs :",
        format_elapsed(counters.uptime(now)),
        counters.sent(),
        counters.error_count(),
    );

    let top = counters.top_pairs(STATS_TOP_PAIRS);
    if top.is_empty() {
        out.push_str(" -");
    }
    for (i, (label, count)) in top.iter().enumerate() {
        let _ = write!(out, "\n{}. {label} ({count})", i + 1);
    }
    out
}

/// Long-poll `getUpdates` forever, answering commands in the chat they came
/// from.
pub async fn run_command_poller(channel: TelegramChannel, handler: CommandHandler) {
    async move {
        let mut offset = 0;
        loop {
            let updates = match channel.get_updates(offset, POLL_TIMEOUT).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "failed to poll updates");
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message else { continue };
                let Some(text) = message.text else { continue };
                let Some(reply) = handler.handle(message.chat.id, &text, Utc::now()) else {
                    continue;
                };

                if let Err(e) = channel.send_to(&message.chat.id.to_string(), &reply).await {
                    warn!(error = %e, "failed to reply to command");
                }
            }
        }
    }
    .instrument(task_span("commands"))
    .await
}
