use async_trait::async_trait;

use crate::errors::NotifyError;

/// Largest payload the chat API accepts in one message, in characters.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Outbound delivery of a single, already size-checked message.
#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Split `text` into consecutive chunks of at most `max_chars` characters,
/// never cutting through a character.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }

    chunks
}
