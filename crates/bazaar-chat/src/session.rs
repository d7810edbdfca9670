use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use bazaar_types::events::{ChatCommand, ChatEvent};

use crate::bot::Bot;

/// Persistent gateway session: identify with the configured credential, then
/// feed every event to the bot until the socket closes. An unreachable or
/// rejected credential is the one fatal startup condition on this side.
pub async fn run(gateway_url: &str, token: &str, bot: Arc<Bot>) -> Result<()> {
    let (socket, _) = connect_async(gateway_url)
        .await
        .context("chat gateway unreachable")?;

    let (mut sender, mut receiver) = socket.split();

    let identify = ChatCommand::Identify {
        token: token.to_string(),
    };
    sender
        .send(Message::Text(serde_json::to_string(&identify)?.into()))
        .await
        .context("failed to identify with the chat gateway")?;

    info!("Connected to chat gateway at {}", gateway_url);

    while let Some(frame) = receiver.next().await {
        match frame.context("gateway stream error")? {
            Message::Text(text) => match serde_json::from_str::<ChatEvent>(&text) {
                Ok(event) => bot.on_event(event).await,
                Err(e) => {
                    warn!("Bad gateway frame: {} -- raw: {}", e, frame_preview(&text));
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("Chat gateway session ended");
    Ok(())
}

/// Cap a malformed frame for logging. Cuts at a character boundary, never a
/// byte offset, so an arbitrary frame can't panic the read loop.
fn frame_preview(text: &str) -> &str {
    const MAX_CHARS: usize = 200;
    match text.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
