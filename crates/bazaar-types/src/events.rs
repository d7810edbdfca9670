use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, GuildId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
}

/// Identifies one interaction long enough to acknowledge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionToken {
    pub id: String,
    pub token: String,
}

/// Events delivered by the chat-platform gateway session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// Session authenticated and ready
    Ready { session_id: String },

    /// A message was posted in a channel the session can see
    MessageCreate {
        channel_id: ChannelId,
        guild_id: Option<GuildId>,
        author: Author,
        content: String,
        #[serde(default)]
        attachments: Vec<Attachment>,
    },

    /// A user clicked a control component
    InteractionCreate {
        interaction: InteractionToken,
        channel_id: ChannelId,
        guild_id: Option<GuildId>,
        user: Author,
        custom_id: String,
    },

    /// A channel was removed (externally or by us)
    ChannelDelete {
        channel_id: ChannelId,
        guild_id: Option<GuildId>,
    },
}

/// Commands the session sends upstream over the gateway socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatCommand {
    Identify { token: String },
}
