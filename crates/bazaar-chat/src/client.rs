use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use bazaar_types::events::InteractionToken;
use bazaar_types::ids::{ChannelId, GuildId, UserId};

/// A resolved guild member, the only identity a ticket may be opened for.
#[derive(Debug, Clone)]
pub struct Member {
    pub user_id: UserId,
}

/// Everything the bot needs from the chat platform. The production
/// implementation is [`RestClient`]; tests substitute a recording mock so the
/// core logic runs without a live session.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<()>;

    /// Post a message carrying a clickable control component.
    async fn post_control(
        &self,
        channel: ChannelId,
        content: &str,
        label: &str,
        custom_id: &str,
    ) -> Result<()>;

    /// Create a channel under `category` visible only to the bot itself and
    /// the listed members.
    async fn create_private_channel(
        &self,
        guild: GuildId,
        category: ChannelId,
        name: &str,
        members: &[UserId],
    ) -> Result<ChannelId>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<()>;

    /// `Ok(None)` when the user is not a member of the guild.
    async fn resolve_member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>>;

    /// Ephemeral acknowledgment visible only to the interacting user.
    async fn ack_interaction(&self, interaction: &InteractionToken, content: &str) -> Result<()>;
}

/// REST-backed client for the chat platform's HTTP API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ChannelCreated {
    id: ChannelId,
}

#[derive(Debug, Deserialize)]
struct MemberPayload {
    user: MemberUser,
}

#[derive(Debug, Deserialize)]
struct MemberUser {
    id: UserId,
}

impl RestClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let resp = self
            .http
            .post(self.url(path))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;

        if !resp.status().is_success() {
            bail!("POST {} returned {}", path, resp.status());
        }
        Ok(resp)
    }
}

#[async_trait]
impl ChatClient for RestClient {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<()> {
        self.post_json(
            &format!("/channels/{}/messages", channel),
            json!({ "content": content }),
        )
        .await?;
        Ok(())
    }

    async fn post_control(
        &self,
        channel: ChannelId,
        content: &str,
        label: &str,
        custom_id: &str,
    ) -> Result<()> {
        self.post_json(
            &format!("/channels/{}/messages", channel),
            json!({
                "content": content,
                "components": [{ "label": label, "custom_id": custom_id }],
            }),
        )
        .await?;
        Ok(())
    }

    async fn create_private_channel(
        &self,
        guild: GuildId,
        category: ChannelId,
        name: &str,
        members: &[UserId],
    ) -> Result<ChannelId> {
        let resp = self
            .post_json(
                &format!("/guilds/{}/channels", guild),
                json!({
                    "name": name,
                    "parent_id": category,
                    "visible_to": members,
                }),
            )
            .await?;

        let created: ChannelCreated = resp
            .json()
            .await
            .context("malformed channel-create response")?;
        Ok(created.id)
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/channels/{}", channel)))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .context("channel delete failed")?;

        if !resp.status().is_success() {
            bail!("DELETE /channels/{} returned {}", channel, resp.status());
        }
        Ok(())
    }

    async fn resolve_member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>> {
        let resp = self
            .http
            .get(self.url(&format!("/guilds/{}/members/{}", guild, user)))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .context("member lookup failed")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            bail!("GET /guilds/{}/members/{} returned {}", guild, user, resp.status());
        }

        let payload: MemberPayload = resp.json().await.context("malformed member response")?;
        Ok(Some(Member {
            user_id: payload.user.id,
        }))
    }

    async fn ack_interaction(&self, interaction: &InteractionToken, content: &str) -> Result<()> {
        self.post_json(
            &format!(
                "/interactions/{}/{}/callback",
                interaction.id, interaction.token
            ),
            json!({ "content": content, "ephemeral": true }),
        )
        .await?;
        Ok(())
    }
}
