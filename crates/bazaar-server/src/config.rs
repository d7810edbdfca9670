use thiserror::Error;

use bazaar_types::ids::{ChannelId, GuildId, UserId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is not a valid id: {1:?}")]
    InvalidId(&'static str, String),
    #[error("{0} is not a valid port: {1:?}")]
    InvalidPort(&'static str, String),
}

/// Static deployment configuration. All platform identifiers are required
/// and validated at startup; the process refuses to boot without them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat session credential
    pub token: String,
    pub rest_url: String,
    pub gateway_url: String,

    pub guild_id: GuildId,
    pub ticket_category: ChannelId,
    pub creation_category: ChannelId,
    pub storefront_channel: ChannelId,
    pub approval_channel: ChannelId,
    pub admin_user: UserId,

    pub db_path: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token: require("BAZAAR_TOKEN")?,
            rest_url: require("BAZAAR_REST_URL")?,
            gateway_url: require("BAZAAR_GATEWAY_URL")?,

            guild_id: GuildId(require_id("BAZAAR_GUILD_ID")?),
            ticket_category: ChannelId(require_id("BAZAAR_TICKET_CATEGORY_ID")?),
            creation_category: ChannelId(require_id("BAZAAR_CREATION_CATEGORY_ID")?),
            storefront_channel: ChannelId(require_id("BAZAAR_STOREFRONT_CHANNEL_ID")?),
            approval_channel: ChannelId(require_id("BAZAAR_APPROVAL_CHANNEL_ID")?),
            admin_user: UserId(require_id("BAZAAR_ADMIN_ID")?),

            db_path: std::env::var("BAZAAR_DB_PATH").unwrap_or_else(|_| "bazaar.db".into()),
            host: std::env::var("BAZAAR_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: match std::env::var("BAZAAR_PORT") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort("BAZAAR_PORT", raw))?,
                Err(_) => 5000,
            },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn require_id(name: &'static str) -> Result<i64, ConfigError> {
    let raw = require(name)?;
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ConfigError::InvalidId(name, raw))
}
