use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use bazaar_db::Database;
use bazaar_types::events::{Attachment, Author, ChatEvent, InteractionToken};
use bazaar_types::ids::{ChannelId, GuildId, UserId};
use bazaar_types::product::{Product, ProductDraft};

use crate::client::ChatClient;
use crate::commands;
use crate::conversation::{self, Conversations, Outcome};
use crate::tickets::channel_slug;

/// Custom id of the storefront "Create Product" control.
pub const CREATE_PRODUCT_CONTROL: &str = "create_product";

/// Injected authorization predicate for the admin commands.
pub type AdminCheck = Arc<dyn Fn(UserId) -> bool + Send + Sync>;

/// The production policy: one configured administrator identity.
pub fn single_admin(admin: UserId) -> AdminCheck {
    Arc::new(move |user| user == admin)
}

/// Fixed platform identifiers the bot operates against.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub guild_id: GuildId,
    /// Category for purchase ticket channels
    pub ticket_category: ChannelId,
    /// Category for product-creation channels
    pub creation_category: ChannelId,
    /// Channel carrying the "Create Product" control
    pub storefront_channel: ChannelId,
    /// Channel receiving pending-product notifications
    pub approval_channel: ChannelId,
}

pub struct Bot {
    pub(crate) chat: Arc<dyn ChatClient>,
    pub(crate) db: Arc<Database>,
    pub(crate) config: BotConfig,
    pub(crate) conversations: Conversations,
    pub(crate) is_admin: AdminCheck,
}

impl Bot {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        db: Arc<Database>,
        config: BotConfig,
        is_admin: AdminCheck,
    ) -> Self {
        Self {
            chat,
            db,
            config,
            conversations: Conversations::new(),
            is_admin,
        }
    }

    /// Route one gateway event.
    pub async fn on_event(&self, event: ChatEvent) {
        match event {
            ChatEvent::Ready { session_id } => {
                info!("Chat session ready (session {})", session_id);
                self.post_storefront_control().await;
            }
            ChatEvent::MessageCreate {
                channel_id,
                guild_id,
                author,
                content,
                attachments,
            } => {
                self.on_message(channel_id, guild_id, &author, &content, &attachments)
                    .await;
            }
            ChatEvent::InteractionCreate {
                interaction,
                guild_id,
                user,
                custom_id,
                ..
            } => {
                self.on_interaction(&interaction, guild_id, &user, &custom_id)
                    .await;
            }
            ChatEvent::ChannelDelete { channel_id, .. } => {
                if self.conversations.cancel(channel_id).await {
                    info!("Creation conversation in {} abandoned, context dropped", channel_id);
                }
            }
        }
    }

    /// Startup hook: put the "Create Product" control into the configured
    /// storefront channel. A failure here is a diagnostic, not fatal.
    async fn post_storefront_control(&self) {
        if let Err(e) = self
            .chat
            .post_control(
                self.config.storefront_channel,
                "Click the button below to open a ticket and create a new product!",
                "Create Product",
                CREATE_PRODUCT_CONTROL,
            )
            .await
        {
            error!("Failed to post storefront control: {:#}", e);
        }
    }

    async fn on_interaction(
        &self,
        interaction: &InteractionToken,
        guild_id: Option<GuildId>,
        user: &Author,
        custom_id: &str,
    ) {
        if custom_id != CREATE_PRODUCT_CONTROL {
            return;
        }
        if guild_id != Some(self.config.guild_id) {
            self.ack(interaction, "This control can only be used in the configured server!")
                .await;
            return;
        }

        let slug = channel_slug(&user.username);
        let name = if slug.is_empty() {
            "product".to_string()
        } else {
            format!("product-{}", slug)
        };

        let channel = match self
            .chat
            .create_private_channel(
                self.config.guild_id,
                self.config.creation_category,
                &name,
                &[user.id],
            )
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                error!("Could not open a creation channel for {}: {:#}", user.id, e);
                return;
            }
        };

        if !self.conversations.start(channel, user).await {
            warn!("Channel {} already has a creation conversation", channel);
            return;
        }

        self.say(channel, conversation::PROMPT_NAME).await;
        self.ack(
            interaction,
            "Product creation ticket opened! Check your new channel.",
        )
        .await;
    }

    async fn on_message(
        &self,
        channel_id: ChannelId,
        guild_id: Option<GuildId>,
        author: &Author,
        content: &str,
        attachments: &[Attachment],
    ) {
        if author.bot || guild_id != Some(self.config.guild_id) {
            return;
        }

        match self
            .conversations
            .handle(channel_id, author, content, attachments)
            .await
        {
            Outcome::NoConversation => {
                commands::dispatch(self, channel_id, author, content).await;
            }
            Outcome::Ignored => {}
            Outcome::Reply(text) => self.say(channel_id, text).await,
            Outcome::Completed(draft) => self.finish_creation(channel_id, draft).await,
        }
    }

    /// Terminal transition: persist the draft, confirm, notify the approval
    /// channel, tear the creation channel down.
    async fn finish_creation(&self, channel: ChannelId, draft: ProductDraft) {
        let db = self.db.clone();
        let to_insert = draft.clone();
        let inserted = tokio::task::spawn_blocking(move || db.insert_product(&to_insert))
            .await
            .context("insert task panicked")
            .and_then(|r| r);

        let product_id = match inserted {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to persist product {:?}: {:#}", draft.name, e);
                self.say(channel, "Something went wrong saving the product, please try again.")
                    .await;
                return;
            }
        };

        info!("Product {} ({}) submitted for approval", product_id, draft.name);

        self.say(
            channel,
            &format!(
                "Product **{}** submitted for approval.\n{}",
                draft.name,
                product_lines(product_id, &draft)
            ),
        )
        .await;

        let notification = format!(
            "New pending product\n{}\nUse !approve {} to approve or !reject {} to reject.",
            product_lines(product_id, &draft),
            product_id,
            product_id
        );
        if let Err(e) = self
            .chat
            .send_message(self.config.approval_channel, &notification)
            .await
        {
            error!("Failed to notify approval channel: {:#}", e);
        }

        if let Err(e) = self.chat.delete_channel(channel).await {
            warn!("Failed to delete creation channel {}: {:#}", channel, e);
        }
    }

    /// Provision a purchase ticket: private channel for the product's seller
    /// plus one order-summary message. Runs on the ticket worker, never on
    /// the request path.
    pub async fn spawn_ticket(&self, product: &Product) -> Result<()> {
        let member = self
            .chat
            .resolve_member(self.config.guild_id, product.creator_id)
            .await?;
        let Some(member) = member else {
            bail!(
                "ticket recipient {} is not a member of guild {}",
                product.creator_id,
                self.config.guild_id
            );
        };

        let slug = channel_slug(&product.name);
        let name = if slug.is_empty() {
            "order".to_string()
        } else {
            format!("order-{}", slug)
        };

        let channel = self
            .chat
            .create_private_channel(
                self.config.guild_id,
                self.config.ticket_category,
                &name,
                &[member.user_id],
            )
            .await?;

        let summary = format!(
            "A new order was placed!\n\nProduct: {}\nPrice: {:.2}\nDescription: {}\nImage: {}\nSeller: {}",
            product.name,
            product.price,
            placeholder(&product.description, "No description"),
            placeholder(&product.image_url, "No image"),
            product.creator_name,
        );
        self.chat.send_message(channel, &summary).await?;

        info!("Opened ticket {} for product {}", channel, product.id);
        Ok(())
    }

    /// Send a channel message, logging instead of propagating failures.
    pub(crate) async fn say(&self, channel: ChannelId, content: &str) {
        if let Err(e) = self.chat.send_message(channel, content).await {
            warn!("Failed to send message to {}: {:#}", channel, e);
        }
    }

    async fn ack(&self, interaction: &InteractionToken, content: &str) {
        if let Err(e) = self.chat.ack_interaction(interaction, content).await {
            warn!("Failed to acknowledge interaction: {:#}", e);
        }
    }
}

fn product_lines(id: i64, draft: &ProductDraft) -> String {
    format!(
        "ID: {}\nName: {}\nPrice: {:.2}\nDescription: {}\nImage: {}\nSeller: {}",
        id,
        draft.name,
        draft.price,
        placeholder(&draft.description, "No description"),
        placeholder(&draft.image_url, "No image"),
        draft.creator_name,
    )
}

fn placeholder<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
