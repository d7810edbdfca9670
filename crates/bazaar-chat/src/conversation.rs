use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use bazaar_types::events::{Attachment, Author};
use bazaar_types::ids::{ChannelId, UserId};
use bazaar_types::product::ProductDraft;

pub const PROMPT_NAME: &str = "Step 1 of 4: enter the product **name**.";
pub const PROMPT_PRICE: &str = "Step 2 of 4: enter the product **price** (e.g. 29.99).";
pub const PROMPT_DESCRIPTION: &str =
    "Step 3 of 4: enter the product **description** (or leave it blank for none).";
pub const PROMPT_IMAGE: &str =
    "Step 4 of 4: attach a product **image** (or reply without an attachment for none).";

pub const ERR_EMPTY_NAME: &str = "The name cannot be empty. Enter the product name.";
pub const ERR_BAD_PRICE: &str = "Enter a valid price (e.g. 29.99).";

/// Current step of one creation conversation. Each variant carries exactly
/// the fields accepted so far, so a half-filled state cannot be represented.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Name,
    Price {
        name: String,
    },
    Description {
        name: String,
        price: f64,
    },
    Image {
        name: String,
        price: f64,
        description: String,
    },
}

#[derive(Debug)]
struct Conversation {
    initiator: UserId,
    creator_name: String,
    step: Step,
}

/// What the caller should do with an incoming message. The state machine is
/// pure: persisting the draft and tearing down the channel are the bot's job.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The channel has no active conversation; fall through to commands.
    NoConversation,
    /// Someone other than the initiator wrote in the channel; do nothing.
    Ignored,
    /// Post this prompt or error; the conversation continues.
    Reply(&'static str),
    /// All four steps accepted; the context is gone, persist the draft.
    Completed(ProductDraft),
}

/// Registry of in-progress creation conversations, keyed by channel.
/// One context per channel; contexts in different channels are independent.
#[derive(Clone)]
pub struct Conversations {
    inner: Arc<RwLock<HashMap<ChannelId, Conversation>>>,
}

impl Conversations {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a context for `channel`. Returns false if one already exists.
    pub async fn start(&self, channel: ChannelId, user: &Author) -> bool {
        let mut map = self.inner.write().await;
        if map.contains_key(&channel) {
            return false;
        }
        map.insert(
            channel,
            Conversation {
                initiator: user.id,
                creator_name: user.username.clone(),
                step: Step::Name,
            },
        );
        true
    }

    /// Drop the context for `channel`, e.g. when the channel was deleted
    /// out from under an abandoned conversation.
    pub async fn cancel(&self, channel: ChannelId) -> bool {
        self.inner.write().await.remove(&channel).is_some()
    }

    /// Feed one message into the channel's conversation, if any.
    pub async fn handle(
        &self,
        channel: ChannelId,
        author: &Author,
        content: &str,
        attachments: &[Attachment],
    ) -> Outcome {
        let mut map = self.inner.write().await;
        let Some(convo) = map.get_mut(&channel) else {
            return Outcome::NoConversation;
        };
        if author.id != convo.initiator {
            return Outcome::Ignored;
        }

        let step = std::mem::replace(&mut convo.step, Step::Name);
        match step {
            Step::Name => {
                let name = content.trim();
                if name.is_empty() {
                    Outcome::Reply(ERR_EMPTY_NAME)
                } else {
                    convo.step = Step::Price {
                        name: name.to_string(),
                    };
                    Outcome::Reply(PROMPT_PRICE)
                }
            }
            Step::Price { name } => match parse_price(content) {
                Some(price) => {
                    convo.step = Step::Description { name, price };
                    Outcome::Reply(PROMPT_DESCRIPTION)
                }
                None => {
                    convo.step = Step::Price { name };
                    Outcome::Reply(ERR_BAD_PRICE)
                }
            },
            Step::Description { name, price } => {
                convo.step = Step::Image {
                    name,
                    price,
                    description: content.trim().to_string(),
                };
                Outcome::Reply(PROMPT_IMAGE)
            }
            Step::Image {
                name,
                price,
                description,
            } => {
                let draft = ProductDraft {
                    name,
                    price,
                    description,
                    image_url: attachments
                        .first()
                        .map(|a| a.url.clone())
                        .unwrap_or_default(),
                    creator_name: convo.creator_name.clone(),
                    creator_id: convo.initiator,
                };
                map.remove(&channel);
                Outcome::Completed(draft)
            }
        }
    }
}

impl Default for Conversations {
    fn default() -> Self {
        Self::new()
    }
}

/// The store records prices as REAL, so f64 it is. Rejects negatives and the
/// non-finite spellings f64 parsing would otherwise accept ("inf", "NaN").
fn parse_price(content: &str) -> Option<f64> {
    content
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: i64, name: &str) -> Author {
        Author {
            id: UserId(id),
            username: name.to_string(),
            bot: false,
        }
    }

    fn attachment(url: &str) -> Attachment {
        Attachment {
            url: url.to_string(),
        }
    }

    const CHANNEL: ChannelId = ChannelId(100);

    async fn started() -> (Conversations, Author) {
        let convos = Conversations::new();
        let seller = author(1, "seller");
        assert!(convos.start(CHANNEL, &seller).await);
        (convos, seller)
    }

    #[tokio::test]
    async fn walks_all_steps_in_order_and_completes() {
        let (convos, seller) = started().await;

        assert_eq!(
            convos.handle(CHANNEL, &seller, "Sword", &[]).await,
            Outcome::Reply(PROMPT_PRICE)
        );
        assert_eq!(
            convos.handle(CHANNEL, &seller, "10.00", &[]).await,
            Outcome::Reply(PROMPT_DESCRIPTION)
        );
        assert_eq!(
            convos.handle(CHANNEL, &seller, "A sharp one", &[]).await,
            Outcome::Reply(PROMPT_IMAGE)
        );

        let outcome = convos
            .handle(CHANNEL, &seller, "here", &[attachment("https://cdn.example/sword.png")])
            .await;
        let Outcome::Completed(draft) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(draft.name, "Sword");
        assert_eq!(draft.price, 10.0);
        assert_eq!(draft.description, "A sharp one");
        assert_eq!(draft.image_url, "https://cdn.example/sword.png");
        assert_eq!(draft.creator_id, UserId(1));
        assert_eq!(draft.creator_name, "seller");

        // Context destroyed on completion
        assert_eq!(
            convos.handle(CHANNEL, &seller, "again", &[]).await,
            Outcome::NoConversation
        );
    }

    #[tokio::test]
    async fn empty_name_reprompts_without_advancing() {
        let (convos, seller) = started().await;

        assert_eq!(
            convos.handle(CHANNEL, &seller, "   ", &[]).await,
            Outcome::Reply(ERR_EMPTY_NAME)
        );
        // Still in the name step
        assert_eq!(
            convos.handle(CHANNEL, &seller, "Sword", &[]).await,
            Outcome::Reply(PROMPT_PRICE)
        );
    }

    #[tokio::test]
    async fn invalid_price_reprompts_and_keeps_accumulated_fields() {
        let (convos, seller) = started().await;
        convos.handle(CHANNEL, &seller, "Sword", &[]).await;

        for bad in ["abc", "", "-5", "inf", "NaN"] {
            assert_eq!(
                convos.handle(CHANNEL, &seller, bad, &[]).await,
                Outcome::Reply(ERR_BAD_PRICE),
                "price input {:?} should be rejected",
                bad
            );
        }

        // A valid resubmission then advances with the stored name intact
        convos.handle(CHANNEL, &seller, "19.99", &[]).await;
        convos.handle(CHANNEL, &seller, "", &[]).await;
        let outcome = convos.handle(CHANNEL, &seller, "done", &[]).await;
        let Outcome::Completed(draft) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(draft.name, "Sword");
        assert_eq!(draft.price, 19.99);
    }

    #[tokio::test]
    async fn blank_description_and_missing_attachment_are_allowed() {
        let (convos, seller) = started().await;
        convos.handle(CHANNEL, &seller, "Potion", &[]).await;
        convos.handle(CHANNEL, &seller, "5.50", &[]).await;
        convos.handle(CHANNEL, &seller, "  ", &[]).await;

        let outcome = convos.handle(CHANNEL, &seller, "no image", &[]).await;
        let Outcome::Completed(draft) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(draft.name, "Potion");
        assert_eq!(draft.price, 5.5);
        assert_eq!(draft.description, "");
        assert_eq!(draft.image_url, "");
    }

    #[tokio::test]
    async fn only_first_attachment_is_used() {
        let (convos, seller) = started().await;
        convos.handle(CHANNEL, &seller, "Bow", &[]).await;
        convos.handle(CHANNEL, &seller, "15", &[]).await;
        convos.handle(CHANNEL, &seller, "", &[]).await;

        let outcome = convos
            .handle(
                CHANNEL,
                &seller,
                "",
                &[attachment("https://cdn.example/a.png"), attachment("https://cdn.example/b.png")],
            )
            .await;
        let Outcome::Completed(draft) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(draft.image_url, "https://cdn.example/a.png");
    }

    #[tokio::test]
    async fn non_initiator_messages_are_ignored() {
        let (convos, seller) = started().await;
        let stranger = author(2, "stranger");

        assert_eq!(
            convos.handle(CHANNEL, &stranger, "Hijacked", &[]).await,
            Outcome::Ignored
        );
        // The conversation is still waiting for the name from the initiator
        assert_eq!(
            convos.handle(CHANNEL, &seller, "Sword", &[]).await,
            Outcome::Reply(PROMPT_PRICE)
        );
    }

    #[tokio::test]
    async fn one_context_per_channel() {
        let (convos, _seller) = started().await;
        assert!(!convos.start(CHANNEL, &author(3, "other")).await);
    }

    #[tokio::test]
    async fn channels_are_independent() {
        let convos = Conversations::new();
        let a = author(1, "a");
        let b = author(2, "b");
        convos.start(ChannelId(1), &a).await;
        convos.start(ChannelId(2), &b).await;

        convos.handle(ChannelId(1), &a, "Sword", &[]).await;
        // Channel 2 is still on its name step
        assert_eq!(
            convos.handle(ChannelId(2), &b, "12.0", &[]).await,
            Outcome::Reply(PROMPT_PRICE)
        );
    }

    #[tokio::test]
    async fn cancel_removes_the_context() {
        let (convos, seller) = started().await;
        assert!(convos.cancel(CHANNEL).await);
        assert!(!convos.cancel(CHANNEL).await);
        assert_eq!(
            convos.handle(CHANNEL, &seller, "Sword", &[]).await,
            Outcome::NoConversation
        );
    }
}
