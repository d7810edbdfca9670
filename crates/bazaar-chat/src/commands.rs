use tracing::error;

use bazaar_types::events::Author;
use bazaar_types::ids::ChannelId;

use crate::bot::Bot;

const PERMISSION_DENIED: &str = "You do not have permission to use this command!";

/// Text-command dispatch for messages outside any creation conversation.
/// Unknown commands and plain chatter are ignored.
pub async fn dispatch(bot: &Bot, channel: ChannelId, author: &Author, content: &str) {
    let Some(rest) = content.trim().strip_prefix('!') else {
        return;
    };
    let mut parts = rest.split_whitespace();
    let Some(command) = parts.next() else {
        return;
    };

    match command {
        "approve" => approve(bot, channel, author, parts.next()).await,
        "reject" => reject(bot, channel, author, parts.next()).await,
        "listproducts" => list_products(bot, channel).await,
        _ => {}
    }
}

async fn approve(bot: &Bot, channel: ChannelId, author: &Author, arg: Option<&str>) {
    if !(bot.is_admin)(author.id) {
        bot.say(channel, PERMISSION_DENIED).await;
        return;
    }
    let Some(id) = arg.and_then(|s| s.parse::<i64>().ok()) else {
        bot.say(channel, "Usage: !approve <product_id>").await;
        return;
    };

    let db = bot.db.clone();
    match tokio::task::spawn_blocking(move || db.approve_product(id)).await {
        Ok(Ok(true)) => {
            bot.say(channel, &format!("Product ID {} approved.", id)).await;
        }
        Ok(Ok(false)) => {
            bot.say(channel, &format!("Product ID {} not found.", id)).await;
        }
        Ok(Err(e)) => {
            error!("Approve of {} failed: {:#}", id, e);
            bot.say(channel, "Store error, nothing was changed.").await;
        }
        Err(e) => error!("Approve task panicked: {}", e),
    }
}

async fn reject(bot: &Bot, channel: ChannelId, author: &Author, arg: Option<&str>) {
    if !(bot.is_admin)(author.id) {
        bot.say(channel, PERMISSION_DENIED).await;
        return;
    }
    let Some(id) = arg.and_then(|s| s.parse::<i64>().ok()) else {
        bot.say(channel, "Usage: !reject <product_id>").await;
        return;
    };

    let db = bot.db.clone();
    match tokio::task::spawn_blocking(move || db.delete_product(id)).await {
        Ok(Ok(true)) => {
            bot.say(channel, &format!("Product ID {} rejected and removed.", id))
                .await;
        }
        Ok(Ok(false)) => {
            bot.say(channel, &format!("Product ID {} not found.", id)).await;
        }
        Ok(Err(e)) => {
            error!("Reject of {} failed: {:#}", id, e);
            bot.say(channel, "Store error, nothing was changed.").await;
        }
        Err(e) => error!("Reject task panicked: {}", e),
    }
}

async fn list_products(bot: &Bot, channel: ChannelId) {
    let db = bot.db.clone();
    match tokio::task::spawn_blocking(move || db.list_approved_summaries()).await {
        Ok(Ok(products)) if products.is_empty() => {
            bot.say(channel, "No approved products.").await;
        }
        Ok(Ok(products)) => {
            let lines: Vec<String> = products
                .iter()
                .map(|p| format!("**{}** - {} ({:.2})", p.id, p.name, p.price))
                .collect();
            bot.say(channel, &format!("Approved products:\n{}", lines.join("\n")))
                .await;
        }
        Ok(Err(e)) => {
            error!("Product listing failed: {:#}", e);
            bot.say(channel, "Store error, try again later.").await;
        }
        Err(e) => error!("Listing task panicked: {}", e),
    }
}
