use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use bazaar_types::product::Product;

use crate::bot::Bot;

/// Fire-and-forget executor for purchase tickets. The HTTP buy path enqueues
/// and returns immediately; one worker task does the provisioning and
/// failures go to the log sink only.
#[derive(Clone)]
pub struct TicketSpawner {
    tx: mpsc::UnboundedSender<Product>,
}

impl TicketSpawner {
    pub fn start(bot: Arc<Bot>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Product>();

        tokio::spawn(async move {
            while let Some(product) = rx.recv().await {
                let product_id = product.id;
                if let Err(e) = bot.spawn_ticket(&product).await {
                    warn!("Ticket spawn for product {} failed: {:#}", product_id, e);
                }
            }
        });

        Self { tx }
    }

    pub fn enqueue(&self, product: Product) {
        let product_id = product.id;
        if self.tx.send(product).is_err() {
            warn!("Ticket worker is gone, dropping spawn for product {}", product_id);
        }
    }
}

/// Channel-name slug: runs of non-alphanumeric characters collapse to a
/// single `-`, lowercased, no leading or trailing separator.
pub fn channel_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    slug
}
