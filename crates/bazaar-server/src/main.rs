mod config;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use bazaar_api::{AppStateInner, storefront};
use bazaar_chat::bot::{Bot, BotConfig, single_admin};
use bazaar_chat::client::{ChatClient, RestClient};
use bazaar_chat::session;
use bazaar_chat::tickets::TicketSpawner;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar=debug,tower_http=debug".into()),
        )
        .init();

    // Config — every platform identifier validated up front
    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(bazaar_db::Database::open(&PathBuf::from(&config.db_path))?);

    // Chat side: REST client, bot, ticket worker
    let chat: Arc<dyn ChatClient> = Arc::new(RestClient::new(&config.rest_url, &config.token));
    let bot = Arc::new(Bot::new(
        chat,
        db.clone(),
        BotConfig {
            guild_id: config.guild_id,
            ticket_category: config.ticket_category,
            creation_category: config.creation_category,
            storefront_channel: config.storefront_channel,
            approval_channel: config.approval_channel,
        },
        single_admin(config.admin_user),
    ));
    let tickets = TicketSpawner::start(bot.clone());

    // HTTP side
    let state = Arc::new(AppStateInner { db, tickets });
    let app = Router::new()
        .route("/", get(storefront::list_products))
        .route("/buy/{product_id}", post(storefront::buy))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Storefront listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Both long-running activities share the process for its lifetime; if
    // either ends, the other has nothing left to serve.
    tokio::select! {
        result = axum::serve(listener, app).into_future() => result.map_err(Into::into),
        result = session::run(&config.gateway_url, &config.token, bot) => result,
    }
}
