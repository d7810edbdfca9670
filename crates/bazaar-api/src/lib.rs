pub mod storefront;

use std::sync::Arc;

use bazaar_chat::tickets::TicketSpawner;
use bazaar_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub tickets: TicketSpawner,
}
