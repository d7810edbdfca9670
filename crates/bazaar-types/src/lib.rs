pub mod events;
pub mod http;
pub mod ids;
pub mod product;
