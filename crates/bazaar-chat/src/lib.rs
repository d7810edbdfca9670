pub mod bot;
pub mod client;
pub mod commands;
pub mod conversation;
pub mod session;
pub mod tickets;
