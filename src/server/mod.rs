pub mod chat_routes;
pub mod config;
mod http_layers;
pub mod match_routes;
pub mod playlist_routes;
pub mod profile_routes;
pub mod server;
pub(crate) mod session;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::run_server;
