pub mod auth;
pub mod models;
mod sqlite_store;
mod store;

pub use auth::{AuthToken, AuthTokenValue};
pub use models::{NewUser, User};
pub use sqlite_store::SqliteUserStore;
pub use store::UserStore;
