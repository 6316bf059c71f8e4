mod manager;
pub mod models;
mod sqlite_store;
mod store;

pub use manager::{ChatManager, MAX_PAGE_SIZE};
pub use models::{Message, MessageKind, SongData};
pub use sqlite_store::SqliteMessageStore;
pub use store::MessageStore;
