//! MusicMate Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod chat;
pub mod config;
pub mod error;
pub mod matching;
pub mod playlist;
pub mod profile;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use chat::{ChatManager, SqliteMessageStore};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use error::{CoreError, CoreResult};
pub use matching::{MatchEngine, MatchingConfig, SqliteMatchStore};
pub use playlist::{PlaylistManager, SqlitePlaylistStore};
pub use profile::{SqliteProfileStore, SyntheticProfileSource};
pub use server::{run_server, RequestsLoggingLevel};
pub use user::SqliteUserStore;
