mod manager;
pub mod models;
pub mod recap;
pub mod seeder;
mod sqlite_store;
mod store;

pub use manager::PlaylistManager;
pub use models::{
    MemberRole, NewTrack, PlaylistKind, PlaylistMember, PlaylistTrack, RecapTrack, SharedPlaylist,
    WeeklyRecap,
};
pub use sqlite_store::SqlitePlaylistStore;
pub use store::{NewPlaylist, PlaylistStore};
