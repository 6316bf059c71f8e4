pub mod extractor;
pub mod models;
pub mod source;
mod sqlite_store;
mod store;

pub use extractor::build_music_profile;
pub use models::{ListeningPatterns, MusicProfile, RecentTrack, TopArtist, TopGenre};
pub use source::{ProfileSource, SyntheticProfileSource};
pub use sqlite_store::SqliteProfileStore;
pub use store::ProfileStore;
