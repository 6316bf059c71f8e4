use super::models::MusicProfile;
use anyhow::Result;

pub trait ProfileStore: Send + Sync {
    /// Stores a user's profile, replacing any previous contents wholesale.
    fn upsert_profile(&self, profile: &MusicProfile) -> Result<()>;

    /// Returns Ok(None) if the user has not synced a profile.
    fn get_profile(&self, user_id: usize) -> Result<Option<MusicProfile>>;

    /// Ids of all users holding a profile.
    fn user_ids_with_profile(&self) -> Result<Vec<usize>>;
}
