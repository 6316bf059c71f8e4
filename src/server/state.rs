use axum::extract::FromRef;

use crate::chat::ChatManager;
use crate::matching::MatchEngine;
use crate::playlist::PlaylistManager;
use crate::profile::{ProfileSource, ProfileStore};
use crate::user::UserStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserStore = Arc<dyn UserStore>;
pub type GuardedProfileStore = Arc<dyn ProfileStore>;
pub type GuardedProfileSource = Arc<dyn ProfileSource>;
pub type GuardedMatchEngine = Arc<MatchEngine>;
pub type GuardedPlaylistManager = Arc<PlaylistManager>;
pub type GuardedChatManager = Arc<ChatManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub users: GuardedUserStore,
    pub profiles: GuardedProfileStore,
    pub profile_source: GuardedProfileSource,
    pub engine: GuardedMatchEngine,
    pub playlists: GuardedPlaylistManager,
    pub chat: GuardedChatManager,
}

impl FromRef<ServerState> for GuardedUserStore {
    fn from_ref(input: &ServerState) -> Self {
        input.users.clone()
    }
}

impl FromRef<ServerState> for GuardedProfileStore {
    fn from_ref(input: &ServerState) -> Self {
        input.profiles.clone()
    }
}

impl FromRef<ServerState> for GuardedMatchEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.engine.clone()
    }
}

impl FromRef<ServerState> for GuardedPlaylistManager {
    fn from_ref(input: &ServerState) -> Self {
        input.playlists.clone()
    }
}

impl FromRef<ServerState> for GuardedChatManager {
    fn from_ref(input: &ServerState) -> Self {
        input.chat.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
