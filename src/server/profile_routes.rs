//! Profile endpoints

use super::session::Session;
use super::state::ServerState;
use crate::error::{CoreError, CoreResult};
use crate::profile::{build_music_profile, MusicProfile, ProfileSource as _, ProfileStore as _, RecentTrack, TopArtist};
use crate::user::UserStore as _;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

pub async fn get_own_profile(
    session: Session,
    State(state): State<ServerState>,
) -> CoreResult<Json<MusicProfile>> {
    let profile = state
        .profiles
        .get_profile(session.user_id)
        .map_err(CoreError::Storage)?
        .ok_or(CoreError::NotFound("MusicProfile"))?;
    Ok(Json(profile))
}

/// Raw records as delivered by the streaming-data collaborator.
#[derive(Deserialize, Debug)]
pub struct SyncProfileBody {
    #[serde(default)]
    pub top_artists: Vec<TopArtist>,
    #[serde(default)]
    pub recent_tracks: Vec<RecentTrack>,
}

/// Runs the feature extractor over the submitted raw records and replaces
/// the stored profile wholesale. With no body and synthetic profiles
/// enabled, the configured data source supplies the records instead.
pub async fn sync_profile(
    session: Session,
    State(state): State<ServerState>,
    body: axum::body::Bytes,
) -> CoreResult<Json<MusicProfile>> {
    let (top_artists, recent_tracks) = if body.is_empty() {
        if !state.config.synthetic_profiles {
            return Err(CoreError::Validation(
                "Raw listening data is required".to_string(),
            ));
        }
        state.profile_source.fetch_raw(session.user_id)
    } else {
        let raw: SyncProfileBody = serde_json::from_slice(&body)
            .map_err(|e| CoreError::Validation(format!("Invalid sync payload: {}", e)))?;
        (raw.top_artists, raw.recent_tracks)
    };

    let profile = build_music_profile(
        session.user_id,
        top_artists,
        recent_tracks,
        Utc::now().timestamp(),
    );
    state
        .profiles
        .upsert_profile(&profile)
        .map_err(CoreError::Storage)?;
    Ok(Json(profile))
}

#[derive(Deserialize, Debug)]
pub struct PrivacyBody {
    pub show_course: bool,
    pub show_year: bool,
    pub show_faculty: bool,
}

pub async fn set_privacy(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<PrivacyBody>,
) -> CoreResult<axum::http::StatusCode> {
    state
        .users
        .set_privacy_flags(
            session.user_id,
            body.show_course,
            body.show_year,
            body.show_faculty,
        )
        .map_err(CoreError::Storage)?;
    Ok(axum::http::StatusCode::OK)
}
