//! Playlist endpoints

use super::session::Session;
use super::state::ServerState;
use crate::error::{CoreError, CoreResult};
use crate::playlist::{NewTrack, PlaylistKind, SharedPlaylist, WeeklyRecap};
use crate::user::UserStore as _;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct PlaylistMemberResponse {
    pub user_id: usize,
    pub display_name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct PlaylistResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub playlist_type: PlaylistKind,
    pub match_id: Option<usize>,
    pub track_count: usize,
    pub member_count: usize,
    pub tracks: Vec<crate::playlist::PlaylistTrack>,
    pub members: Vec<PlaylistMemberResponse>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn build_playlist_response(
    state: &ServerState,
    playlist: SharedPlaylist,
) -> CoreResult<PlaylistResponse> {
    let mut members = Vec::new();
    for member in state.playlists.members(&playlist.id)? {
        let Some(user) = state
            .users
            .get_user(member.user_id)
            .map_err(CoreError::Storage)?
        else {
            continue;
        };
        members.push(PlaylistMemberResponse {
            user_id: user.id,
            display_name: user.display_name,
            role: member.role.as_str().to_string(),
        });
    }

    Ok(PlaylistResponse {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description,
        playlist_type: playlist.kind,
        match_id: playlist.match_id,
        track_count: playlist.tracks.len(),
        member_count: members.len(),
        tracks: playlist.tracks,
        members,
        created_at: playlist.created_at,
        updated_at: playlist.updated_at,
    })
}

#[derive(Serialize)]
pub struct PlaylistSummaryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub playlist_type: PlaylistKind,
    pub match_id: Option<usize>,
    pub track_count: usize,
    pub created_at: i64,
}

pub async fn list_playlists(
    session: Session,
    State(state): State<ServerState>,
) -> CoreResult<Json<Vec<PlaylistSummaryResponse>>> {
    let playlists = state.playlists.playlists_for_user(session.user_id)?;
    let summaries = playlists
        .into_iter()
        .map(|p| PlaylistSummaryResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            playlist_type: p.kind,
            match_id: p.match_id,
            track_count: p.tracks.len(),
            created_at: p.created_at,
        })
        .collect();
    Ok(Json(summaries))
}

#[derive(Deserialize, Debug)]
pub struct CreatePlaylistBody {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<usize>,
}

pub async fn create_playlist(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<CreatePlaylistBody>,
) -> CoreResult<Json<PlaylistResponse>> {
    let playlist = state.playlists.create_group_playlist(
        session.user_id,
        body.name,
        body.description,
        body.member_ids,
    )?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}

pub async fn get_playlist(
    session: Session,
    Path(playlist_id): Path<String>,
    State(state): State<ServerState>,
) -> CoreResult<Json<PlaylistResponse>> {
    let playlist = state
        .playlists
        .get_playlist_for(&playlist_id, session.user_id)?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}

pub async fn delete_playlist(
    session: Session,
    Path(playlist_id): Path<String>,
    State(state): State<ServerState>,
) -> CoreResult<axum::http::StatusCode> {
    state
        .playlists
        .delete_playlist(&playlist_id, session.user_id)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn add_track(
    session: Session,
    Path(playlist_id): Path<String>,
    State(state): State<ServerState>,
    Json(track): Json<NewTrack>,
) -> CoreResult<Json<PlaylistResponse>> {
    let playlist = state
        .playlists
        .add_track(&playlist_id, session.user_id, track)?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}

pub async fn remove_track(
    session: Session,
    Path((playlist_id, spotify_id)): Path<(String, String)>,
    State(state): State<ServerState>,
) -> CoreResult<Json<PlaylistResponse>> {
    let playlist = state
        .playlists
        .remove_track(&playlist_id, session.user_id, &spotify_id)?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}

#[derive(Deserialize, Debug)]
pub struct AddMemberBody {
    pub user_id: usize,
}

pub async fn add_member(
    session: Session,
    Path(playlist_id): Path<String>,
    State(state): State<ServerState>,
    Json(body): Json<AddMemberBody>,
) -> CoreResult<Json<PlaylistResponse>> {
    state
        .playlists
        .add_member(&playlist_id, session.user_id, body.user_id)?;
    let playlist = state
        .playlists
        .get_playlist_for(&playlist_id, session.user_id)?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}

pub async fn remove_member(
    session: Session,
    Path((playlist_id, user_id)): Path<(String, usize)>,
    State(state): State<ServerState>,
) -> CoreResult<Json<PlaylistResponse>> {
    state
        .playlists
        .remove_member(&playlist_id, session.user_id, user_id)?;
    let playlist = state
        .playlists
        .get_playlist_for(&playlist_id, session.user_id)?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}

pub async fn get_recap(
    session: Session,
    Path(playlist_id): Path<String>,
    State(state): State<ServerState>,
) -> CoreResult<Json<WeeklyRecap>> {
    let recap = state
        .playlists
        .get_or_generate_recap(&playlist_id, session.user_id)?;
    Ok(Json(recap))
}

/// Seeds (or returns) the shared playlist for one of the caller's matches.
/// The normal path seeds on match creation; this endpoint covers matches
/// that predate a seeding failure.
pub async fn auto_create_for_match(
    session: Session,
    Path(match_id): Path<usize>,
    State(state): State<ServerState>,
) -> CoreResult<Json<PlaylistResponse>> {
    let record = state.engine.get_match_for(match_id, session.user_id)?;
    let other = record.other_user(session.user_id);
    let playlist = state.playlists.seed_match_playlist(
        record.id,
        record.compatibility_score,
        session.user_id,
        other,
    )?;
    Ok(Json(build_playlist_response(&state, playlist)?))
}
