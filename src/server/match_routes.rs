//! Matching endpoints: feed, swipe, matches

use super::session::Session;
use super::state::ServerState;
use crate::error::{CoreError, CoreResult};
use crate::matching::{CandidateFilters, Match, ScoreResult, ScoredCandidate, SwipeAction};
use crate::user::UserStore as _;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

pub async fn match_feed(
    session: Session,
    Query(filters): Query<CandidateFilters>,
    State(state): State<ServerState>,
) -> CoreResult<Json<Vec<ScoredCandidate>>> {
    let feed = state.engine.candidate_feed(session.user_id, &filters)?;
    Ok(Json(feed))
}

#[derive(Deserialize, Debug)]
pub struct SwipeBody {
    pub target_user_id: usize,
    pub action: String,
}

#[derive(Serialize)]
pub struct SwipeResponse {
    pub message: String,
    pub is_match: bool,
    pub match_id: Option<usize>,
}

pub async fn swipe(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<SwipeBody>,
) -> CoreResult<Json<SwipeResponse>> {
    let action = SwipeAction::parse(&body.action)
        .ok_or_else(|| CoreError::Validation("Action must be 'like' or 'pass'".to_string()))?;

    let outcome = state
        .engine
        .record_swipe(session.user_id, body.target_user_id, action)?;

    Ok(Json(SwipeResponse {
        message: if outcome.matched.is_some() {
            "It's a match!".to_string()
        } else {
            "Swipe recorded.".to_string()
        },
        is_match: outcome.matched.is_some(),
        match_id: outcome.matched.map(|m| m.id),
    }))
}

#[derive(Serialize)]
pub struct OtherUser {
    pub id: usize,
    pub display_name: String,
    pub course: Option<String>,
    pub year: Option<u32>,
    pub faculty: Option<String>,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub id: usize,
    pub other_user: OtherUser,
    pub compatibility_score: u8,
    pub breakdown: ScoreResult,
    pub created_at: i64,
}

fn build_match_response(
    state: &ServerState,
    record: Match,
    viewer: usize,
) -> CoreResult<Option<MatchResponse>> {
    let other_id = record.other_user(viewer);
    let Some(other) = state.users.get_user(other_id).map_err(CoreError::Storage)? else {
        return Ok(None);
    };
    let (course, year, faculty) = other.visible_attributes();
    Ok(Some(MatchResponse {
        id: record.id,
        other_user: OtherUser {
            id: other.id,
            display_name: other.display_name.clone(),
            course: course.map(|s| s.to_string()),
            year,
            faculty: faculty.map(|s| s.to_string()),
        },
        compatibility_score: record.compatibility_score,
        breakdown: record.breakdown,
        created_at: record.created_at,
    }))
}

pub async fn list_matches(
    session: Session,
    State(state): State<ServerState>,
) -> CoreResult<Json<Vec<MatchResponse>>> {
    let mut results = Vec::new();
    for record in state.engine.matches_for_user(session.user_id)? {
        // A match whose counterpart account disappeared is skipped.
        if let Some(response) = build_match_response(&state, record, session.user_id)? {
            results.push(response);
        }
    }
    Ok(Json(results))
}

pub async fn match_detail(
    session: Session,
    Path(match_id): Path<usize>,
    State(state): State<ServerState>,
) -> CoreResult<Json<MatchResponse>> {
    let record = state.engine.get_match_for(match_id, session.user_id)?;
    build_match_response(&state, record, session.user_id)?
        .map(Json)
        .ok_or(CoreError::NotFound("User"))
}
