//! Chat endpoints

use super::session::Session;
use super::state::ServerState;
use crate::chat::{Message, MessageKind, SongData, MAX_PAGE_SIZE};
use crate::error::{CoreError, CoreResult};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Deserialize, Debug)]
pub struct ConversationQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn get_conversation(
    session: Session,
    Path(match_id): Path<usize>,
    Query(query): Query<ConversationQuery>,
    State(state): State<ServerState>,
) -> CoreResult<Json<Vec<Message>>> {
    let messages = state.chat.conversation(
        match_id,
        session.user_id,
        query.limit.unwrap_or(50).min(MAX_PAGE_SIZE),
        query.offset.unwrap_or(0),
    )?;
    Ok(Json(messages))
}

#[derive(Deserialize, Debug)]
pub struct SendMessageBody {
    pub content: String,
    pub message_type: Option<String>,
    pub song_data: Option<SongData>,
}

pub async fn send_message(
    session: Session,
    Path(match_id): Path<usize>,
    State(state): State<ServerState>,
    Json(body): Json<SendMessageBody>,
) -> CoreResult<Json<Message>> {
    let kind = match body.message_type.as_deref() {
        None => MessageKind::Text,
        Some(raw) => MessageKind::parse(raw).ok_or_else(|| {
            CoreError::Validation("message_type must be 'text' or 'song_share'".to_string())
        })?,
    };
    let message =
        state
            .chat
            .send_message(match_id, session.user_id, body.content, kind, body.song_data)?;
    Ok(Json(message))
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub marked_read: usize,
}

pub async fn read_messages(
    session: Session,
    Path(match_id): Path<usize>,
    State(state): State<ServerState>,
) -> CoreResult<Json<MarkReadResponse>> {
    let marked_read = state.chat.mark_read(match_id, session.user_id)?;
    Ok(Json(MarkReadResponse { marked_read }))
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub counts: HashMap<usize, usize>,
    pub total: usize,
}

pub async fn unread_count(
    session: Session,
    State(state): State<ServerState>,
) -> CoreResult<Json<UnreadCountResponse>> {
    let counts = state.chat.unread_counts(session.user_id)?;
    let total = counts.values().sum();
    Ok(Json(UnreadCountResponse { counts, total }))
}
