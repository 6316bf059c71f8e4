//! Chat operations scoped to a match
//!
//! Delivery/push is out of scope; messages are plain rows read back on
//! request. Access always goes through the match membership check.

use super::models::{Message, MessageKind, SongData};
use super::store::MessageStore;
use crate::error::{CoreError, CoreResult};
use crate::matching::MatchStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Page size cap for conversation reads.
pub const MAX_PAGE_SIZE: usize = 100;

pub struct ChatManager {
    store: Arc<dyn MessageStore>,
    matches: Arc<dyn MatchStore>,
}

impl ChatManager {
    pub fn new(store: Arc<dyn MessageStore>, matches: Arc<dyn MatchStore>) -> Self {
        ChatManager { store, matches }
    }

    fn require_match_member(&self, match_id: usize, user_id: usize) -> CoreResult<()> {
        let record = self
            .matches
            .get_match(match_id)?
            .ok_or(CoreError::NotFound("Match"))?;
        if !record.involves(user_id) {
            return Err(CoreError::Forbidden("Not your match".to_string()));
        }
        Ok(())
    }

    pub fn send_message(
        &self,
        match_id: usize,
        sender_id: usize,
        content: String,
        kind: MessageKind,
        song_data: Option<SongData>,
    ) -> CoreResult<Message> {
        self.require_match_member(match_id, sender_id)?;
        if kind == MessageKind::SongShare && song_data.is_none() {
            return Err(CoreError::Validation(
                "song_data is required for song_share messages".to_string(),
            ));
        }
        Ok(self.store.create_message(
            match_id,
            sender_id,
            &content,
            kind,
            song_data.as_ref(),
        )?)
    }

    pub fn conversation(
        &self,
        match_id: usize,
        user_id: usize,
        limit: usize,
        offset: usize,
    ) -> CoreResult<Vec<Message>> {
        self.require_match_member(match_id, user_id)?;
        Ok(self
            .store
            .messages_for_match(match_id, limit.min(MAX_PAGE_SIZE), offset)?)
    }

    pub fn mark_read(&self, match_id: usize, reader_id: usize) -> CoreResult<usize> {
        self.require_match_member(match_id, reader_id)?;
        Ok(self.store.mark_read(match_id, reader_id)?)
    }

    /// Unread counts across all of the user's matches.
    pub fn unread_counts(&self, user_id: usize) -> CoreResult<HashMap<usize, usize>> {
        let match_ids: Vec<usize> = self
            .matches
            .matches_for_user(user_id)?
            .iter()
            .map(|m| m.id)
            .collect();
        Ok(self.store.unread_counts(user_id, &match_ids)?)
    }
}
