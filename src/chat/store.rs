use super::models::{Message, MessageKind, SongData};
use anyhow::Result;
use std::collections::HashMap;

pub trait MessageStore: Send + Sync {
    /// Appends a message to a match conversation and returns it.
    fn create_message(
        &self,
        match_id: usize,
        sender_id: usize,
        content: &str,
        kind: MessageKind,
        song_data: Option<&SongData>,
    ) -> Result<Message>;

    /// Messages for a match, creation time ascending, paginated.
    fn messages_for_match(
        &self,
        match_id: usize,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>>;

    /// Marks unread messages not sent by `reader` as read. Returns how
    /// many were flipped.
    fn mark_read(&self, match_id: usize, reader_id: usize) -> Result<usize>;

    /// Unread message counts per match, for messages not sent by the user.
    /// Matches with no unread messages are absent from the map.
    fn unread_counts(&self, user_id: usize, match_ids: &[usize]) -> Result<HashMap<usize, usize>>;
}
